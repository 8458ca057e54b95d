//! Representative heading selection.
//!
//! A heading tag that shows up on fewer than a tenth of the pages is most
//! likely a one-off (the document title); one that shows up far more often
//! than there are pages is most likely a running header or footer. The band
//! between the two is where section headings live.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::census::FrequencyTable;
use crate::tags::{SizeTagTable, Tag};

/// Page-count-relative frequency band a heading count must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionBand {
    /// Lower bound is `floor(page_count * lower_ratio)`, inclusive.
    pub lower_ratio: f64,
    /// Upper bound is `page_count * upper_ratio`, inclusive.
    pub upper_ratio: f64,
}

impl Default for SelectionBand {
    fn default() -> Self {
        Self {
            lower_ratio: 0.1,
            upper_ratio: 1.5,
        }
    }
}

impl SelectionBand {
    pub fn lower_bound(&self, page_count: usize) -> usize {
        (page_count as f64 * self.lower_ratio).floor() as usize
    }

    pub fn upper_bound(&self, page_count: usize) -> f64 {
        page_count as f64 * self.upper_ratio
    }

    /// Zero counts never qualify, whatever the page count.
    pub fn qualifies(&self, count: usize, page_count: usize) -> bool {
        count > 0
            && count >= self.lower_bound(page_count)
            && count as f64 <= self.upper_bound(page_count)
    }
}

/// A heading tag with its corrected occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadingCount {
    pub tag: Tag,
    pub count: usize,
}

/// Heading tags ranked by corrected count, most frequent first.
///
/// Style keys that share a size (granular census) are summed under their
/// common tag. Ties go to the lower heading level.
pub fn rank_headings(corrected: &FrequencyTable, tags: &SizeTagTable) -> Vec<HeadingCount> {
    let mut per_tag: BTreeMap<Tag, usize> = BTreeMap::new();
    for (key, count) in corrected.iter() {
        if let Some(tag) = tags.tag_for(key.size()).filter(Tag::is_heading) {
            *per_tag.entry(tag).or_insert(0) += count;
        }
    }

    let mut headings: Vec<HeadingCount> = per_tag
        .into_iter()
        .map(|(tag, count)| HeadingCount { tag, count })
        .collect();
    headings.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    headings
}

/// Ranked headings that fall inside `band` for a document of `page_count`
/// pages, in ranking order.
pub fn select_headings(
    ranked: &[HeadingCount],
    page_count: usize,
    band: &SelectionBand,
) -> Vec<HeadingCount> {
    ranked
        .iter()
        .filter(|h| band.qualifies(h.count, page_count))
        .copied()
        .collect()
}
