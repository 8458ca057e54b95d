//! Style census: how often each text style occurs in a document.

use std::collections::HashMap;

use serde::Serialize;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::style::{Granularity, Style, StyleKey};

/// Occurrence count per style key, plus the order in which keys were
/// first recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<StyleKey, usize>,
    first_seen: HashMap<StyleKey, usize>,
}

/// Number of spans per style key that were merged into a preceding entry
/// instead of starting one of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyDelta {
    merged: HashMap<StyleKey, usize>,
}

/// A `(style, count)` row of a ranked frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedStyle {
    pub key: StyleKey,
    pub count: usize,
}

impl FrequencyTable {
    pub fn record(&mut self, key: StyleKey) {
        self.add(key, 1);
    }

    fn add(&mut self, key: StyleKey, count: usize) {
        let next = self.first_seen.len();
        self.first_seen.entry(key.clone()).or_insert(next);
        *self.counts.entry(key).or_insert(0) += count;
    }

    fn first_seen(&self, key: &StyleKey) -> usize {
        self.first_seen.get(key).copied().unwrap_or(usize::MAX)
    }

    pub fn count(&self, key: &StyleKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, usize)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    /// Rows ordered by descending count. Ties go to the key recorded first,
    /// then to key order, so the ranking never depends on hash iteration
    /// order.
    pub fn ranked(&self) -> Vec<RankedStyle> {
        let mut rows: Vec<RankedStyle> = self
            .counts
            .iter()
            .map(|(key, &count)| RankedStyle {
                key: key.clone(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| self.first_seen(&a.key).cmp(&self.first_seen(&b.key)))
                .then_with(|| a.key.cmp(&b.key))
        });
        rows
    }

    /// A copy of this table with merged spans retracted.
    pub fn corrected(&self, delta: &FrequencyDelta) -> FrequencyTable {
        let mut counts = self.counts.clone();
        for (key, merged) in &delta.merged {
            if let Some(count) = counts.get_mut(key) {
                *count = count.saturating_sub(*merged);
            }
        }
        FrequencyTable {
            counts,
            first_seen: self.first_seen.clone(),
        }
    }
}

/// Keys count as first seen in iteration order.
impl FromIterator<(StyleKey, usize)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (StyleKey, usize)>>(iter: I) -> Self {
        let mut table = FrequencyTable::default();
        for (key, count) in iter {
            table.add(key, count);
        }
        table
    }
}

impl FrequencyDelta {
    pub fn record(&mut self, key: StyleKey) {
        *self.merged.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &StyleKey) -> usize {
        self.merged.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.merged.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

/// Result of scanning a document's spans.
#[derive(Debug, Clone)]
pub struct StyleCensus {
    pub granularity: Granularity,
    pub frequencies: FrequencyTable,
    pub registry: HashMap<StyleKey, Style>,
}

impl StyleCensus {
    /// Style of the most frequent key: the body text.
    pub fn paragraph_style(&self) -> Option<&Style> {
        self.frequencies
            .ranked()
            .first()
            .and_then(|row| self.registry.get(&row.key))
    }
}

/// Count every non-whitespace span of every text block.
pub fn take_census(document: &Document, granularity: Granularity) -> Result<StyleCensus> {
    let mut frequencies = FrequencyTable::default();
    let mut registry: HashMap<StyleKey, Style> = HashMap::new();

    for span in document.text_spans().filter(|s| s.has_text()) {
        let key = StyleKey::of(span, granularity);
        registry.entry(key.clone()).or_insert_with(|| Style::from(span));
        frequencies.record(key);
    }

    if frequencies.is_empty() {
        return Err(Error::NoStylesFound);
    }

    log::debug!(
        "census: {} styles over {} spans ({:?})",
        frequencies.len(),
        frequencies.total(),
        granularity
    );

    Ok(StyleCensus {
        granularity,
        frequencies,
        registry,
    })
}
