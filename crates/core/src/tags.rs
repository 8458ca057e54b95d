//! Structural tags and the font-size classifier.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::census::StyleCensus;
use crate::error::{Error, Result};
use crate::style::FontSize;

/// Structural label assigned to a font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Larger than body text; level 1 is the largest size.
    Heading(usize),
    /// Body text.
    Paragraph,
    /// Smaller than body text; level 1 is the largest of those sizes.
    Subordinate(usize),
}

impl Tag {
    pub fn is_heading(&self) -> bool {
        matches!(self, Tag::Heading(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Heading(level) => write!(f, "<h{}>", level),
            Tag::Paragraph => write!(f, "<p>"),
            Tag::Subordinate(level) => write!(f, "<s{}>", level),
        }
    }
}

impl FromStr for Tag {
    type Err = Error;

    /// Accepts `<h2>`, `h2`, `<p>`, `s1`, ...
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(trimmed);

        if inner == "p" {
            return Ok(Tag::Paragraph);
        }

        let invalid = || Error::InvalidTag(s.to_string());
        let (kind, level) = inner.split_at_checked(1).ok_or_else(invalid)?;
        let level: usize = level.parse().map_err(|_| invalid())?;
        match kind {
            "h" => Ok(Tag::Heading(level)),
            "s" => Ok(Tag::Subordinate(level)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of a [`SizeTagTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeTag {
    pub size: FontSize,
    pub tag: Tag,
}

/// Font size to structural tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeTagTable {
    tags: BTreeMap<FontSize, Tag>,
    paragraph_size: Option<FontSize>,
}

impl SizeTagTable {
    pub fn tag_for(&self, size: FontSize) -> Option<Tag> {
        self.tags.get(&size).copied()
    }

    pub fn paragraph_size(&self) -> Option<FontSize> {
        self.paragraph_size
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Rows from the largest size to the smallest.
    pub fn rows(&self) -> Vec<SizeTag> {
        self.tags
            .iter()
            .rev()
            .map(|(&size, &tag)| SizeTag { size, tag })
            .collect()
    }
}

/// Assign a structural tag to every size seen by the census.
///
/// The most frequent style is body text and its size is the pivot. Sizes
/// are walked from largest to smallest with a running index; the index
/// restarts at the pivot, so headings count down from the top and
/// subordinate sizes count down from just below the body size. Style keys
/// that share a size are collapsed before the walk, so equal sizes always
/// receive the same tag.
pub fn classify(census: &StyleCensus) -> Result<SizeTagTable> {
    let ranked = census.frequencies.ranked();
    let top = ranked.first().ok_or(Error::NoStylesFound)?;
    let pivot = census
        .registry
        .get(&top.key)
        .map(|style| style.size)
        .unwrap_or_else(|| top.key.size());

    let mut sizes: Vec<FontSize> = ranked.iter().map(|row| row.key.size()).collect();
    sizes.sort_by(|a, b| b.cmp(a));
    sizes.dedup();

    let mut tags = BTreeMap::new();
    let mut index = 0;
    for size in sizes {
        index += 1;
        let tag = match size.cmp(&pivot) {
            Ordering::Equal => {
                index = 0;
                Tag::Paragraph
            }
            Ordering::Greater => Tag::Heading(index),
            Ordering::Less => Tag::Subordinate(index),
        };
        tags.insert(size, tag);
    }

    log::debug!("classifier: {} sizes, body size {}", tags.len(), pivot);

    Ok(SizeTagTable {
        tags,
        paragraph_size: Some(pivot),
    })
}
