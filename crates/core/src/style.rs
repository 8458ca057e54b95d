use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::document::Span;

/// A font size usable as a map key.
///
/// Sizes are compared exactly, without bucketing: two spans only share a
/// size when the extractor reported the same value. `-0.0` is folded into
/// `0.0` so equality and hashing agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontSize(f32);

impl FontSize {
    pub fn new(value: f32) -> Self {
        if value == 0.0 {
            FontSize(0.0)
        } else {
            FontSize(value)
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for FontSize {
    fn from(value: f32) -> Self {
        FontSize::new(value)
    }
}

impl PartialEq for FontSize {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FontSize {}

impl PartialOrd for FontSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FontSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FontSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How finely spans are told apart when counting styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Font size only.
    #[default]
    Size,
    /// Font size, flags, font family and colour.
    Full,
}

/// Grouping key for frequency counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StyleKey {
    Size {
        size: FontSize,
    },
    Full {
        size: FontSize,
        flags: u32,
        font: String,
        color: u32,
    },
}

impl StyleKey {
    pub fn of(span: &Span, granularity: Granularity) -> Self {
        let size = FontSize::new(span.size);
        match granularity {
            Granularity::Size => StyleKey::Size { size },
            Granularity::Full => StyleKey::Full {
                size,
                flags: span.flags,
                font: span.font.clone(),
                color: span.color,
            },
        }
    }

    pub fn size(&self) -> FontSize {
        match self {
            StyleKey::Size { size } | StyleKey::Full { size, .. } => *size,
        }
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleKey::Size { size } => write!(f, "{}", size),
            StyleKey::Full {
                size,
                flags,
                font,
                color,
            } => write!(f, "{}_{}_{}_{:06x}", size, flags, font, color),
        }
    }
}

/// Representative attributes of a style, taken from the first span seen
/// with that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub size: FontSize,
    pub font: String,
    pub flags: u32,
    pub color: u32,
}

impl From<&Span> for Style {
    fn from(span: &Span) -> Self {
        Style {
            size: FontSize::new(span.size),
            font: span.font.clone(),
            flags: span.flags,
            color: span.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(FontSize::new(-0.0), FontSize::new(0.0));

        let mut set = HashSet::new();
        set.insert(FontSize::new(-0.0));
        assert!(set.contains(&FontSize::new(0.0)));
    }

    #[test]
    fn test_font_size_ordering() {
        let mut sizes = vec![FontSize::new(12.0), FontSize::new(24.0), FontSize::new(9.5)];
        sizes.sort();
        assert_eq!(
            sizes.iter().map(|s| s.value()).collect::<Vec<_>>(),
            vec![9.5, 12.0, 24.0]
        );
    }

    #[test]
    fn test_sizes_compare_exactly() {
        assert_ne!(FontSize::new(12.0), FontSize::new(12.01));
    }

    #[test]
    fn test_style_key_granularity() {
        let mut span = Span::new("x", 11.0);
        span.font = "Times-Bold".to_string();
        span.flags = 16;

        assert_eq!(
            StyleKey::of(&span, Granularity::Size),
            StyleKey::Size {
                size: FontSize::new(11.0)
            }
        );

        let full = StyleKey::of(&span, Granularity::Full);
        assert_eq!(full.size(), FontSize::new(11.0));
        assert_eq!(full.to_string(), "11_16_Times-Bold_000000");
    }

    #[test]
    fn test_full_keys_differ_by_font() {
        let a = Span {
            font: "A".to_string(),
            ..Span::new("x", 10.0)
        };
        let b = Span {
            font: "B".to_string(),
            ..Span::new("x", 10.0)
        };
        assert_ne!(
            StyleKey::of(&a, Granularity::Full),
            StyleKey::of(&b, Granularity::Full)
        );
        assert_eq!(
            StyleKey::of(&a, Granularity::Size),
            StyleKey::of(&b, Granularity::Size)
        );
    }
}
