pub use crate::parser::extract::TextSpan;

/// A horizontal line of text assembled from one or more [`TextSpan`]s that
/// share (approximately) the same Y coordinate, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    pub x: f32,
    /// Largest span size on the line.
    pub font_size: f32,
}

impl TextLine {
    /// Concatenate all span texts with a single space separator.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Consecutive lines without a paragraph-sized gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBlock {
    Text(TextBlock),
    /// An image XObject, by resource name.
    Image { name: String },
}

/// The blocks of one page in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: usize,
    pub blocks: Vec<LayoutBlock>,
}
