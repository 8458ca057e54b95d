//! Input model: the span tree handed over by a text-extraction layer.
//!
//! The shape follows what PDF text extractors commonly expose per page:
//! blocks of lines of styled spans. Only text blocks carry spans; anything
//! else (images, vector drawings) is kept as an opaque block so page layout
//! order is preserved without contributing to the style census.

use serde::{Deserialize, Serialize};

/// Span style flag: superscript.
pub const FLAG_SUPERSCRIPT: u32 = 1;
/// Span style flag: italic.
pub const FLAG_ITALIC: u32 = 1 << 1;
/// Span style flag: serif font.
pub const FLAG_SERIF: u32 = 1 << 2;
/// Span style flag: monospaced font.
pub const FLAG_MONOSPACE: u32 = 1 << 3;
/// Span style flag: bold.
pub const FLAG_BOLD: u32 = 1 << 4;

/// An atomic styled run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub size: f32,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub flags: u32,
    /// Packed sRGB, `0xRRGGBB`.
    #[serde(default)]
    pub color: u32,
}

impl Span {
    /// A span with default font, no flags and black colour.
    pub fn new(text: impl Into<String>, size: f32) -> Self {
        Span {
            text: text.into(),
            size,
            font: String::new(),
            flags: 0,
            color: 0,
        }
    }

    /// `true` when the span carries at least one non-whitespace character.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text { lines: Vec<Line> },
    Image,
}

impl Block {
    /// Lines of a text block; empty for non-text blocks.
    pub fn lines(&self) -> &[Line] {
        match self {
            Block::Text { lines } => lines,
            Block::Image => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Document { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every span of every text block, in reading order.
    pub fn text_spans(&self) -> impl Iterator<Item = &Span> {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .flat_map(|block| block.lines().iter())
            .flat_map(|line| line.spans.iter())
    }
}
