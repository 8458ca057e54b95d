//! Line and block assembly.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  LayoutBlock[]
//!   (per page)      extract         group_spans      group_lines
//! ```
//!
//! Spans are grouped into lines by baseline, adjacent spans of the same
//! style inside a line are merged, and lines are grouped into blocks by
//! vertical gap. Image XObjects become image blocks at the end of the page.

use super::backend::PdfBackend;
use super::extract::{extract_page_spans, TextSpan};
use crate::normalize::normalize_span_text;
use crate::types::{LayoutBlock, PageLayout, TextBlock, TextLine};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two spans whose Y coordinates differ by less than this are treated as
/// belonging to the same line.
const Y_TOLERANCE: f32 = 1.0;

/// Minimum gap (in points) between adjacent spans before we insert a space.
const MIN_WORD_GAP: f32 = 1.5;

/// A vertical gap larger than this multiple of the previous line's font
/// size starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Spans closer in size than this count as the same size when merging.
const FONT_SIZE_EPSILON: f32 = 0.01;

// ---------------------------------------------------------------------------
// CJK / spaceless-script helper
// ---------------------------------------------------------------------------

/// Returns `true` if `c` belongs to a script that does not use inter-word
/// spaces (CJK Unified Ideographs, Hiragana, Katakana, Hangul, Thai, etc.).
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c as u32,
        // CJK Unified Ideographs and extensions A/B, compatibility ideographs
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2A6DF
        | 0xF900..=0xFAFF
        // Hiragana, Katakana and phonetic extensions
        | 0x3040..=0x30FF
        | 0x31F0..=0x31FF
        // Hangul syllables, jamo, compatibility jamo
        | 0xAC00..=0xD7AF
        | 0x1100..=0x11FF
        | 0x3130..=0x318F
        // CJK symbols and punctuation, fullwidth forms
        | 0x3000..=0x303F
        | 0xFF00..=0xFFEF
        // Thai, Lao, Tibetan, Myanmar, Khmer
        | 0x0E00..=0x0EFF
        | 0x0F00..=0x0FFF
        | 0x1000..=0x109F
        | 0x1780..=0x17FF
    )
}

fn boundary_is_spaceless(prev: &TextSpan, next: &TextSpan) -> bool {
    match (prev.text.chars().next_back(), next.text.chars().next()) {
        (Some(l), Some(f)) => is_spaceless_script_char(l) && is_spaceless_script_char(f),
        _ => false,
    }
}

fn same_style(a: &TextSpan, b: &TextSpan) -> bool {
    a.font_name == b.font_name
        && (a.font_size - b.font_size).abs() < FONT_SIZE_EPSILON
        && a.is_bold == b.is_bold
        && a.is_italic == b.is_italic
        && a.is_superscript == b.is_superscript
        && a.color == b.color
}

// ---------------------------------------------------------------------------
// Public API: span -> line grouping
// ---------------------------------------------------------------------------

/// Group spans into lines, top of the page first.
///
/// Spans whose Y coordinates are within [`Y_TOLERANCE`] points of each other
/// are placed on the same line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // Sort by Y descending (top of page first), then X ascending.
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current
            .first()
            .is_some_and(|first| (span.y - first.y).abs() <= Y_TOLERANCE);
        if !same_line && !current.is_empty() {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Build a [`TextLine`] from spans known to share the same baseline.
///
/// Same-style neighbours are merged: glued when they touch, joined with a
/// space when separated by a word gap (unless both sides are spaceless
/// script). Style changes always keep spans apart.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.x - (prev.x + prev.width);

            if same_style(prev, &span) && gap > -prev.font_size && gap < prev.font_size * 2.0 {
                if gap >= MIN_WORD_GAP && !boundary_is_spaceless(prev, &span) {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = (span.x + span.width) - prev.x;
                continue;
            }
        }

        merged.push(span);
    }

    let y = merged.first().map(|s| s.y).unwrap_or(0.0);
    let x = merged.first().map(|s| s.x).unwrap_or(0.0);
    let font_size = merged.iter().map(|s| s.font_size).fold(0.0, f32::max);

    TextLine {
        spans: merged,
        y,
        x,
        font_size,
    }
}

// ---------------------------------------------------------------------------
// Public API: line -> block grouping
// ---------------------------------------------------------------------------

/// Group consecutive lines into blocks.
///
/// A new block starts when the vertical gap between two lines exceeds
/// [`BLOCK_GAP_FACTOR`] times the font size of the upper line.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        let gap_break = current
            .last()
            .is_some_and(|prev| (prev.y - line.y).abs() > prev.font_size * BLOCK_GAP_FACTOR);
        if gap_break {
            blocks.push(TextBlock {
                lines: std::mem::take(&mut current),
            });
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }

    blocks
}

// ---------------------------------------------------------------------------
// Public API: full pipeline
// ---------------------------------------------------------------------------

/// Normalize span text, dropping spans left empty.
fn normalize_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    spans
        .into_iter()
        .filter_map(|mut span| {
            span.text = normalize_span_text(&span.text);
            (!span.text.is_empty()).then_some(span)
        })
        .collect()
}

/// Lay out one page: text blocks in reading order, then one image block per
/// image XObject.
pub fn layout_page(spans: Vec<TextSpan>, image_names: Vec<Vec<u8>>) -> Vec<LayoutBlock> {
    let lines = group_spans_into_lines(normalize_spans(spans));
    let mut blocks: Vec<LayoutBlock> = group_lines_into_blocks(lines)
        .into_iter()
        .map(LayoutBlock::Text)
        .collect();
    blocks.extend(image_names.into_iter().map(|name| LayoutBlock::Image {
        name: String::from_utf8_lossy(&name).into_owned(),
    }));
    blocks
}

/// Lay out every page of the document, in page order.
pub fn layout_document(backend: &dyn PdfBackend) -> Result<Vec<PageLayout>, PdfError> {
    let page_map = backend.pages();
    let mut pages = Vec::with_capacity(page_map.len());

    for (&number, &page_id) in &page_map {
        let spans = extract_page_spans(backend, page_id)?;
        let images = backend.page_image_names(page_id).unwrap_or_else(|e| {
            log::warn!("page {}: cannot list images: {}", number, e);
            Vec::new()
        });
        pages.push(PageLayout {
            number: number as usize,
            blocks: layout_page(spans, images),
        });
    }

    log::debug!("layout: {} pages", pages.len());
    Ok(pages)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
