//! Content-stream walk: PDF text operators in, positioned and styled
//! [`TextSpan`]s out.
//!
//! The state machine tracks the text matrix, the text spacing parameters,
//! the current font and the non-stroking (fill) colour, which is the colour
//! glyphs are painted with.

use super::backend::{
    decode_text_simple, get_number_from_value, BackendFontInfo, PageId, PdfBackend, PdfValue,
};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single run of text at a specific position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_monospace: bool,
    pub is_serif: bool,
    /// Raised above the baseline with a positive text rise.
    pub is_superscript: bool,
    /// Fill colour as `0xRRGGBB`.
    pub color: u32,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Approximate character width as a fraction of font size when no better
/// metric is available.  0.5 is a reasonable default for proportional fonts.
pub(crate) const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Font and colour helpers
// ---------------------------------------------------------------------------

/// Style traits read off a base-font name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FontTraits {
    bold: bool,
    italic: bool,
    monospace: bool,
    serif: bool,
}

impl FontTraits {
    fn from_name(base_font: &str) -> Self {
        let upper = base_font.to_uppercase();
        let monospace = upper.contains("COURIER") || upper.contains("MONO");
        FontTraits {
            bold: upper.contains("BOLD") || upper.contains("BLACK") || upper.contains("HEAVY"),
            italic: upper.contains("ITALIC") || upper.contains("OBLIQUE"),
            monospace,
            serif: !monospace
                && !upper.contains("SANS")
                && ["TIMES", "SERIF", "GARAMOND", "GEORGIA", "MINION", "PALATINO"]
                    .iter()
                    .any(|family| upper.contains(family)),
        }
    }
}

/// Drop a subset prefix such as `ABCDEF+` from a base-font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

fn channel(value: f32) -> u32 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u32
}

fn pack_rgb(r: f32, g: f32, b: f32) -> u32 {
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Pack colour components as `0xRRGGBB`, choosing the colour space by
/// component count: 1 gray, 3 RGB, 4 CMYK.
pub fn color_from_components(components: &[f32]) -> Option<u32> {
    match *components {
        [gray] => Some(pack_rgb(gray, gray, gray)),
        [r, g, b] => Some(pack_rgb(r, g, b)),
        [c, m, y, k] => Some(pack_rgb(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key, not the full name).
    font_key: Vec<u8>,
    font_name: String,
    traits: FontTraits,
    /// Current font size in text-space units.
    font_size: f32,
    text_matrix: [f32; 6],
    /// Set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
    fill_color: u32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            traits: FontTraits::default(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
            fill_color: 0x000000,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Rendered size: `font_size * sqrt(b^2 + d^2)` of the text matrix.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn set_font(&mut self, key: Vec<u8>, base_font: &str, size: f32) {
        self.font_key = key;
        self.font_size = size;
        self.font_name = strip_subset_prefix(base_font).to_string();
        self.traits = FontTraits::from_name(base_font);
    }

    fn char_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    /// Without glyph metrics every character counts as
    /// [`APPROX_CHAR_WIDTH_RATIO`] of the font size.
    fn estimate_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width()
    }

    /// Advance the text matrix past `text`.
    fn advance_after_show(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let spacing = if ch == ' ' { self.word_spacing } else { 0.0 };
                self.char_width() + self.char_spacing + spacing
            })
            .sum();
        self.advance_x(dx);
    }

    fn make_span(&self, text: String, x: f32, y: f32) -> TextSpan {
        TextSpan {
            width: self.estimate_width(&text),
            text,
            x,
            y,
            font_size: self.effective_font_size(),
            font_name: self.font_name.clone(),
            is_bold: self.traits.bold,
            is_italic: self.traits.italic,
            is_monospace: self.traits.monospace,
            is_serif: self.traits.serif,
            is_superscript: self.text_rise > 0.0,
            color: self.fill_color,
        }
    }
}

/// Numeric operands, stopping at the first non-number (pattern names in
/// `scn`).
fn numeric_operands(operands: &[PdfValue]) -> Vec<f32> {
    operands.iter().map_while(get_number_from_value).collect()
}

fn first_number(operands: &[PdfValue]) -> Option<f32> {
    operands.first().and_then(get_number_from_value)
}

// ---------------------------------------------------------------------------
// Page walker
// ---------------------------------------------------------------------------

struct PageWalker<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    fonts: Vec<BackendFontInfo>,
    state: TextState,
    spans: Vec<TextSpan>,
}

impl PageWalker<'_> {
    fn decode(&self, val: &PdfValue) -> String {
        match val {
            PdfValue::Str(bytes) => {
                let decoded = self
                    .backend
                    .decode_text(self.page_id, &self.state.font_key, bytes);
                if decoded.is_empty() {
                    decode_text_simple(bytes)
                } else {
                    decoded
                }
            }
            _ => String::new(),
        }
    }

    fn handle_tf(&mut self, operands: &[PdfValue]) {
        let [key, size, ..] = operands else {
            return;
        };
        let key = match key {
            PdfValue::Name(n) | PdfValue::Str(n) => n.clone(),
            _ => return,
        };
        let size = get_number_from_value(size).unwrap_or(0.0);
        let base = self
            .fonts
            .iter()
            .find(|info| info.name == key)
            .and_then(|info| info.base_font.clone())
            // Font not in resource dict: keep the key as the name.
            .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
        self.state.set_font(key, &base, size);
    }

    fn handle_tm(&mut self, operands: &[PdfValue]) {
        let vals = numeric_operands(operands);
        if let [a, b, c, d, e, f, ..] = vals[..] {
            self.state.text_matrix = [a, b, c, d, e, f];
            self.state.line_matrix = self.state.text_matrix;
        }
    }

    fn set_fill(&mut self, components: &[f32]) {
        if let Some(color) = color_from_components(components) {
            self.state.fill_color = color;
        }
    }

    /// Shared by `Tj`, `'` and `"`.
    fn show_string(&mut self, operand: &PdfValue) {
        let text = self.decode(operand);
        if text.is_empty() {
            return;
        }
        let x = self.state.x();
        let y = self.state.y() + self.state.text_rise;
        self.spans.push(self.state.make_span(text.clone(), x, y));
        self.state.advance_after_show(&text);
    }

    /// `TJ`: strings interleaved with kerning adjustments in thousandths
    /// of a text-space unit. A large enough negative adjustment reads as a
    /// word gap.
    fn show_array(&mut self, elements: &[PdfValue]) {
        let mut buf = String::new();
        let mut span_x = self.state.x();
        let span_y = self.state.y() + self.state.text_rise;

        for elem in elements {
            if let PdfValue::Str(_) = elem {
                let fragment = self.decode(elem);
                if buf.is_empty() {
                    span_x = self.state.x();
                }
                buf.push_str(&fragment);
                self.state.advance_after_show(&fragment);
            } else if let Some(adj) = get_number_from_value(elem) {
                let dx = -adj / 1000.0 * self.state.font_size * self.state.horiz_scale;
                if dx > self.state.char_width() * 0.3 && !buf.is_empty() {
                    buf.push(' ');
                }
                self.state.advance_x(dx);
            }
        }

        let trimmed = buf.trim_end();
        if !trimmed.is_empty() {
            self.spans
                .push(self.state.make_span(trimmed.to_string(), span_x, span_y));
        }
    }

    fn apply(&mut self, operator: &str, operands: &[PdfValue]) {
        match operator {
            // -- Text object delimiters --------------------------------
            "BT" => {
                self.state.text_matrix = IDENTITY_MATRIX;
                self.state.line_matrix = IDENTITY_MATRIX;
            }
            // Font state survives ET; some producers reuse it.
            "ET" => {}

            "Tf" => self.handle_tf(operands),

            // -- Text matrix / position ---------------------------------
            "Tm" => self.handle_tm(operands),
            "Td" | "TD" => {
                if let [tx, ty, ..] = numeric_operands(operands)[..] {
                    if operator == "TD" {
                        self.state.leading = -ty;
                    }
                    self.state.translate_line(tx, ty);
                }
            }
            "T*" => self.state.next_line(),
            "TL" => {
                if let Some(v) = first_number(operands) {
                    self.state.leading = v;
                }
            }

            // -- Spacing / scaling --------------------------------------
            "Tc" => {
                if let Some(v) = first_number(operands) {
                    self.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = first_number(operands) {
                    self.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = first_number(operands) {
                    self.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = first_number(operands) {
                    self.state.text_rise = v;
                }
            }

            // -- Fill colour --------------------------------------------
            "g" | "rg" | "k" | "sc" | "scn" => self.set_fill(&numeric_operands(operands)),

            // -- Show text ----------------------------------------------
            "Tj" => {
                if let Some(first) = operands.first() {
                    self.show_string(first);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    self.show_array(arr);
                }
            }
            "'" => {
                self.state.next_line();
                if let Some(first) = operands.first() {
                    self.show_string(first);
                }
            }
            "\"" => {
                if let [aw, ac, text, ..] = operands {
                    if let Some(aw) = get_number_from_value(aw) {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = get_number_from_value(ac) {
                        self.state.char_spacing = ac;
                    }
                    self.state.next_line();
                    self.show_string(text);
                }
            }

            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk a single page's content stream and produce its [`TextSpan`]s in
/// drawing order.
///
/// | Operator | Action |
/// |----------|--------|
/// | `BT` / `ET` | Begin (reset matrices) / end text object |
/// | `Tf` | Set font and size |
/// | `Tm`, `Td`, `TD`, `T*`, `TL` | Position and leading |
/// | `Tc`, `Tw`, `Tz`, `Ts` | Spacing, scaling, rise |
/// | `Tj`, `TJ`, `'`, `"` | Show text |
/// | `g`, `rg`, `k`, `sc`, `scn` | Fill colour |
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;

    let mut walker = PageWalker {
        backend,
        page_id,
        fonts: backend.page_fonts(page_id).unwrap_or_else(|e| {
            log::warn!("page {:?}: cannot read font resources: {}", page_id, e);
            Vec::new()
        }),
        state: TextState::default(),
        spans: Vec::new(),
    };
    for op in &ops {
        walker.apply(&op.operator, &op.operands);
    }

    log::trace!(
        "page {:?}: {} content ops, {} spans",
        page_id,
        ops.len(),
        walker.spans.len()
    );
    Ok(walker.spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::super::backend::ContentOp;
    use super::*;

    /// Replays a fixed list of content operations for every page.
    pub(crate) struct MockBackend {
        pub page_ids: BTreeMap<u32, PageId>,
        pub fonts: Vec<BackendFontInfo>,
        pub images: Vec<Vec<u8>>,
        pub ops: Vec<ContentOp>,
    }

    impl MockBackend {
        pub fn single_page(ops: Vec<ContentOp>) -> Self {
            MockBackend {
                page_ids: BTreeMap::from([(1, (1, 0))]),
                fonts: fonts(),
                images: Vec::new(),
                ops,
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.page_ids.clone()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
            Ok(self.fonts.clone())
        }

        fn page_image_names(&self, _page: PageId) -> Result<Vec<Vec<u8>>, PdfError> {
            Ok(self.images.clone())
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
            Ok(vec![])
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font_name: &[u8], data: &[u8]) -> String {
            decode_text_simple(data)
        }
    }

    fn font(key: &[u8], base: &str) -> BackendFontInfo {
        BackendFontInfo {
            name: key.to_vec(),
            base_font: Some(base.to_string()),
            encoding: None,
        }
    }

    pub(crate) fn fonts() -> Vec<BackendFontInfo> {
        vec![
            font(b"F1", "Helvetica"),
            font(b"F2", "ABCDEF+Times-BoldItalic"),
            font(b"F3", "Courier"),
        ]
    }

    pub(crate) fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    pub(crate) fn reals(values: &[f32]) -> Vec<PdfValue> {
        values.iter().map(|&v| PdfValue::Real(v)).collect()
    }

    pub(crate) fn tf(font: &[u8], size: f32) -> ContentOp {
        op("Tf", vec![PdfValue::Name(font.to_vec()), PdfValue::Real(size)])
    }

    pub(crate) fn at(x: f32, y: f32) -> ContentOp {
        op("Tm", reals(&[1.0, 0.0, 0.0, 1.0, x, y]))
    }

    pub(crate) fn tj(text: &str) -> ContentOp {
        op("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    fn spans_of(ops: Vec<ContentOp>) -> Vec<TextSpan> {
        extract_page_spans(&MockBackend::single_page(ops), (1, 0)).unwrap()
    }

    #[test]
    fn test_extract_simple_tj() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            at(72.0, 700.0),
            tj("Hello World"),
            op("ET", vec![]),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello World");
        assert!((spans[0].x - 72.0).abs() < 0.01);
        assert!((spans[0].y - 700.0).abs() < 0.01);
        assert!((spans[0].font_size - 12.0).abs() < 0.01);
        assert_eq!(spans[0].font_name, "Helvetica");
        assert!(!spans[0].is_bold && !spans[0].is_italic && !spans[0].is_serif);
        assert_eq!(spans[0].color, 0x000000);
    }

    #[test]
    fn test_font_name_sets_traits() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F2", 14.0),
            at(72.0, 700.0),
            tj("Bold italic serif"),
            tf(b"F3", 10.0),
            tj("mono"),
            op("ET", vec![]),
        ]);
        assert_eq!(spans[0].font_name, "Times-BoldItalic");
        assert!(spans[0].is_bold && spans[0].is_italic && spans[0].is_serif);
        assert!(!spans[0].is_monospace);
        assert!(spans[1].is_monospace && !spans[1].is_serif && !spans[1].is_bold);
    }

    #[test]
    fn test_matrix_scale_sets_effective_size() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 1.0),
            op("Tm", reals(&[18.0, 0.0, 0.0, 18.0, 72.0, 700.0])),
            tj("Scaled"),
        ]);
        assert!((spans[0].font_size - 18.0).abs() < 0.01);
    }

    #[test]
    fn test_fill_colour_operators() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            at(72.0, 700.0),
            op("rg", reals(&[1.0, 0.0, 0.0])),
            tj("red"),
            op("g", reals(&[0.5])),
            tj("gray"),
            op("k", reals(&[0.0, 0.0, 0.0, 1.0])),
            tj("black"),
            op(
                "scn",
                vec![
                    PdfValue::Real(0.0),
                    PdfValue::Real(0.0),
                    PdfValue::Real(1.0),
                    PdfValue::Name(b"P0".to_vec()),
                ],
            ),
            tj("blue"),
            // Stroking colour leaves the fill untouched.
            op("RG", reals(&[0.0, 1.0, 0.0])),
            tj("still blue"),
        ]);
        let colors: Vec<u32> = spans.iter().map(|s| s.color).collect();
        assert_eq!(
            colors,
            vec![0xFF0000, 0x808080, 0x000000, 0x0000FF, 0x0000FF]
        );
    }

    #[test]
    fn test_text_rise_marks_superscript() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            at(72.0, 700.0),
            tj("E = mc"),
            op("Ts", reals(&[4.0])),
            tj("2"),
        ]);
        assert!(!spans[0].is_superscript);
        assert!(spans[1].is_superscript);
        assert!((spans[1].y - 704.0).abs() < 0.01);
    }

    #[test]
    fn test_extract_tj_array_with_large_kerning_inserts_space() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            at(72.0, 700.0),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"Hel".to_vec()),
                    PdfValue::Integer(-10),
                    PdfValue::Str(b"lo".to_vec()),
                    PdfValue::Integer(-500),
                    PdfValue::Str(b"World".to_vec()),
                ])],
            ),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello World");
    }

    #[test]
    fn test_td_and_leading() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F1", 12.0),
            op("TD", reals(&[72.0, -14.0])),
            tj("Line 1"),
            op("T*", vec![]),
            tj("Line 2"),
            op("TL", reals(&[10.0])),
            op("'", vec![PdfValue::Str(b"Line 3".to_vec())]),
            op(
                "\"",
                vec![
                    PdfValue::Real(0.0),
                    PdfValue::Real(0.0),
                    PdfValue::Str(b"Line 4".to_vec()),
                ],
            ),
        ]);
        let ys: Vec<f32> = spans.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![-14.0, -28.0, -38.0, -48.0]);
        assert_eq!(spans[3].text, "Line 4");
    }

    #[test]
    fn test_bt_resets_matrix_but_keeps_font() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F2", 12.0),
            op("Td", reals(&[72.0, 700.0])),
            tj("First object"),
            op("ET", vec![]),
            op("BT", vec![]),
            op("Td", reals(&[72.0, 600.0])),
            tj("Second object"),
            op("ET", vec![]),
        ]);
        assert_eq!(spans.len(), 2);
        assert!((spans[1].y - 600.0).abs() < 0.01);
        assert_eq!(spans[1].font_name, "Times-BoldItalic");
    }

    #[test]
    fn test_empty_string_and_unknown_font() {
        let spans = spans_of(vec![
            op("BT", vec![]),
            tf(b"F99", 12.0),
            at(72.0, 700.0),
            tj(""),
            tj("Visible"),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Visible");
        assert_eq!(spans[0].font_name, "F99");
    }

    /// Font resources that cannot be read.
    struct BrokenFonts(MockBackend);

    impl PdfBackend for BrokenFonts {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.0.pages()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
            Err(PdfError::Parse("bad /Font dictionary".to_string()))
        }

        fn page_image_names(&self, page: PageId) -> Result<Vec<Vec<u8>>, PdfError> {
            self.0.page_image_names(page)
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
            self.0.page_content(page)
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            self.0.decode_content(data)
        }

        fn decode_text(&self, page: PageId, font_name: &[u8], data: &[u8]) -> String {
            self.0.decode_text(page, font_name, data)
        }
    }

    #[test]
    fn test_unreadable_fonts_fall_back_to_resource_names() {
        let backend = BrokenFonts(MockBackend::single_page(vec![
            op("BT", vec![]),
            tf(b"F2", 14.0),
            at(72.0, 700.0),
            tj("Still here"),
            op("ET", vec![]),
        ]));

        let spans = extract_page_spans(&backend, (1, 0)).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Still here");
        assert_eq!(spans[0].font_name, "F2");
        assert!(!spans[0].is_bold);
    }

    #[test]
    fn test_color_from_components() {
        assert_eq!(color_from_components(&[1.0]), Some(0xFFFFFF));
        assert_eq!(color_from_components(&[0.0, 1.0, 0.0]), Some(0x00FF00));
        assert_eq!(color_from_components(&[1.0, 0.0, 0.0, 0.0]), Some(0x00FFFF));
        assert_eq!(color_from_components(&[2.0, -1.0, 0.0]), Some(0xFF0000));
        assert_eq!(color_from_components(&[0.1, 0.2]), None);
        assert_eq!(color_from_components(&[]), None);
    }

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Arial-Bold"), "Arial-Bold");
        assert_eq!(strip_subset_prefix("Arial+Bold"), "Arial+Bold");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
    }
}
