use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
    /// Encoding entry from the font dictionary, if present.
    pub encoding: Option<String>,
}

/// A lopdf-independent PDF value, so the layout code can be driven by plain
/// data in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// Stream objects keep only their dictionary.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(convert_dict(dict)),
        lopdf::Object::Stream(stream) => PdfValue::Dict(convert_dict(&stream.dict)),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

fn convert_dict(dict: &lopdf::Dictionary) -> Vec<(Vec<u8>, PdfValue)> {
    dict.iter()
        .map(|(k, v)| (k.clone(), convert_object(v)))
        .collect()
}

/// Best-effort decoding of raw PDF string bytes.
///
/// UTF-16BE with a BOM first, then UTF-8, then Latin-1 byte by byte.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, payload @ ..] = bytes {
        let code_units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
///
/// Layout extraction only talks to this trait, so it can be tested against
/// a mock that replays a fixed list of content operations.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Resource names of the image XObjects a page can draw with `Do`.
    fn page_image_names(&self, page: PageId) -> Result<Vec<Vec<u8>>, PdfError>;

    /// Return the raw (possibly compressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operator using whatever encoding
    /// hints the page's font offers.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    // -- private helpers ----------------------------------------------------

    /// Follow one level of indirection to a dictionary.
    fn resolve_dict<'a>(&'a self, obj: &'a lopdf::Object) -> Option<&'a lopdf::Dictionary> {
        match obj {
            lopdf::Object::Dictionary(d) => Some(d),
            lopdf::Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok(),
            _ => None,
        }
    }

    /// The page's `Resources -> XObject` dictionary, if any.
    fn xobject_dict(&self, page: PageId) -> Result<Option<&lopdf::Dictionary>, PdfError> {
        let page_dict = self
            .doc
            .get_object(page)
            .and_then(|obj| obj.as_dict())
            .map_err(|e| PdfError::Parse(format!("cannot get page dictionary: {}", e)))?;

        let xobjects = page_dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
            .and_then(|resources| resources.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj));

        Ok(xobjects)
    }

    fn is_image_stream(&self, obj: &lopdf::Object) -> bool {
        let resolved = match obj {
            lopdf::Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(target) => target,
                Err(_) => return false,
            },
            other => other,
        };
        let lopdf::Object::Stream(stream) = resolved else {
            return false;
        };
        stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Image")
    }

    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        match font_dict.get(b"Encoding").ok()? {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts_map
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: name_of(dict, b"BaseFont"),
                encoding: name_of(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_image_names(&self, page: PageId) -> Result<Vec<Vec<u8>>, PdfError> {
        let Some(xobjects) = self.xobject_dict(page)? else {
            return Ok(Vec::new());
        };

        let names = xobjects
            .iter()
            .filter(|&(_, obj)| self.is_image_stream(obj))
            .map(|(name, _)| name.clone())
            .collect();

        Ok(names)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        // Identity-H / Identity-V fonts usually carry 2-byte codes.
        let identity = self
            .font_encoding_name(page, font_name)
            .is_some_and(|enc| enc.contains("Identity"));
        if identity && bytes.len() >= 2 && bytes.len().is_multiple_of(2) {
            let code_units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&code_units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("caf\u{00E9}".as_bytes()), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_latin1() {
        // 0xE9 is U+00E9 in Latin-1 but not valid standalone UTF-8.
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_utf16be() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF]), "");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00]), "A");
    }

    #[test]
    fn get_number_accepts_integer_and_real() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(-10)), Some(-10.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Name(b"F1".to_vec())), None);
    }

    #[test]
    fn convert_nested_values() {
        let mut dict = lopdf::Dictionary::new();
        dict.set(
            "Box",
            lopdf::Object::Array(vec![lopdf::Object::Integer(0), lopdf::Object::Real(612.0)]),
        );
        dict.set("Ref", lopdf::Object::Reference((7, 0)));

        match convert_object(&lopdf::Object::Dictionary(dict)) {
            PdfValue::Dict(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(entries.contains(&(
                    b"Box".to_vec(),
                    PdfValue::Array(vec![PdfValue::Integer(0), PdfValue::Real(612.0)])
                )));
                assert!(entries.contains(&(b"Ref".to_vec(), PdfValue::Reference((7, 0)))));
            }
            other => panic!("expected Dict, got {:?}", other),
        }
    }

    #[test]
    fn convert_stream_keeps_dictionary() {
        let mut dict = lopdf::Dictionary::new();
        dict.set("Subtype", lopdf::Object::Name(b"Image".to_vec()));
        let obj = lopdf::Object::Stream(lopdf::Stream::new(dict, vec![1, 2, 3]));

        match convert_object(&obj) {
            PdfValue::Dict(entries) => {
                assert!(entries.contains(&(
                    b"Subtype".to_vec(),
                    PdfValue::Name(b"Image".to_vec())
                )));
                // lopdf records the payload length on the stream dictionary.
                assert!(entries.contains(&(b"Length".to_vec(), PdfValue::Integer(3))));
            }
            other => panic!("expected Dict, got {:?}", other),
        }
    }

    #[test]
    fn load_bytes_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
