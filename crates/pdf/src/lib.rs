//! PDF text extraction for typochunk.
//!
//! Walks each page's content stream with lopdf and returns the page as
//! blocks of lines of styled spans, which is all the structure inference
//! downstream needs: text, font size, font name, weight and slant flags,
//! and fill colour.

use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod normalize;
pub mod parser;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded PDF, ready for layout extraction.
pub struct PdfDocument {
    backend: LopdfBackend,
}

impl PdfDocument {
    /// Parse PDF bytes. Encrypted documents are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(PdfDocument {
            backend: LopdfBackend::load_bytes(bytes)?,
        })
    }

    /// Read and parse a PDF file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Lay out every page.
    pub fn pages(&self) -> Result<Vec<PageLayout>, PdfError> {
        parser::layout::layout_document(&self.backend as &dyn PdfBackend)
    }
}

/// Parse PDF bytes and lay out every page.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageLayout>, PdfError> {
    PdfDocument::from_bytes(bytes)?.pages()
}
