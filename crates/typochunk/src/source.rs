//! Document sources: PDF files through the `pdf` crate, or a span tree
//! serialized as JSON.

use std::path::{Path, PathBuf};

use pdf::{LayoutBlock, PageLayout, PdfError, TextSpan};
use typochunk_core::document::{
    FLAG_BOLD, FLAG_ITALIC, FLAG_MONOSPACE, FLAG_SERIF, FLAG_SUPERSCRIPT,
};
use typochunk_core::{
    analyze, Block, Document, DocumentStructure, Granularity, Line, Page, Span, StructureConfig,
};

use crate::config::Settings;
use crate::prelude::*;

/// Arguments shared by every command that reads a document.
#[derive(Debug, Clone, clap::Args)]
pub struct DocumentArgs {
    /// Path to a PDF file or a .json span tree
    pub path: PathBuf,

    /// Tell styles apart by font, flags and colour as well as size
    #[clap(long)]
    pub granular: bool,
}

impl DocumentArgs {
    /// Structure settings with the command line applied on top.
    pub fn structure_config(&self, settings: &Settings) -> StructureConfig {
        let mut config = settings.structure;
        if self.granular {
            config.granularity = Granularity::Full;
        }
        config
    }

    pub fn load(&self) -> Result<Document> {
        load_document(&self.path)
    }

    pub fn analyze(&self, settings: &Settings) -> Result<DocumentStructure> {
        self.analyze_with(&self.structure_config(settings))
    }

    pub fn analyze_with(&self, config: &StructureConfig) -> Result<DocumentStructure> {
        let document = self.load()?;
        analyze(&document, config)
            .wrap_err_with(|| format!("Failed to analyze '{}'", self.path.display()))
    }
}

/// How a path is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    SpanTree,
}

impl SourceKind {
    /// `.json` files are span trees; anything else is read as a PDF.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceKind::SpanTree,
            _ => SourceKind::Pdf,
        }
    }
}

/// Load the document at `path`.
pub fn load_document(path: &Path) -> Result<Document> {
    let document = match SourceKind::of(path) {
        SourceKind::SpanTree => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read '{}'", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("'{}' is not a valid span tree", path.display()))?
        }
        SourceKind::Pdf => {
            let bytes = std::fs::read(path)
                .wrap_err_with(|| format!("Failed to read '{}'", path.display()))?;
            pdf_document(&bytes, path)?
        }
    };

    log::debug!(
        "loaded {} ({} pages)",
        path.display(),
        document.page_count()
    );
    Ok(document)
}

fn pdf_document(bytes: &[u8], path: &Path) -> Result<Document> {
    if !looks_like_pdf(bytes) {
        return Err(Error::UnsupportedInput(format!(
            "'{}' is neither a PDF nor a .json span tree",
            path.display()
        ))
        .into());
    }

    match pdf::extract_pages(bytes) {
        Ok(pages) => Ok(document_from_layout(&pages)),
        Err(PdfError::Encrypted) => Err(Error::UnsupportedInput(format!(
            "'{}' is encrypted",
            path.display()
        ))
        .into()),
        Err(e) => Err(eyre!(e).wrap_err(format!("Failed to parse '{}'", path.display()))),
    }
}

/// The `%PDF-` header may be preceded by up to 1024 bytes of junk.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes
        .windows(5)
        .take(1024)
        .any(|window| window == b"%PDF-")
}

/// Convert extracted page layouts into the core document model.
pub fn document_from_layout(pages: &[PageLayout]) -> Document {
    Document::new(
        pages
            .iter()
            .map(|page| Page {
                blocks: page.blocks.iter().map(block_from_layout).collect(),
            })
            .collect(),
    )
}

fn block_from_layout(block: &LayoutBlock) -> Block {
    match block {
        LayoutBlock::Text(text) => Block::Text {
            lines: text
                .lines
                .iter()
                .map(|line| Line {
                    spans: line.spans.iter().map(span_from_layout).collect(),
                })
                .collect(),
        },
        LayoutBlock::Image { .. } => Block::Image,
    }
}

fn span_from_layout(span: &TextSpan) -> Span {
    let flags = [
        (span.is_superscript, FLAG_SUPERSCRIPT),
        (span.is_italic, FLAG_ITALIC),
        (span.is_serif, FLAG_SERIF),
        (span.is_monospace, FLAG_MONOSPACE),
        (span.is_bold, FLAG_BOLD),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .fold(0, |acc, (_, bit)| acc | bit);

    Span {
        text: span.text.clone(),
        // Text matrix products leave float noise such as 11.999999.
        size: (span.font_size * 100.0).round() / 100.0,
        font: span.font_name.clone(),
        flags,
        color: span.color,
    }
}

#[cfg(test)]
mod tests {
    use pdf::{TextBlock, TextLine};

    use super::*;

    fn layout_span(text: &str, font_size: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x: 72.0,
            y: 700.0,
            width: 10.0,
            font_size,
            font_name: "Times-Bold".to_string(),
            is_bold: true,
            is_italic: false,
            is_monospace: false,
            is_serif: true,
            is_superscript: false,
            color: 0x336699,
        }
    }

    #[test]
    fn test_source_kind_by_extension() {
        assert_eq!(SourceKind::of(Path::new("doc.json")), SourceKind::SpanTree);
        assert_eq!(SourceKind::of(Path::new("DOC.JSON")), SourceKind::SpanTree);
        assert_eq!(SourceKind::of(Path::new("manual.pdf")), SourceKind::Pdf);
        assert_eq!(SourceKind::of(Path::new("manual")), SourceKind::Pdf);
    }

    #[test]
    fn test_layout_conversion_keeps_structure_and_style() {
        let pages = vec![PageLayout {
            number: 1,
            blocks: vec![
                LayoutBlock::Text(TextBlock {
                    lines: vec![TextLine {
                        spans: vec![layout_span("Timers", 17.999_998)],
                        y: 700.0,
                        x: 72.0,
                        font_size: 18.0,
                    }],
                }),
                LayoutBlock::Image {
                    name: "Im0".to_string(),
                },
            ],
        }];

        let document = document_from_layout(&pages);
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.pages[0].blocks.len(), 2);
        assert_eq!(document.pages[0].blocks[1], Block::Image);

        let span = &document.pages[0].blocks[0].lines()[0].spans[0];
        assert_eq!(span.text, "Timers");
        assert_eq!(span.size, 18.0);
        assert_eq!(span.font, "Times-Bold");
        assert_eq!(span.flags, FLAG_BOLD | FLAG_SERIF);
        assert_eq!(span.color, 0x336699);
    }

    #[test]
    fn test_load_span_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        std::fs::write(
            &path,
            r#"{"pages":[{"blocks":[{"kind":"text","lines":[{"spans":[{"text":"Hi","size":12.0}]}]},{"kind":"image"}]}]}"#,
        )
        .unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.text_spans().count(), 1);
    }

    #[test]
    fn test_non_pdf_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just some text").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_broken_span_tree_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"pages":[{"blocks":[{"kind":"text"}]}]}"#).unwrap();

        assert!(load_document(&path).is_err());
    }

    #[test]
    fn test_granular_flag_overrides_settings() {
        let args = DocumentArgs {
            path: PathBuf::from("manual.pdf"),
            granular: true,
        };
        let settings = Settings::default();
        assert_eq!(settings.structure.granularity, Granularity::Size);
        assert_eq!(
            args.structure_config(&settings).granularity,
            Granularity::Full
        );

        let args = DocumentArgs {
            granular: false,
            ..args
        };
        assert_eq!(
            args.structure_config(&settings).granularity,
            Granularity::Size
        );
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(looks_like_pdf(b"\xEF\xBB\xBF%PDF-1.4"));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b""));
    }
}
