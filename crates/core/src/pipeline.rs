//! One pass over a document: census, classification, linearization,
//! heading selection and partitioning.

use serde::{Deserialize, Serialize};

use crate::census::{take_census, RankedStyle};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::linearize::{linearize, TaggedEntry};
use crate::partition::{partition, DEFAULT_MIN_CHUNK_CHARS};
use crate::select::{rank_headings, select_headings, HeadingCount, SelectionBand};
use crate::style::Granularity;
use crate::tags::{classify, SizeTag, Tag};

/// Tunables of the structure inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub granularity: Granularity,
    pub band: SelectionBand,
    pub min_chunk_chars: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Size,
            band: SelectionBand::default(),
            min_chunk_chars: DEFAULT_MIN_CHUNK_CHARS,
        }
    }
}

/// Chunks cut at one qualifying heading tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingChunks {
    pub tag: Tag,
    pub count: usize,
    pub chunks: Vec<String>,
}

/// A ranked heading with its selection verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedHeading {
    pub tag: Tag,
    pub count: usize,
    pub qualifies: bool,
}

/// Everything inferred about one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStructure {
    pub page_count: usize,
    /// Raw census, before merge correction.
    pub styles: Vec<RankedStyle>,
    /// Census after merge correction.
    pub corrected_styles: Vec<RankedStyle>,
    pub size_tags: Vec<SizeTag>,
    pub entries: Vec<TaggedEntry>,
    pub headings: Vec<RankedHeading>,
    pub sections: Vec<HeadingChunks>,
}

impl DocumentStructure {
    /// Chunks for `tag`, if it qualified.
    pub fn chunks_for(&self, tag: Tag) -> Option<&HeadingChunks> {
        self.sections.iter().find(|s| s.tag == tag)
    }
}

/// Run the whole structure inference over `document`.
///
/// A document without any text fails with [`Error::NoStylesFound`]. A
/// qualifying tag without occurrences in the tagged sequence is skipped;
/// its chunks are simply absent from the result.
pub fn analyze(document: &Document, config: &StructureConfig) -> Result<DocumentStructure> {
    let page_count = document.page_count();

    let census = take_census(document, config.granularity)?;
    let size_tags = classify(&census)?;
    let linearized = linearize(document, &size_tags, config.granularity)?;
    let corrected = census.frequencies.corrected(&linearized.delta);

    let ranked = rank_headings(&corrected, &size_tags);
    let selected = select_headings(&ranked, page_count, &config.band);
    let headings: Vec<RankedHeading> = ranked
        .iter()
        .map(|&HeadingCount { tag, count }| RankedHeading {
            tag,
            count,
            qualifies: selected.iter().any(|s| s.tag == tag),
        })
        .collect();

    let index = linearized.tag_index();
    let mut sections = Vec::new();
    for heading in &selected {
        match partition(
            &linearized.entries,
            &index,
            heading.tag,
            config.min_chunk_chars,
        ) {
            Ok(chunks) => sections.push(HeadingChunks {
                tag: heading.tag,
                count: heading.count,
                chunks,
            }),
            Err(err @ Error::NoHeadingOccurrences { .. }) => {
                log::warn!("skipping {}: {}", heading.tag, err);
            }
            Err(err) => return Err(err),
        }
    }

    log::debug!(
        "analyze: {} pages, {} headings ranked, {} used",
        page_count,
        headings.len(),
        sections.len()
    );

    Ok(DocumentStructure {
        page_count,
        styles: census.frequencies.ranked(),
        corrected_styles: corrected.ranked(),
        size_tags: size_tags.rows(),
        entries: linearized.entries,
        headings,
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Line, Page, Span};

    fn block(spans: &[(&str, f32)]) -> Block {
        Block::Text {
            lines: vec![Line {
                spans: spans.iter().map(|&(t, s)| Span::new(t, s)).collect(),
            }],
        }
    }

    /// Ten pages: a title on page one, then one section heading and a few
    /// body paragraphs per page.
    fn datasheet() -> Document {
        let body = "The register controls the timer prescaler and the overflow interrupt.";
        let mut pages = Vec::new();
        for n in 0..10 {
            let mut blocks = Vec::new();
            if n == 0 {
                blocks.push(block(&[("Device Datasheet", 24.0)]));
            }
            blocks.push(block(&[(&format!("Section {n}"), 18.0)]));
            for _ in 0..4 {
                blocks.push(block(&[(body, 12.0)]));
            }
            blocks.push(block(&[(&format!("page {n}"), 8.0)]));
            pages.push(Page { blocks });
        }
        Document::new(pages)
    }

    #[test]
    fn test_analyze_datasheet() {
        let structure = analyze(&datasheet(), &StructureConfig::default()).unwrap();

        assert_eq!(structure.page_count, 10);
        assert_eq!(structure.size_tags.len(), 4);
        assert_eq!(structure.size_tags[0].tag, Tag::Heading(1));
        assert_eq!(structure.size_tags[1].tag, Tag::Heading(2));
        assert_eq!(structure.size_tags[2].tag, Tag::Paragraph);
        assert_eq!(structure.size_tags[3].tag, Tag::Subordinate(1));

        assert_eq!(
            structure.headings,
            vec![
                RankedHeading {
                    tag: Tag::Heading(2),
                    count: 10,
                    qualifies: true
                },
                RankedHeading {
                    tag: Tag::Heading(1),
                    count: 1,
                    qualifies: true
                },
            ]
        );

        let sections = structure.chunks_for(Tag::Heading(2)).unwrap();
        // Every section is well over 200 characters; the last is trailing.
        assert_eq!(sections.chunks.len(), 10);
        assert!(sections.chunks[0].starts_with("<h2>Section 0|"));
        assert!(sections.chunks[9].starts_with("<h2>Section 9|"));

        let title = structure.chunks_for(Tag::Heading(1)).unwrap();
        assert_eq!(title.chunks.len(), 1);
        assert!(title.chunks[0].starts_with("<h1>Device Datasheet|"));
    }

    #[test]
    fn test_analyze_tighter_band_drops_title() {
        let config = StructureConfig {
            band: SelectionBand {
                lower_ratio: 0.5,
                upper_ratio: 1.5,
            },
            ..StructureConfig::default()
        };
        let structure = analyze(&datasheet(), &config).unwrap();
        assert!(structure.chunks_for(Tag::Heading(1)).is_none());
        assert!(structure.chunks_for(Tag::Heading(2)).is_some());
        assert!(!structure.headings[1].qualifies);
    }

    #[test]
    fn test_corrected_styles_reflect_merges() {
        let document = Document::new(vec![Page {
            blocks: vec![
                block(&[("Heading", 16.0), ("continued", 16.0)]),
                block(&[("a", 10.0), ("b", 10.0), ("c", 10.0)]),
            ],
        }]);
        let structure = analyze(&document, &StructureConfig::default()).unwrap();

        let raw_total: usize = structure.styles.iter().map(|s| s.count).sum();
        let corrected_total: usize = structure.corrected_styles.iter().map(|s| s.count).sum();
        assert_eq!(raw_total, 5);
        assert_eq!(corrected_total, 2);
        assert_eq!(structure.headings[0].count, 1);
    }

    #[test]
    fn test_analyze_empty_document() {
        let err = analyze(&Document::default(), &StructureConfig::default()).unwrap_err();
        assert_eq!(err, Error::NoStylesFound);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: StructureConfig = toml::from_str(
            r#"
            granularity = "full"

            [band]
            upper_ratio = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.granularity, Granularity::Full);
        assert_eq!(config.band.lower_ratio, 0.1);
        assert_eq!(config.band.upper_ratio, 2.0);
        assert_eq!(config.min_chunk_chars, 200);
    }
}
