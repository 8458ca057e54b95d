//! Read-only reports: style census, tag table, chunks, span tree.

use serde::Serialize;
use typochunk_core::census::take_census;
use typochunk_core::{DocumentStructure, HeadingChunks, Tag};

use crate::config::Settings;
use crate::prelude::{eprintln, println, *};
use crate::source::DocumentArgs;

#[derive(Debug, clap::Parser)]
pub struct StylesOptions {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// Print JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, clap::Parser)]
pub struct TagsOptions {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// Print JSON instead of tables
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, clap::Parser)]
pub struct ChunksOptions {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// Only print the chunks of this heading tag (e.g. h2)
    #[clap(long)]
    pub tag: Option<Tag>,

    /// Drop interior chunks of at most this many characters
    #[clap(long)]
    pub min_chunk_chars: Option<usize>,
}

#[derive(Debug, clap::Parser)]
pub struct ExtractOptions {
    /// Path to the PDF file
    pub path: std::path::PathBuf,
}

#[derive(Debug, Serialize)]
struct StyleRow<'a> {
    rank: usize,
    key: String,
    count: usize,
    font: &'a str,
    flags: u32,
    color: String,
}

#[derive(Debug, Serialize)]
struct TagsReport<'a> {
    page_count: usize,
    lower_bound: usize,
    upper_bound: f64,
    size_tags: &'a [typochunk_core::tags::SizeTag],
    headings: &'a [typochunk_core::RankedHeading],
}

pub async fn styles(options: StylesOptions, settings: Settings, global: crate::Global) -> Result<()> {
    let config = options.document.structure_config(&settings);
    let document = options.document.load()?;
    let census = take_census(&document, config.granularity)
        .wrap_err_with(|| format!("No styles in '{}'", options.document.path.display()))?;

    let rows: Vec<StyleRow> = census
        .frequencies
        .ranked()
        .into_iter()
        .enumerate()
        .map(|(i, ranked)| {
            let style = census.registry.get(&ranked.key);
            StyleRow {
                rank: i + 1,
                key: ranked.key.to_string(),
                count: ranked.count,
                font: style.map(|s| s.font.as_str()).unwrap_or_default(),
                flags: style.map(|s| s.flags).unwrap_or_default(),
                color: format!("#{:06x}", style.map(|s| s.color).unwrap_or_default()),
            }
        })
        .collect();

    if global.verbose {
        eprintln!(
            "{} pages, {} styles, {} spans",
            document.page_count(),
            rows.len(),
            census.frequencies.total()
        );
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["RANK", "STYLE", "COUNT", "FONT", "FLAGS", "COLOR"]);
    for r in &rows {
        table.add_row(prettytable::row![r.rank, r.key, r.count, r.font, r.flags, r.color]);
    }
    table.printstd();

    Ok(())
}

pub async fn tags(options: TagsOptions, settings: Settings, global: crate::Global) -> Result<()> {
    let band = settings.structure.band;
    let structure = options.document.analyze(&settings)?;
    let report = TagsReport {
        page_count: structure.page_count,
        lower_bound: band.lower_bound(structure.page_count),
        upper_bound: band.upper_bound(structure.page_count),
        size_tags: &structure.size_tags,
        headings: &structure.headings,
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut sizes = new_table();
    sizes.add_row(prettytable::row!["SIZE", "TAG"]);
    for size_tag in report.size_tags {
        sizes.add_row(prettytable::row![size_tag.size, size_tag.tag]);
    }
    sizes.printstd();

    println!();

    let mut headings = new_table();
    headings.add_row(prettytable::row!["HEADING", "COUNT", "QUALIFIES"]);
    for heading in report.headings {
        headings.add_row(prettytable::row![
            heading.tag,
            heading.count,
            if heading.qualifies { "yes" } else { "no" }
        ]);
    }
    headings.printstd();

    if global.verbose {
        eprintln!(
            "{} pages; a heading qualifies with {} to {} occurrences",
            report.page_count, report.lower_bound, report.upper_bound
        );
    }

    Ok(())
}

pub async fn chunks(options: ChunksOptions, settings: Settings, global: crate::Global) -> Result<()> {
    let mut config = options.document.structure_config(&settings);
    if let Some(min) = options.min_chunk_chars {
        config.min_chunk_chars = min;
    }

    let structure = options.document.analyze_with(&config)?;
    let sections = select_sections(&structure, options.tag)?;

    if global.verbose {
        for section in &sections {
            eprintln!(
                "{}: {} occurrences, {} chunks",
                section.tag,
                section.count,
                section.chunks.len()
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&sections)?);

    Ok(())
}

pub async fn extract(options: ExtractOptions, _settings: Settings, global: crate::Global) -> Result<()> {
    let document = crate::source::load_document(&options.path)?;

    if global.verbose {
        eprintln!(
            "{} pages, {} text spans",
            document.page_count(),
            document.text_spans().count()
        );
    }

    println!("{}", serde_json::to_string_pretty(&document)?);

    Ok(())
}

/// The sections to work on: every qualifying heading, or just `tag`.
///
/// Asking for a tag that did not qualify is an error.
pub fn select_sections(
    structure: &DocumentStructure,
    tag: Option<Tag>,
) -> Result<Vec<&HeadingChunks>> {
    match tag {
        None => Ok(structure.sections.iter().collect()),
        Some(tag) => {
            let section = structure
                .chunks_for(tag)
                .ok_or(Error::TagNotSelected(tag.to_string()))?;
            Ok(vec![section])
        }
    }
}

#[cfg(test)]
mod tests {
    use typochunk_core::{analyze, Block, Document, Line, Page, Span, StructureConfig};

    use super::*;

    fn page(spans: &[(&str, f32)]) -> Page {
        Page {
            blocks: spans
                .iter()
                .map(|&(text, size)| Block::Text {
                    lines: vec![Line {
                        spans: vec![Span::new(text, size)],
                    }],
                })
                .collect(),
        }
    }

    fn structure() -> DocumentStructure {
        let body = "Body text that runs long enough to count as a paragraph.";
        let pages = (1..=4)
            .map(|i| {
                let heading = format!("Chapter {}", i);
                page(&[
                    (heading.as_str(), 18.0),
                    (body, 10.0),
                    (body, 10.0),
                    (body, 10.0),
                ])
            })
            .collect();
        let config = StructureConfig {
            min_chunk_chars: 0,
            ..StructureConfig::default()
        };
        analyze(&Document::new(pages), &config).unwrap()
    }

    #[test]
    fn test_all_sections_without_tag() {
        let structure = structure();
        let sections = select_sections(&structure, None).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tag, Tag::Heading(1));
        assert_eq!(sections[0].chunks.len(), 4);
    }

    #[test]
    fn test_requested_tag() {
        let structure = structure();
        let sections = select_sections(&structure, Some(Tag::Heading(1))).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].chunks[0].starts_with("<h1>Chapter 1"));
    }

    #[test]
    fn test_non_qualifying_tag_is_an_error() {
        let structure = structure();
        let err = select_sections(&structure, Some(Tag::Heading(3))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::TagNotSelected(tag)) if tag == "<h3>"
        ));
    }
}
