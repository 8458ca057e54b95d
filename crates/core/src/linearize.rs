//! Block linearizer: turns the page/block/line/span tree into a flat,
//! tagged reading-order sequence.
//!
//! Spans of the same size that follow each other inside a block are one
//! logical unit (wrapped body text, a heading broken over two lines) and are
//! merged into a single entry. Each merge is recorded in a
//! [`FrequencyDelta`] so the census can retract the merged span's count.
//! Crossing a block boundary always starts a new entry, even at the same
//! size.

use std::fmt;

use serde::Serialize;

use crate::census::FrequencyDelta;
use crate::document::{Block, Document, Span};
use crate::error::{Error, Result};
use crate::style::{FontSize, Granularity, StyleKey};
use crate::tags::{SizeTagTable, Tag};

/// Appended to the block accumulator at every line end.
pub const BOUNDARY_MARKER: char = '|';

/// One element of the tagged reading-order sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedEntry {
    pub tag: Tag,
    /// Span texts joined by single spaces, with boundary markers.
    pub body: String,
}

impl TaggedEntry {
    /// Body text without boundary markers.
    pub fn text(&self) -> String {
        self.body.replace(BOUNDARY_MARKER, "")
    }
}

impl fmt::Display for TaggedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag, self.body)
    }
}

/// Output of [`linearize`].
#[derive(Debug, Clone, Default)]
pub struct Linearized {
    pub entries: Vec<TaggedEntry>,
    pub delta: FrequencyDelta,
}

/// Where a heading tag starts an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagPosition {
    pub tag: Tag,
    pub position: usize,
}

impl Linearized {
    /// Positions of every entry that starts with a heading tag.
    pub fn tag_index(&self) -> Vec<TagPosition> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.tag.is_heading())
            .map(|(position, entry)| TagPosition {
                tag: entry.tag,
                position,
            })
            .collect()
    }

    /// Entries rendered as `<tag>body` strings.
    pub fn rendered(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// Block accumulator. `tag` is `None` until a span with text arrives, so
/// a blank accumulator holds nothing but boundary markers.
#[derive(Debug, Default)]
struct Accumulator {
    tag: Option<Tag>,
    body: String,
}

impl Accumulator {
    fn start(tag: Tag, text: &str) -> Self {
        Accumulator {
            tag: Some(tag),
            body: text.to_string(),
        }
    }

    fn markers_only() -> Self {
        Accumulator {
            tag: None,
            body: BOUNDARY_MARKER.to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        self.tag.is_none()
    }

    fn push_text(&mut self, text: &str) {
        self.body.push(' ');
        self.body.push_str(text);
    }

    fn mark_boundary(&mut self) {
        self.body.push(BOUNDARY_MARKER);
    }
}

#[derive(Debug)]
enum State {
    BeforeFirstSpan,
    AccumulatingBlock { previous: FontSize, current: Accumulator },
    FlushedBoundary { previous: FontSize },
}

/// Per-document traversal. Lives for exactly one [`linearize`] call.
struct Linearizer<'a> {
    tags: &'a SizeTagTable,
    granularity: Granularity,
    state: State,
    entries: Vec<TaggedEntry>,
    delta: FrequencyDelta,
}

impl<'a> Linearizer<'a> {
    fn new(tags: &'a SizeTagTable, granularity: Granularity) -> Self {
        Linearizer {
            tags,
            granularity,
            state: State::BeforeFirstSpan,
            entries: Vec::new(),
            delta: FrequencyDelta::default(),
        }
    }

    fn flush(&mut self, accumulator: Accumulator) {
        if let Some(tag) = accumulator.tag {
            self.entries.push(TaggedEntry {
                tag,
                body: accumulator.body,
            });
        }
    }

    fn span(&mut self, span: &Span) -> Result<()> {
        if !span.has_text() {
            return Ok(());
        }

        let size = FontSize::new(span.size);
        let tag = self.tags.tag_for(size).ok_or(Error::UntaggedSize(size))?;

        let current = match std::mem::replace(&mut self.state, State::BeforeFirstSpan) {
            // A fresh block starts from an empty accumulator, so same size
            // and size change both open a new entry.
            State::BeforeFirstSpan | State::FlushedBoundary { .. } => {
                Accumulator::start(tag, &span.text)
            }
            State::AccumulatingBlock {
                previous,
                mut current,
            } => {
                if previous != size {
                    self.flush(current);
                    Accumulator::start(tag, &span.text)
                } else if current.is_blank() {
                    Accumulator::start(tag, &span.text)
                } else {
                    current.push_text(&span.text);
                    self.delta.record(StyleKey::of(span, self.granularity));
                    current
                }
            }
        };

        self.state = State::AccumulatingBlock {
            previous: size,
            current,
        };
        Ok(())
    }

    fn end_line(&mut self) {
        if let State::FlushedBoundary { previous } = self.state {
            self.state = State::AccumulatingBlock {
                previous,
                current: Accumulator::markers_only(),
            };
        } else if let State::AccumulatingBlock { current, .. } = &mut self.state {
            current.mark_boundary();
        }
    }

    fn end_block(&mut self) {
        self.state = match std::mem::replace(&mut self.state, State::BeforeFirstSpan) {
            State::BeforeFirstSpan => State::BeforeFirstSpan,
            State::AccumulatingBlock { previous, current } => {
                self.flush(current);
                State::FlushedBoundary { previous }
            }
            State::FlushedBoundary { previous } => State::FlushedBoundary { previous },
        };
    }

    fn finish(self) -> Linearized {
        Linearized {
            entries: self.entries,
            delta: self.delta,
        }
    }
}

/// Walk the document in reading order and emit tagged entries.
///
/// Fails with [`Error::UntaggedSize`] when a span's size is missing from
/// `tags`, which only happens when the table was built for another document.
pub fn linearize(
    document: &Document,
    tags: &SizeTagTable,
    granularity: Granularity,
) -> Result<Linearized> {
    let mut walker = Linearizer::new(tags, granularity);

    for page in &document.pages {
        for block in &page.blocks {
            let Block::Text { lines } = block else {
                continue;
            };
            for line in lines {
                for span in &line.spans {
                    walker.span(span)?;
                }
                walker.end_line();
            }
            walker.end_block();
        }
    }

    let linearized = walker.finish();
    log::debug!(
        "linearizer: {} entries, {} merged spans",
        linearized.entries.len(),
        linearized.delta.total()
    );
    Ok(linearized)
}
