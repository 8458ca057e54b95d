//! Chunk partitioning: slice the tagged sequence at every occurrence of a
//! heading tag.

use crate::error::{Error, Result};
use crate::linearize::{TagPosition, TaggedEntry};
use crate::tags::Tag;

/// Interior chunks at or under this many characters are dropped.
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 200;

/// Render `entries` as `<tag>body` strings joined by single spaces.
pub fn flatten(entries: &[TaggedEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `entries` into one chunk per occurrence of `tag`.
///
/// Each chunk runs from one occurrence up to (not including) the next. An
/// interior chunk is kept only when its flattened length exceeds
/// `min_chars`; the trailing chunk, from the last occurrence to the end of
/// the document, is always kept. Anything before the first occurrence
/// belongs to no chunk.
///
/// Index positions that do not point at an entry carrying `tag` are
/// ignored.
pub fn partition(
    entries: &[TaggedEntry],
    index: &[TagPosition],
    tag: Tag,
    min_chars: usize,
) -> Result<Vec<String>> {
    let spots: Vec<usize> = index
        .iter()
        .filter(|p| p.tag == tag)
        .map(|p| p.position)
        .filter(|&position| entries.get(position).is_some_and(|e| e.tag == tag))
        .collect();

    let last = *spots.last().ok_or(Error::NoHeadingOccurrences { tag })?;

    let mut chunks: Vec<String> = spots
        .windows(2)
        .filter_map(|pair| entries.get(pair[0]..pair[1]))
        .map(flatten)
        .filter(|chunk| chunk.chars().count() > min_chars)
        .collect();
    chunks.push(flatten(&entries[last..]));

    log::debug!(
        "partition {}: {} occurrences, {} chunks kept",
        tag,
        spots.len(),
        chunks.len()
    );

    Ok(chunks)
}
