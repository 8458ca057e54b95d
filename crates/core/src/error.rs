use thiserror::Error;

use crate::style::FontSize;
use crate::tags::Tag;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Zero discriminating font styles found")]
    NoStylesFound,

    #[error("Heading {tag} never occurs in the tagged sequence")]
    NoHeadingOccurrences { tag: Tag },

    #[error("Font size {0} has no structural tag")]
    UntaggedSize(FontSize),

    #[error("Invalid structural tag: {0}")]
    InvalidTag(String),
}

pub type Result<T> = std::result::Result<T, Error>;
