//! Core library for typochunk
//!
//! This crate implements the **Functional Core** of typochunk: structure
//! inference over a document's typography, with zero I/O. The `typochunk`
//! binary crate is the Imperative Shell that reads PDFs or span trees,
//! prints results and talks to the rewriting model.
//!
//! # Pipeline
//!
//! - [`census`]: count how often each font style occurs
//! - [`tags`]: map every font size to `<hN>`, `<p>` or `<sN>`
//! - [`linearize`]: flatten pages into a tagged reading-order sequence
//! - [`select`]: keep the heading tags that occur at a plausible rate
//! - [`partition`]: cut the sequence into chunks at a heading tag
//! - [`pipeline`]: all of the above in one call
//!
//! The remaining modules ([`budget`], [`prompt`], [`retry`]) hold the pure
//! parts of chunk rewriting; the shell owns the actual model calls.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use typochunk_core::{analyze, Document, StructureConfig};
//!
//! let document: Document = serde_json::from_str(&json)?;
//! let structure = analyze(&document, &StructureConfig::default())?;
//! for section in &structure.sections {
//!     println!("{}: {} chunks", section.tag, section.chunks.len());
//! }
//! ```

pub mod budget;
pub mod census;
pub mod document;
pub mod error;
pub mod linearize;
pub mod partition;
pub mod pipeline;
pub mod prompt;
pub mod retry;
pub mod select;
pub mod style;
pub mod tags;

pub use document::{Block, Document, Line, Page, Span};
pub use error::{Error, Result};
pub use pipeline::{analyze, DocumentStructure, HeadingChunks, RankedHeading, StructureConfig};
pub use style::{FontSize, Granularity, StyleKey};
pub use tags::Tag;
