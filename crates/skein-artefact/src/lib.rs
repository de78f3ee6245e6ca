//! Skein Artefact Model
//!
//! Parsing and byte-preserving serialization for artefact documents:
//! markdown-like files combining a key/value frontmatter block with a body
//! of heading-delimited sections.
//!
//! # Core Concepts
//!
//! - [`Artefact`]: a parsed document (metadata + sections + original bytes)
//! - [`Metadata`]: ordered frontmatter mapping with a round-tripping codec
//! - [`Sections`]: the body split at second-level headings
//! - [`TaskLine`]: checklist lines with tags and trailing annotations
//! - [`TraceRecord`]: JSON trace records embedded in fenced blocks
//!
//! # Round-trip guarantees
//!
//! Splitting a body into sections and joining them back is the identity for
//! any input. Re-rendering an artefact whose metadata was never touched
//! reuses the original frontmatter block verbatim, so a parse/render cycle
//! reproduces the input byte-for-byte.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artefact;
mod kind;
mod metadata;
mod section;
mod taskline;
mod trace;

pub use artefact::Artefact;
pub use kind::{ArtefactId, ArtefactKind, IdError};
pub use metadata::{
    Decoded, FrontmatterError, MetaValue, Metadata, decode, decode_lossy, encode, encode_block,
};
pub use section::{Section, SectionError, Sections};
pub use taskline::{TaskLine, append_task, find_task, map_task, parse_tasks, remove_task};
pub use trace::{
    TraceBlocks, TraceError, TraceExecutor, TraceRecord, TraceStatus, extract, to_fenced_block,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
