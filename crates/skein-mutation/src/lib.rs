//! Skein Mutation Operations
//!
//! The named structural edits — create/delete artefact, append to a
//! section, update a frontmatter field, create/remove task lines, flip a
//! task's status, add/remove tags, rewrite a task's text — expressed as a
//! closed [`Mutation`] enum with a serde `op` tag, plus a pure [`apply`]
//! function.
//!
//! # Policy
//!
//! `apply` computes the candidate artefact, validates it against the
//! kind's schema, and returns the candidate only when the violation list
//! is empty. On any failure the caller's artefact is untouched and no
//! write occurs.
//!
//! One deliberate asymmetry: the append family (`append_to_section`,
//! `create_task`) treats a missing target header as "create it", while
//! `remove_task` treats a missing match as an error.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod apply;
mod error;
mod op;

pub use apply::apply;
pub use error::MutationError;
pub use op::{Intent, Mutation};
