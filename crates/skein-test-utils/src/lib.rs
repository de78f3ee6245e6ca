//! Skein Test Utilities
//!
//! Canonical sample documents, metadata builders, and store doubles
//! shared by the test suites of the other crates.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod fixtures;
mod store;

pub use fixtures::{
    DocBuilder, LOOP_DOC, TASK_DOC, WORKSTREAM_DOC, loop_metadata, sample_artefact,
    task_metadata, workstream_metadata,
};
pub use store::{BrokenStore, MemStore, SlowStore};
