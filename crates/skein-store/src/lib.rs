//! Skein Store
//!
//! Durable storage and coordination for artefact mutations: the
//! [`ArtefactStore`] collaborator trait with its filesystem
//! implementation, the per-artefact lock table, the batch coordinator,
//! and the [`Engine`] facade that HTTP handlers and background jobs call.
//!
//! # Guarantees
//!
//! - At most one in-flight commit per artefact id; a second writer blocks
//!   up to the configured timeout, then fails with `Busy`
//! - A durable write is a single atomic replace: readers see the prior or
//!   the new full document, never a partial one
//! - A batch's operations on one artefact apply all-or-nothing; artefacts
//!   are independent of each other within a batch
//! - Reads never take the lock and observe only committed bytes

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod batch;
mod engine;
mod error;
mod lock;
mod store;

pub use batch::{Batch, BatchItem, BatchReport, OpOutcome, OpResult, Phase};
pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use store::{ArtefactStore, FsStore};
