//! Engine error taxonomy
//!
//! Everything the engine can refuse to do, as typed results. HTTP-facing
//! callers map these mechanically: malformed ids and frontmatter to 400,
//! `NotFound` to 404, schema/conflict variants (`Mutation`,
//! `AlreadyExists`, `Busy`) to 409, `Storage` to 500.

use skein_artefact::{ArtefactId, FrontmatterError, IdError, TraceError};
use skein_mutation::MutationError;
use skein_schema::Violation;

/// Failure of one engine request
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The target artefact does not exist
    #[error("artefact not found: {id}")]
    NotFound { id: ArtefactId },

    /// Create on an id that is already taken
    #[error("artefact already exists: {id}")]
    AlreadyExists { id: ArtefactId },

    /// The per-artefact lock could not be acquired within the bounded
    /// wait; callers decide whether to retry
    #[error("artefact busy: {id}")]
    Busy { id: ArtefactId },

    /// The id is not usable as a file name
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// The stored document's metadata block is opened but never closed
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    /// A document edit was rejected; carries schema violations when that
    /// is the reason
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A trace record could not be serialized
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Underlying read/write failure, surfaced unchanged; the engine does
    /// not retry
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

impl EngineError {
    /// Schema violations behind this error, empty for every other variant
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Mutation(err) => err.violations(),
            _ => &[],
        }
    }
}
