//! Mutation failure variants

use skein_schema::Violation;

/// Why a mutation did not produce a candidate document
///
/// Every variant is a typed result, never an uncaught failure; the caller
/// keeps its original artefact untouched in all cases.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MutationError {
    /// The candidate document failed validation; nothing was applied
    #[error("schema validation failed with {} violation(s)", .0.len())]
    SchemaViolations(Vec<Violation>),

    /// No task line matches the given description exactly
    #[error("task not found: {description:?}")]
    TaskNotFound { description: String },

    /// A named section the edit requires is absent
    #[error("section not found: {name:?}")]
    SectionNotFound { name: String },

    /// The operation creates or deletes a whole artefact and is resolved
    /// by the store, not by a document edit
    #[error("operation {op:?} is not a document edit")]
    NotADocumentEdit { op: &'static str },
}

impl MutationError {
    /// Violations carried by a [`MutationError::SchemaViolations`], empty
    /// otherwise
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolations(violations) => violations,
            _ => &[],
        }
    }
}
