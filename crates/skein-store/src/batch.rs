//! Batch types and the per-operation report

use serde::{Deserialize, Serialize};
use skein_artefact::ArtefactId;
use skein_mutation::Mutation;
use skein_schema::Violation;

/// Commit state of one artefact, as driven by the coordinator
///
/// `Idle -> Locked -> Validating -> Committing -> Idle`, detouring through
/// `Aborted` when any operation of the group fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Locked,
    Validating,
    Committing,
    Aborted,
}

/// One `(artefact, operation)` entry of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: ArtefactId,
    pub mutation: Mutation,
}

impl BatchItem {
    #[must_use]
    pub fn new(id: ArtefactId, mutation: Mutation) -> Self {
        Self { id, mutation }
    }
}

/// An ordered group of operations submitted for joint application
///
/// Owned by the caller until the coordinator returns a report; the
/// coordinator retains nothing afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub items: Vec<BatchItem>,
    /// Downgrades a `remove_task` with no matching line from an error to
    /// a skipped no-op
    #[serde(default)]
    pub best_effort: bool,
}

impl Batch {
    #[must_use]
    pub fn new(items: Vec<BatchItem>) -> Self {
        Self {
            items,
            best_effort: false,
        }
    }

    /// Batch of one operation
    #[must_use]
    pub fn single(id: ArtefactId, mutation: Mutation) -> Self {
        Self::new(vec![BatchItem::new(id, mutation)])
    }

    #[must_use]
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What happened to one operation of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OpOutcome {
    /// Applied and durably committed
    Applied,
    /// Best-effort no-op (nothing matched)
    Skipped { reason: String },
    /// This operation failed; its artefact group was discarded
    Failed {
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        violations: Vec<Violation>,
    },
    /// Discarded because a sibling operation on the same artefact failed
    Discarded,
}

impl OpOutcome {
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Applied | Self::Skipped { .. })
    }
}

/// Per-operation result, in submission order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpResult {
    /// Position of the operation in the submitted batch
    pub index: usize,
    pub id: ArtefactId,
    /// Operation name, matching the wire `op` tag
    pub op: &'static str,
    pub outcome: OpOutcome,
}

/// Result of applying a whole batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// True when every operation committed (applied or skipped)
    pub success: bool,
    pub results: Vec<OpResult>,
}

impl BatchReport {
    /// The first operation that failed outright, if any
    #[must_use]
    pub fn first_failure(&self) -> Option<&OpResult> {
        self.results
            .iter()
            .find(|r| matches!(r.outcome, OpOutcome::Failed { .. }))
    }
}
