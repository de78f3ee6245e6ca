//! Engine facade and batch coordinator
//!
//! The engine owns the lock table and the store, and gives callers the
//! read surface (`load`, `list`, `inspect`, `traces`) plus the mutating
//! surface (`create`, `delete`, `apply`, `apply_batch`). It is fully
//! synchronous: callers arrive from independent request contexts and the
//! engine spawns nothing of its own.
//!
//! # Commit discipline
//!
//! Operations of a batch are grouped per artefact in submission order.
//! Each group folds over an in-memory copy under the artefact's lock and
//! is written once, after every operation validated. Any failure discards
//! the whole group (durable bytes unchanged); other artefacts in the same
//! batch are unaffected. Reads never take the lock and always observe the
//! last durably-committed bytes.

use crate::batch::{Batch, BatchReport, OpOutcome, OpResult, Phase};
use crate::error::EngineError;
use crate::lock::LockTable;
use crate::store::{ArtefactStore, FsStore};
use dashmap::DashMap;
use skein_artefact::{
    Artefact, ArtefactId, ArtefactKind, Metadata, TraceRecord, to_fenced_block,
};
use skein_mutation::{Mutation, MutationError};
use skein_schema::{Violation, schema_for, validate_artefact};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Section trace records are appended to
const TRACE_SECTION: &str = "Memory Trace";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Store root directory
    pub root: PathBuf,
    /// Bounded wait for the per-artefact lock before failing `Busy`
    pub lock_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("artefacts"),
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// The document mutation engine
#[derive(Debug)]
pub struct Engine<S: ArtefactStore = FsStore> {
    store: S,
    locks: LockTable,
    phases: DashMap<ArtefactId, Phase>,
    lock_timeout: Duration,
}

impl Engine<FsStore> {
    /// Engine over a filesystem store
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(FsStore::new(config.root.clone()), config.lock_timeout)
    }
}

impl<S: ArtefactStore> Engine<S> {
    /// Engine over any store collaborator
    #[must_use]
    pub fn with_store(store: S, lock_timeout: Duration) -> Self {
        Self {
            store,
            locks: LockTable::new(),
            phases: DashMap::new(),
            lock_timeout,
        }
    }

    /// The underlying store collaborator
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- read surface ------------------------------------------------

    /// Load the last durably-committed state of an artefact
    ///
    /// # Errors
    /// `NotFound` when the artefact does not exist; parse and storage
    /// failures otherwise
    pub fn load(&self, id: &ArtefactId) -> Result<Artefact, EngineError> {
        id.validate()?;
        let path = id.rel_path();
        if !self.store.exists(&path) {
            return Err(EngineError::NotFound { id: id.clone() });
        }
        let raw = self.store.read(&path)?;
        Ok(Artefact::parse(id.clone(), &raw)?)
    }

    /// Whether an artefact exists durably
    #[must_use]
    pub fn exists(&self, id: &ArtefactId) -> bool {
        id.validate().is_ok() && self.store.exists(&id.rel_path())
    }

    /// Ids of every artefact of a kind, sorted by slug
    ///
    /// # Errors
    /// Storage failures only; a missing kind directory lists as empty
    pub fn list(&self, kind: ArtefactKind) -> Result<Vec<ArtefactId>, EngineError> {
        let mut ids = Vec::new();
        for path in self.store.list(Path::new(kind.dir_name()))? {
            if path.extension().and_then(OsStr::to_str) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if let Ok(id) = ArtefactId::new(kind, stem) {
                ids.push(id);
            }
        }
        ids.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(ids)
    }

    /// Read-only schema inspection; violations do not block reads
    ///
    /// # Errors
    /// Load failures only
    pub fn inspect(&self, id: &ArtefactId) -> Result<Vec<Violation>, EngineError> {
        Ok(validate_artefact(&self.load(id)?))
    }

    /// Best-effort extraction of every trace record in the document
    ///
    /// # Errors
    /// Load failures only; malformed records are skipped, not fatal
    pub fn traces(&self, id: &ArtefactId) -> Result<Vec<TraceRecord>, EngineError> {
        Ok(self.load(id)?.trace_records())
    }

    /// Current commit phase of an artefact (`Idle` when never touched)
    #[must_use]
    pub fn phase(&self, id: &ArtefactId) -> Phase {
        self.phases.get(id).map_or(Phase::Idle, |p| *p)
    }

    // ---- mutating surface --------------------------------------------

    /// Create an artefact, scaffolding the kind's required sections
    ///
    /// # Errors
    /// `AlreadyExists` when the id is taken; schema violations when the
    /// initial metadata is incomplete
    pub fn create(
        &self,
        kind: ArtefactKind,
        slug: &str,
        metadata: Metadata,
    ) -> Result<ArtefactId, EngineError> {
        let id = ArtefactId::new(kind, slug)?;
        self.apply(&id, Mutation::CreateArtefact { metadata })?;
        Ok(id)
    }

    /// Delete an artefact; deleting a missing one is a no-op success
    ///
    /// # Errors
    /// `Busy` or storage failures only
    pub fn delete(&self, id: &ArtefactId) -> Result<(), EngineError> {
        self.apply(id, Mutation::DeleteArtefact)
    }

    /// Apply a single operation under the full commit discipline
    ///
    /// # Errors
    /// Any [`EngineError`]; on error the durable bytes are unchanged
    pub fn apply(&self, id: &ArtefactId, mutation: Mutation) -> Result<(), EngineError> {
        let ops = [(0usize, mutation)];
        match self.commit_group(id, &ops, false).failure {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    /// Append a trace record to the artefact's `Memory Trace` section,
    /// creating the section when absent
    ///
    /// # Errors
    /// Serialization failures, plus anything [`Engine::apply`] returns
    pub fn append_trace(&self, id: &ArtefactId, record: &TraceRecord) -> Result<(), EngineError> {
        let block = to_fenced_block(record)?;
        self.apply(
            id,
            Mutation::AppendToSection {
                section: TRACE_SECTION.to_string(),
                text: block,
            },
        )
    }

    /// Apply a batch: all-or-nothing per artefact, in submission order
    #[must_use]
    pub fn apply_batch(&self, batch: &Batch) -> BatchReport {
        let mut groups: Vec<(ArtefactId, Vec<(usize, Mutation)>)> = Vec::new();
        for (index, item) in batch.items.iter().enumerate() {
            match groups.iter_mut().find(|(id, _)| *id == item.id) {
                Some((_, ops)) => ops.push((index, item.mutation.clone())),
                None => groups.push((item.id.clone(), vec![(index, item.mutation.clone())])),
            }
        }

        let mut results: Vec<OpResult> = Vec::with_capacity(batch.items.len());
        for (id, ops) in groups {
            let group = self.commit_group(&id, &ops, batch.best_effort);
            for (index, op) in &ops {
                let outcome = match &group.failure {
                    None => match group.skipped.iter().find(|(i, _)| i == index) {
                        Some((_, reason)) => OpOutcome::Skipped {
                            reason: reason.clone(),
                        },
                        None => OpOutcome::Applied,
                    },
                    Some((failed_index, err)) if failed_index == index => OpOutcome::Failed {
                        message: err.to_string(),
                        violations: err.violations().to_vec(),
                    },
                    Some(_) => OpOutcome::Discarded,
                };
                results.push(OpResult {
                    index: *index,
                    id: id.clone(),
                    op: op.name(),
                    outcome,
                });
            }
        }

        results.sort_by_key(|r| r.index);
        let success = results.iter().all(|r| r.outcome.is_committed());
        BatchReport { success, results }
    }

    // ---- coordinator internals ---------------------------------------

    fn set_phase(&self, id: &ArtefactId, phase: Phase) {
        tracing::debug!(artefact = %id, ?phase, "commit phase");
        self.phases.insert(id.clone(), phase);
    }

    /// Apply one artefact's operations under its lock, writing at most
    /// once
    fn commit_group(
        &self,
        id: &ArtefactId,
        ops: &[(usize, Mutation)],
        best_effort: bool,
    ) -> GroupResult {
        let first_index = ops.first().map_or(0, |(i, _)| *i);
        if let Err(err) = id.validate() {
            return GroupResult::failed(first_index, err.into());
        }

        let Some(_guard) = self.locks.acquire(id, self.lock_timeout) else {
            tracing::warn!(artefact = %id, "lock wait exceeded");
            return GroupResult::failed(first_index, EngineError::Busy { id: id.clone() });
        };
        self.set_phase(id, Phase::Locked);

        let result = self.run_group(id, ops, best_effort);
        if let Some((index, err)) = &result.failure {
            tracing::warn!(
                artefact = %id,
                index = *index,
                error = %err,
                "group aborted, durable bytes unchanged"
            );
            self.set_phase(id, Phase::Aborted);
        }
        self.set_phase(id, Phase::Idle);
        result
    }

    fn run_group(
        &self,
        id: &ArtefactId,
        ops: &[(usize, Mutation)],
        best_effort: bool,
    ) -> GroupResult {
        let first_index = ops.first().map_or(0, |(i, _)| *i);
        let path = id.rel_path();

        let original_exists = self.store.exists(&path);
        let mut current: Option<Artefact> = None;
        if original_exists {
            let raw = match self.store.read(&path) {
                Ok(raw) => raw,
                Err(err) => return GroupResult::failed(first_index, err.into()),
            };
            match Artefact::parse(id.clone(), &raw) {
                Ok(artefact) => current = Some(artefact),
                Err(err) => return GroupResult::failed(first_index, err.into()),
            }
        }

        self.set_phase(id, Phase::Validating);
        let mut result = GroupResult::default();
        for (index, op) in ops {
            match op {
                Mutation::CreateArtefact { metadata } => {
                    if current.is_some() {
                        return result.fail(*index, EngineError::AlreadyExists { id: id.clone() });
                    }
                    match scaffold(id, metadata.clone()) {
                        Ok(artefact) => current = Some(artefact),
                        Err(err) => return result.fail(*index, err),
                    }
                }
                Mutation::DeleteArtefact => current = None,
                _ => {
                    let Some(artefact) = current.as_ref() else {
                        return result.fail(*index, EngineError::NotFound { id: id.clone() });
                    };
                    match skein_mutation::apply(artefact, op) {
                        Ok(next) => current = Some(next),
                        Err(MutationError::TaskNotFound { description }) if best_effort => {
                            result
                                .skipped
                                .push((*index, format!("no task line matching {description:?}")));
                        }
                        Err(err) => return result.fail(*index, err.into()),
                    }
                }
            }
        }

        self.set_phase(id, Phase::Committing);
        let commit = match (&current, original_exists) {
            (Some(artefact), _) => {
                let rendered = artefact.render();
                if artefact.committed_bytes() == Some(rendered.as_str()) {
                    Ok(())
                } else {
                    self.store.write(&path, &rendered).map(|()| {
                        tracing::info!(
                            artefact = %id,
                            checksum = %blake3::hash(rendered.as_bytes()),
                            bytes = rendered.len(),
                            "artefact committed"
                        );
                    })
                }
            }
            (None, true) => self.store.remove(&path).map(|()| {
                tracing::info!(artefact = %id, "artefact removed");
            }),
            (None, false) => Ok(()),
        };
        if let Err(err) = commit {
            let last_index = ops.last().map_or(first_index, |(i, _)| *i);
            return result.fail(last_index, err.into());
        }
        result
    }
}

/// Fresh artefact for a create operation: caller metadata plus empty
/// stubs of the kind's required sections
fn scaffold(id: &ArtefactId, metadata: Metadata) -> Result<Artefact, EngineError> {
    let mut artefact = Artefact::new(id.clone(), metadata);
    for section in schema_for(id.kind).required_sections {
        artefact.sections_mut().append(section, "");
    }
    let violations = validate_artefact(&artefact);
    if violations.is_empty() {
        Ok(artefact)
    } else {
        Err(MutationError::SchemaViolations(violations).into())
    }
}

#[derive(Debug, Default)]
struct GroupResult {
    /// Best-effort skips: `(batch index, reason)`
    skipped: Vec<(usize, String)>,
    /// The failing operation, when the group was discarded
    failure: Option<(usize, EngineError)>,
}

impl GroupResult {
    fn failed(index: usize, err: EngineError) -> Self {
        Self {
            skipped: Vec::new(),
            failure: Some((index, err)),
        }
    }

    fn fail(mut self, index: usize, err: EngineError) -> Self {
        self.failure = Some((index, err));
        self
    }
}
