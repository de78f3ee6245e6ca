//! Artefact kinds and stable identifiers
//!
//! Every artefact lives in a kind-specific subdirectory and is addressed by
//! a `(kind, slug)` pair that doubles as the lock key for mutations.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// The three artefact document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtefactKind {
    /// A unit of work with a checklist of task lines
    Task,
    /// An execution loop carrying a memory trace
    Loop,
    /// A long-running stream of related work
    Workstream,
}

impl ArtefactKind {
    /// Stable identifier used in wire payloads and error messages
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Loop => "loop",
            Self::Workstream => "workstream",
        }
    }

    /// Subdirectory this kind is persisted under
    #[inline]
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Loop => "loops",
            Self::Workstream => "workstreams",
        }
    }

    /// Heading new task lines are appended under when no explicit
    /// section is given
    #[inline]
    #[must_use]
    pub const fn task_section(&self) -> &'static str {
        match self {
            Self::Task => "Tasks",
            Self::Loop => "Plan",
            Self::Workstream => "Workstream Tasks",
        }
    }

    /// All kinds, in persisted-layout order
    #[inline]
    #[must_use]
    pub const fn all() -> [ArtefactKind; 3] {
        [Self::Task, Self::Loop, Self::Workstream]
    }
}

impl Display for ArtefactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtefactKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "loop" => Ok(Self::Loop),
            "workstream" => Ok(Self::Workstream),
            other => Err(IdError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Errors for identifier construction and validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdError {
    /// Slug is empty or contains characters unsafe for a file name
    #[error("invalid artefact slug: {slug:?}")]
    InvalidSlug { slug: String },

    /// Kind string is not one of task/loop/workstream
    #[error("unknown artefact kind: {kind:?}")]
    UnknownKind { kind: String },
}

/// Stable identifier of an artefact: kind plus file-name slug
///
/// # Invariants
/// - `slug` is non-empty, does not start with a dot, and contains only
///   `[A-Za-z0-9._-]` (enforced by [`ArtefactId::new`] and re-checked by
///   [`ArtefactId::validate`] on ids that arrived over the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtefactId {
    pub kind: ArtefactKind,
    pub slug: String,
}

impl ArtefactId {
    /// Create a validated identifier
    ///
    /// # Errors
    /// Returns [`IdError::InvalidSlug`] if the slug is empty, starts with a
    /// dot, or contains characters outside `[A-Za-z0-9._-]`
    pub fn new(kind: ArtefactKind, slug: impl Into<String>) -> Result<Self, IdError> {
        let id = Self {
            kind,
            slug: slug.into(),
        };
        id.validate()?;
        Ok(id)
    }

    /// Re-check the slug invariant
    ///
    /// Deserialized ids bypass [`ArtefactId::new`]; callers that turn an id
    /// into a path must validate first.
    ///
    /// # Errors
    /// Returns [`IdError::InvalidSlug`] on violation
    pub fn validate(&self) -> Result<(), IdError> {
        let ok = !self.slug.is_empty()
            && !self.slug.starts_with('.')
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if ok {
            Ok(())
        } else {
            Err(IdError::InvalidSlug {
                slug: self.slug.clone(),
            })
        }
    }

    /// Path of this artefact relative to the store root
    #[inline]
    #[must_use]
    pub fn rel_path(&self) -> PathBuf {
        PathBuf::from(self.kind.dir_name()).join(format!("{}.md", self.slug))
    }
}

impl Display for ArtefactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.dir_name(), self.slug)
    }
}
