//! Skein Schema Validator
//!
//! Checks a parsed artefact — metadata plus section set — against the rule
//! set of its kind. Rules cover required metadata keys, the allowed status
//! value set, closed-schema unknown-key rejection, required sections, and
//! uniqueness of task descriptions within a section.
//!
//! Validation is a pure function of the parsed document: no I/O,
//! deterministic, and total. Malformed input produces violations, never a
//! panic or an error. Mutating callers must refuse to commit any document
//! whose violation list is non-empty; read-only inspection just returns
//! the list.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod rules;
mod violation;

pub use rules::{KindSchema, STATUS_VALUES, schema_for, validate, validate_artefact};
pub use violation::{Rule, Violation};
