//! Violation records produced by validation

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The rule a document broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// A metadata key the kind requires is absent
    MissingField,
    /// A metadata value is outside its allowed set
    InvalidValue,
    /// A metadata key not in a closed kind's schema
    UnknownField,
    /// A section the kind requires is absent
    MissingSection,
    /// Two task lines in one section share a description
    DuplicateTask,
}

/// One schema rule failure
///
/// A document may carry zero or more violations; any violation blocks a
/// mutating commit, while read-only inspection just surfaces the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The metadata key or section the rule applies to
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    pub(crate) fn new(field: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
