//! Per-kind rule sets and the validation pass

use crate::violation::{Rule, Violation};
use skein_artefact::{Artefact, ArtefactKind, MetaValue, Metadata, Sections, parse_tasks};

/// Allowed values of the `status` metadata field, every kind
pub const STATUS_VALUES: &[&str] = &["planning", "active", "completed", "blocked"];

/// The rule set of one artefact kind
#[derive(Debug, Clone, Copy)]
pub struct KindSchema {
    /// Metadata keys that must be present
    pub required_fields: &'static [&'static str],
    /// Metadata keys a closed schema additionally allows
    pub optional_fields: &'static [&'static str],
    /// Closed schemas reject keys outside required + optional; open
    /// schemas accept anything beyond the required set
    pub closed: bool,
    /// Section headings that must be present
    pub required_sections: &'static [&'static str],
}

const TASK_SCHEMA: KindSchema = KindSchema {
    required_fields: &["id", "name", "status", "summary"],
    optional_fields: &["owner", "tags", "workstream", "created", "updated"],
    closed: true,
    required_sections: &["Summary", "Tasks"],
};

const LOOP_SCHEMA: KindSchema = KindSchema {
    required_fields: &["id", "name", "status"],
    optional_fields: &[],
    closed: false,
    required_sections: &["Memory Trace"],
};

const WORKSTREAM_SCHEMA: KindSchema = KindSchema {
    required_fields: &["id", "name", "status", "summary", "owner"],
    optional_fields: &["tags", "created", "updated"],
    closed: true,
    required_sections: &["Overview"],
};

/// Rule set for a kind
#[inline]
#[must_use]
pub fn schema_for(kind: ArtefactKind) -> &'static KindSchema {
    match kind {
        ArtefactKind::Task => &TASK_SCHEMA,
        ArtefactKind::Loop => &LOOP_SCHEMA,
        ArtefactKind::Workstream => &WORKSTREAM_SCHEMA,
    }
}

/// Check a parsed document against the rules of its kind
///
/// Pure function of the inputs: no I/O, deterministic, and total — it
/// always returns a (possibly empty) violation list, never panics.
#[must_use]
pub fn validate(kind: ArtefactKind, metadata: &Metadata, sections: &Sections) -> Vec<Violation> {
    let schema = schema_for(kind);
    let mut violations = Vec::new();

    for field in schema.required_fields {
        if !metadata.contains_key(field) {
            violations.push(Violation::new(
                *field,
                Rule::MissingField,
                format!("required field {field:?} is missing for kind {kind}"),
            ));
        }
    }

    if let Some(status) = metadata.get("status") {
        let valid = matches!(status, MetaValue::Scalar(s) if STATUS_VALUES.contains(&s.as_str()));
        if !valid {
            violations.push(Violation::new(
                "status",
                Rule::InvalidValue,
                format!("status must be one of {}", STATUS_VALUES.join(", ")),
            ));
        }
    }

    if schema.closed {
        for key in metadata.keys() {
            if !schema.required_fields.contains(&key) && !schema.optional_fields.contains(&key) {
                violations.push(Violation::new(
                    key,
                    Rule::UnknownField,
                    format!("field {key:?} is not part of the closed {kind} schema"),
                ));
            }
        }
    }

    for section in schema.required_sections {
        if !sections.contains(section) {
            violations.push(Violation::new(
                *section,
                Rule::MissingSection,
                format!("required section {section:?} is missing for kind {kind}"),
            ));
        }
    }

    for section in sections.iter() {
        let label = section.heading().unwrap_or("(preamble)");
        let tasks = parse_tasks(section.text());
        let mut seen: Vec<&str> = Vec::new();
        for task in &tasks {
            if seen.contains(&task.description.as_str()) {
                violations.push(Violation::new(
                    label,
                    Rule::DuplicateTask,
                    format!(
                        "duplicate task description {:?} in section {label:?}",
                        task.description
                    ),
                ));
            } else {
                seen.push(&task.description);
            }
        }
    }

    violations
}

/// Validate a whole artefact against its own kind
#[inline]
#[must_use]
pub fn validate_artefact(artefact: &Artefact) -> Vec<Violation> {
    validate(artefact.kind(), artefact.metadata(), artefact.sections())
}
