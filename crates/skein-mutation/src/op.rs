//! The closed set of mutation operations
//!
//! Dynamic call sites at the HTTP boundary collapse into one serde-tagged
//! enum: a request body names its operation in the `op` field and the
//! matching variant carries the arguments. No open-ended dispatch.

use serde::{Deserialize, Serialize};
use skein_artefact::{MetaValue, Metadata};

/// One structural edit to an artefact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Create a new artefact with the given frontmatter; fails when the
    /// id is already taken
    CreateArtefact { metadata: Metadata },

    /// Delete the target artefact; deleting a missing artefact is a no-op
    /// success
    DeleteArtefact,

    /// Set one frontmatter field; closed-schema kinds reject unknown
    /// fields through validation
    UpdateFrontmatter { field: String, value: MetaValue },

    /// Append text to a section, creating the section at document end
    /// when absent; existing text is never overwritten
    AppendToSection { section: String, text: String },

    /// Append a task line under a header, creating the header when
    /// absent; defaults to the kind's designated task section
    CreateTask {
        description: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        annotations: Vec<(String, String)>,
        #[serde(default)]
        section: Option<String>,
    },

    /// Delete every task line matching the description exactly; fails
    /// with a not-found error when nothing matches
    RemoveTask { description: String },

    /// Check or uncheck the first task line matching the description
    UpdateTaskStatus { description: String, done: bool },

    /// Add a tag to the first matching task line; present tags are kept
    /// once
    AddTag { description: String, tag: String },

    /// Remove a tag from the first matching task line
    RemoveTag { description: String, tag: String },

    /// Rewrite the description of the first matching task line
    UpdateTaskContent {
        description: String,
        new_description: String,
    },
}

/// Side-effect intent of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Create,
    Append,
    Replace,
    Delete,
}

impl Mutation {
    /// Stable operation name, matching the serde `op` tag
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateArtefact { .. } => "create_artefact",
            Self::DeleteArtefact => "delete_artefact",
            Self::UpdateFrontmatter { .. } => "update_frontmatter",
            Self::AppendToSection { .. } => "append_to_section",
            Self::CreateTask { .. } => "create_task",
            Self::RemoveTask { .. } => "remove_task",
            Self::UpdateTaskStatus { .. } => "update_task_status",
            Self::AddTag { .. } => "add_tag",
            Self::RemoveTag { .. } => "remove_tag",
            Self::UpdateTaskContent { .. } => "update_task_content",
        }
    }

    /// What the operation does to the document
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::CreateArtefact { .. } => Intent::Create,
            Self::DeleteArtefact | Self::RemoveTask { .. } => Intent::Delete,
            Self::AppendToSection { .. } | Self::CreateTask { .. } => Intent::Append,
            Self::UpdateFrontmatter { .. }
            | Self::UpdateTaskStatus { .. }
            | Self::AddTag { .. }
            | Self::RemoveTag { .. }
            | Self::UpdateTaskContent { .. } => Intent::Replace,
        }
    }

    /// Whether the store resolves this operation (artefact lifecycle)
    /// rather than a document edit
    #[inline]
    #[must_use]
    pub const fn is_store_level(&self) -> bool {
        matches!(self, Self::CreateArtefact { .. } | Self::DeleteArtefact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_shape_is_tagged_by_op() {
        let mutation = Mutation::UpdateTaskStatus {
            description: "Ship it".to_string(),
            done: true,
        };
        let json = serde_json::to_string(&mutation).unwrap();
        assert_eq!(
            json,
            r#"{"op":"update_task_status","description":"Ship it","done":true}"#
        );
        let back: Mutation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mutation);
    }

    #[test]
    fn optional_arguments_default_on_decode() {
        let mutation: Mutation =
            serde_json::from_str(r#"{"op":"create_task","description":"New step"}"#).unwrap();
        assert_eq!(
            mutation,
            Mutation::CreateTask {
                description: "New step".to_string(),
                tags: vec![],
                annotations: vec![],
                section: None,
            }
        );
    }

    #[test]
    fn names_match_wire_tags() {
        let mutation: Mutation = serde_json::from_str(r#"{"op":"delete_artefact"}"#).unwrap();
        assert_eq!(mutation.name(), "delete_artefact");
        assert_eq!(mutation.intent(), Intent::Delete);
        assert!(mutation.is_store_level());
    }
}
