//! Canonical sample documents and builders

use skein_artefact::{Artefact, ArtefactId, ArtefactKind, MetaValue, Metadata};

/// A schema-valid task document
pub const TASK_DOC: &str = "---\nid: migrate-db\nname: Migrate the database\nstatus: active\nsummary: Move user data to the new cluster\n---\n\n## Summary\nMove user data to the new cluster with zero downtime.\n\n## Tasks\n- [ ] Snapshot the primary\n- [x] Provision replicas (added_by: planner)\n";

/// A schema-valid loop document with one embedded trace record
pub const LOOP_DOC: &str = "---\nid: nightly-sync\nname: Nightly sync\nstatus: active\n---\n\n## Memory Trace\n```memory-trace\n{\"description\": \"synced 42 records\", \"timestamp\": \"2026-08-04T02:00:00Z\", \"status\": \"completed\", \"executor\": \"system\"}\n```\n";

/// A schema-valid workstream document
pub const WORKSTREAM_DOC: &str = "---\nid: platform\nname: Platform hardening\nstatus: planning\nsummary: Reliability work for Q3\nowner: ana\n---\n\n## Overview\nReliability work for Q3.\n\n## Workstream Tasks\n- [ ] Define SLOs\n";

/// Minimal valid metadata for a task artefact
#[must_use]
pub fn task_metadata(slug: &str) -> Metadata {
    let mut m = Metadata::new();
    m.set("id", slug);
    m.set("name", format!("Task {slug}"));
    m.set("status", "planning");
    m.set("summary", format!("Summary of {slug}"));
    m
}

/// Minimal valid metadata for a loop artefact
#[must_use]
pub fn loop_metadata(slug: &str) -> Metadata {
    let mut m = Metadata::new();
    m.set("id", slug);
    m.set("name", format!("Loop {slug}"));
    m.set("status", "active");
    m
}

/// Minimal valid metadata for a workstream artefact
#[must_use]
pub fn workstream_metadata(slug: &str) -> Metadata {
    let mut m = Metadata::new();
    m.set("id", slug);
    m.set("name", format!("Workstream {slug}"));
    m.set("status", "planning");
    m.set("summary", format!("Summary of {slug}"));
    m.set("owner", "ana");
    m
}

/// Parse one of the canonical documents into an artefact
///
/// # Panics
/// On an invalid slug or document; fixtures are expected to be valid
#[must_use]
pub fn sample_artefact(kind: ArtefactKind, slug: &str) -> Artefact {
    let doc = match kind {
        ArtefactKind::Task => TASK_DOC,
        ArtefactKind::Loop => LOOP_DOC,
        ArtefactKind::Workstream => WORKSTREAM_DOC,
    };
    let id = ArtefactId::new(kind, slug).unwrap();
    Artefact::parse(id, doc).unwrap()
}

/// Assembles a document string from metadata entries and sections
#[derive(Debug, Default)]
pub struct DocBuilder {
    metadata: Vec<(String, MetaValue)>,
    sections: Vec<(String, String)>,
}

impl DocBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn section(mut self, heading: &str, text: &str) -> Self {
        self.sections.push((heading.to_string(), text.to_string()));
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        let metadata: Metadata = self.metadata.into_iter().collect();
        let mut body = String::new();
        for (heading, text) in &self.sections {
            body.push_str("## ");
            body.push_str(heading);
            body.push('\n');
            body.push_str(text);
            if !text.is_empty() && !text.ends_with('\n') {
                body.push('\n');
            }
        }
        skein_artefact::encode(&metadata, &body)
    }
}
