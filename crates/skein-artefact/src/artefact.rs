//! The artefact aggregate
//!
//! An [`Artefact`] is one parsed document: identifier, frontmatter, body
//! sections, and the last durably-committed bytes. Rendering reuses the
//! original frontmatter block verbatim while the metadata is untouched, so
//! a parse/render cycle reproduces the input byte-for-byte even when the
//! block is non-canonically formatted.

use crate::kind::{ArtefactId, ArtefactKind};
use crate::metadata::{self, Decoded, FrontmatterError, MetaValue, Metadata};
use crate::section::Sections;
use crate::trace::{self, TraceRecord};

/// A parsed artefact document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artefact {
    id: ArtefactId,
    metadata: Metadata,
    sections: Sections,
    /// Original frontmatter block text, kept verbatim until the metadata
    /// is edited
    raw_block: Option<String>,
    metadata_touched: bool,
    /// Bytes of the last successful durable write; `None` for an artefact
    /// that has never been committed
    committed: Option<String>,
}

impl Artefact {
    /// Parse a document from its committed bytes
    ///
    /// # Errors
    /// Returns [`FrontmatterError::Unclosed`] when the metadata block is
    /// opened but never closed
    pub fn parse(id: ArtefactId, raw: &str) -> Result<Self, FrontmatterError> {
        let Decoded {
            metadata,
            body,
            raw_block,
        } = metadata::decode(raw)?;
        Ok(Self {
            id,
            metadata,
            sections: Sections::split(&body),
            raw_block,
            metadata_touched: false,
            committed: Some(raw.to_string()),
        })
    }

    /// Fresh, never-committed artefact with the given metadata and an
    /// empty body
    #[must_use]
    pub fn new(id: ArtefactId, metadata: Metadata) -> Self {
        Self {
            id,
            metadata,
            sections: Sections::default(),
            raw_block: None,
            metadata_touched: true,
            committed: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtefactId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArtefactKind {
        self.id.kind
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    #[must_use]
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Mutable access to the body sections; does not disturb the verbatim
    /// frontmatter block
    #[inline]
    pub fn sections_mut(&mut self) -> &mut Sections {
        &mut self.sections
    }

    /// Set a frontmatter field, preserving its position when it exists
    ///
    /// Marks the metadata as touched: the next render encodes the block
    /// canonically instead of reusing the original text.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.metadata.set(key, value);
        self.metadata_touched = true;
    }

    /// Remove a frontmatter field, keeping the order of the rest
    pub fn remove_field(&mut self, key: &str) -> Option<MetaValue> {
        let removed = self.metadata.remove(key);
        if removed.is_some() {
            self.metadata_touched = true;
        }
        removed
    }

    /// Serialize the document
    ///
    /// Untouched metadata re-renders from the original block verbatim;
    /// touched metadata is encoded canonically. The body is always the
    /// join of the current sections.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = match (&self.raw_block, self.metadata_touched) {
            (Some(block), false) => block.clone(),
            _ => metadata::encode_block(&self.metadata),
        };
        out.push_str(&self.sections.join());
        out
    }

    /// Bytes of the last successful durable write, if any
    #[inline]
    #[must_use]
    pub fn committed_bytes(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    /// Whether rendering would differ from the committed bytes
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.committed.as_deref() != Some(self.render().as_str())
    }

    /// Record a successful durable write of the current rendering
    ///
    /// The rendered bytes become the new committed baseline and the
    /// frontmatter block (canonical after a metadata edit) becomes the new
    /// verbatim block.
    pub fn mark_committed(&mut self) {
        let rendered = self.render();
        if self.metadata_touched {
            let block = metadata::encode_block(&self.metadata);
            self.raw_block = (!block.is_empty()).then_some(block);
            self.metadata_touched = false;
        }
        self.committed = Some(rendered);
    }

    /// Best-effort extraction of every trace record in the document, in
    /// document order
    #[must_use]
    pub fn trace_records(&self) -> Vec<TraceRecord> {
        self.sections
            .iter()
            .flat_map(|section| trace::extract(section.text()))
            .collect()
    }
}
