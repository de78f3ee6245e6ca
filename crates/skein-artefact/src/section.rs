//! Section model
//!
//! Splits a document body at second-level (`## `) headings into an ordered
//! sequence of sections. Content before the first heading becomes an
//! implicit unnamed section. Every byte of the input lands in exactly one
//! section, so `join(split(b)) == b` for any body.

use serde::Serialize;

/// One heading-delimited region of a document body
///
/// The raw heading line (newline included) is kept verbatim so joining
/// reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    heading: Option<String>,
    heading_line: String,
    text: String,
}

impl Section {
    /// Heading label, `None` for the implicit preamble section
    #[inline]
    #[must_use]
    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    /// Raw body text of this section (everything after the heading line,
    /// up to the next heading)
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn ensure_trailing_newline(&mut self) {
        if self.text.is_empty() {
            if !self.heading_line.is_empty() && !self.heading_line.ends_with('\n') {
                self.heading_line.push('\n');
            }
        } else if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }
}

/// Section lookup and edit failures
#[derive(Debug, Clone, thiserror::Error, Serialize)]
pub enum SectionError {
    /// No section with the requested heading (match is exact and
    /// case-sensitive)
    #[error("section not found: {name:?}")]
    NotFound { name: String },

    /// A section with this heading already exists
    #[error("section already exists: {name:?}")]
    Duplicate { name: String },
}

/// Ordered sequence of sections forming a document body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    sections: Vec<Section>,
}

fn heading_label(line: &str) -> Option<&str> {
    line.strip_prefix("## ").map(str::trim)
}

impl Sections {
    /// Split a body at its second-level headings
    #[must_use]
    pub fn split(body: &str) -> Self {
        let mut sections: Vec<Section> = Vec::new();
        let mut preamble = String::new();
        let mut current: Option<Section> = None;

        for line in body.split_inclusive('\n') {
            if let Some(label) = heading_label(line.trim_end_matches(['\n', '\r'])) {
                if let Some(section) = current.take() {
                    sections.push(section);
                } else if !preamble.is_empty() {
                    sections.push(Section {
                        heading: None,
                        heading_line: String::new(),
                        text: std::mem::take(&mut preamble),
                    });
                }
                current = Some(Section {
                    heading: Some(label.to_string()),
                    heading_line: line.to_string(),
                    text: String::new(),
                });
            } else if let Some(section) = current.as_mut() {
                section.text.push_str(line);
            } else {
                preamble.push_str(line);
            }
        }

        if let Some(section) = current {
            sections.push(section);
        } else if !preamble.is_empty() {
            sections.push(Section {
                heading: None,
                heading_line: String::new(),
                text: preamble,
            });
        }

        Self { sections }
    }

    /// Reassemble the body; identity with [`Sections::split`]
    #[must_use]
    pub fn join(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&section.heading_line);
            out.push_str(&section.text);
        }
        out
    }

    /// Sections in document order
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Number of sections, the implicit preamble included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// First section with the given heading; exact, case-sensitive match
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.heading.as_deref() == Some(name))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.heading.as_deref() == Some(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.heading.as_deref() == Some(name))
    }

    /// Replace a section's body text, leaving its heading line untouched
    ///
    /// # Errors
    /// Returns [`SectionError::NotFound`] when no heading matches
    pub fn replace(&mut self, name: &str, text: impl Into<String>) -> Result<(), SectionError> {
        match self.find_mut(name) {
            Some(section) => {
                section.text = text.into();
                Ok(())
            }
            None => Err(SectionError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Append text to a section, creating the section at the end of the
    /// document when absent
    ///
    /// Existing text is never overwritten; a newline is inserted between
    /// the old text and the appended text when needed. A newly created
    /// section contains exactly the appended text.
    pub fn append(&mut self, name: &str, text: &str) {
        if let Some(section) = self.find_mut(name) {
            if !section.text.is_empty() && !section.text.ends_with('\n') {
                section.text.push('\n');
            }
            section.text.push_str(text);
        } else {
            self.push_named(name, text);
        }
    }

    /// Insert a new section immediately after an existing one
    ///
    /// # Errors
    /// - [`SectionError::NotFound`] when `after` does not exist
    /// - [`SectionError::Duplicate`] when `heading` already exists
    pub fn insert_after(
        &mut self,
        after: &str,
        heading: &str,
        text: &str,
    ) -> Result<(), SectionError> {
        if self.contains(heading) {
            return Err(SectionError::Duplicate {
                name: heading.to_string(),
            });
        }
        let index = self.position(after).ok_or_else(|| SectionError::NotFound {
            name: after.to_string(),
        })?;

        self.sections[index].ensure_trailing_newline();
        let mut section = Section {
            heading: Some(heading.to_string()),
            heading_line: format!("## {heading}\n"),
            text: text.to_string(),
        };
        if index + 1 < self.sections.len() {
            section.ensure_trailing_newline();
        }
        self.sections.insert(index + 1, section);
        Ok(())
    }

    fn push_named(&mut self, name: &str, text: &str) {
        if let Some(last) = self.sections.last_mut() {
            last.ensure_trailing_newline();
        }
        self.sections.push(Section {
            heading: Some(name.to_string()),
            heading_line: format!("## {name}\n"),
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: &str = "intro line\n\n## Summary\nA summary.\n\n## Tasks\n- [ ] one\n- [x] two\n";

    #[test]
    fn split_finds_preamble_and_headings() {
        let sections = Sections::split(BODY);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections.iter().next().unwrap().heading(), None);
        assert!(sections.contains("Summary"));
        assert!(sections.contains("Tasks"));
    }

    #[test]
    fn split_join_identity() {
        for body in [
            BODY,
            "",
            "no headings at all",
            "## Only\n",
            "## Only",
            "pre\n## A\ntext\n## B",
            "## A\n### sub is body text\n#### deeper\n",
            "trailing no newline\n## X\nlast line",
        ] {
            assert_eq!(Sections::split(body).join(), body, "body: {body:?}");
        }
    }

    #[test]
    fn third_level_headings_stay_in_body() {
        let sections = Sections::split("## A\n### Nested\ncontent\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("A").unwrap().text(), "### Nested\ncontent\n");
    }

    #[test]
    fn get_is_exact_and_case_sensitive() {
        let sections = Sections::split("## Memory Trace\nx\n");
        assert!(sections.get("Memory Trace").is_some());
        assert!(sections.get("memory trace").is_none());
        assert!(sections.get("Memory").is_none());
    }

    #[test]
    fn replace_swaps_body_only() {
        let mut sections = Sections::split("## A\nold\n## B\nkeep\n");
        sections.replace("A", "new\n").unwrap();
        assert_eq!(sections.join(), "## A\nnew\n## B\nkeep\n");
    }

    #[test]
    fn replace_missing_fails() {
        let mut sections = Sections::split("## A\n");
        assert!(matches!(
            sections.replace("Z", ""),
            Err(SectionError::NotFound { .. })
        ));
    }

    #[test]
    fn append_to_existing_separates_with_newline() {
        let mut sections = Sections::split("## Log\nfirst");
        sections.append("Log", "second\n");
        assert_eq!(sections.get("Log").unwrap().text(), "first\nsecond\n");
    }

    #[test]
    fn append_creates_section_at_end_with_exact_text() {
        let mut sections = Sections::split("intro\n## A\ncontent");
        sections.append("Memory Trace", "the appended text\n");
        assert_eq!(
            sections.get("Memory Trace").unwrap().text(),
            "the appended text\n"
        );
        assert_eq!(
            sections.join(),
            "intro\n## A\ncontent\n## Memory Trace\nthe appended text\n"
        );
    }

    #[test]
    fn append_on_empty_body_creates_first_section() {
        let mut sections = Sections::split("");
        sections.append("Notes", "hello\n");
        assert_eq!(sections.join(), "## Notes\nhello\n");
    }

    #[test]
    fn insert_after_places_between_sections() {
        let mut sections = Sections::split("## A\na\n## C\nc\n");
        sections.insert_after("A", "B", "b\n").unwrap();
        assert_eq!(sections.join(), "## A\na\n## B\nb\n## C\nc\n");
    }

    #[test]
    fn insert_after_rejects_duplicate_heading() {
        let mut sections = Sections::split("## A\n## B\n");
        assert!(matches!(
            sections.insert_after("A", "B", ""),
            Err(SectionError::Duplicate { .. })
        ));
    }

    #[test]
    fn insert_after_missing_anchor_fails() {
        let mut sections = Sections::split("## A\n");
        assert!(matches!(
            sections.insert_after("Z", "B", ""),
            Err(SectionError::NotFound { .. })
        ));
    }
}
