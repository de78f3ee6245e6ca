//! Task-line representation
//!
//! A task line is a checklist item of the form
//! `- [ ] description #tag (key: value, key: value)`: checked state,
//! description text, optional `#tag` tokens, and an optional trailing
//! parenthesized annotation group. The section-level helpers rewrite only
//! the lines they touch; every other byte of the section passes through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[( |x|X)\] (.*)$").unwrap());

/// One parsed checklist line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLine {
    pub checked: bool,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<(String, String)>,
}

impl TaskLine {
    /// Unchecked task with a bare description
    #[inline]
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            checked: false,
            description: description.into(),
            tags: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Parse a single line; `None` when the line is not a checklist item
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = TASK_RE.captures(line)?;
        let checked = &caps[1] != " ";
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let (rest, annotations) = split_annotations(rest);
        let (description, tags) = split_tags(rest);

        Some(Self {
            checked,
            description,
            tags,
            annotations,
        })
    }

    /// Render the canonical line form (no trailing newline)
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(if self.checked { "- [x] " } else { "- [ ] " });
        out.push_str(&self.description);
        for tag in &self.tags {
            out.push_str(" #");
            out.push_str(tag);
        }
        if !self.annotations.is_empty() {
            out.push_str(" (");
            for (i, (key, value)) in self.annotations.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
            }
            out.push(')');
        }
        out
    }

    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Drop a tag; absent tags are ignored
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Annotation value by key
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn split_annotations(rest: &str) -> (&str, Vec<(String, String)>) {
    let trimmed = rest.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(')') {
        if let Some(pos) = stripped.rfind(" (") {
            if let Some(pairs) = parse_pairs(&stripped[pos + 2..]) {
                return (&trimmed[..pos], pairs);
            }
        }
    }
    (trimmed, Vec::new())
}

fn parse_pairs(inner: &str) -> Option<Vec<(String, String)>> {
    if inner.trim().is_empty() {
        return None;
    }
    let mut pairs = Vec::new();
    for part in inner.split(", ") {
        let (key, value) = part.split_once(": ")?;
        let key = key.trim();
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return None;
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }
    Some(pairs)
}

fn split_tags(rest: &str) -> (String, Vec<String>) {
    let mut rest = rest.trim_end();
    let mut tags: Vec<String> = Vec::new();
    while let Some((head, tail)) = rest.rsplit_once(' ') {
        let Some(tag) = tail.strip_prefix('#') else {
            break;
        };
        if tag.is_empty()
            || !tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            break;
        }
        tags.push(tag.to_string());
        rest = head.trim_end();
    }
    tags.reverse();
    (rest.to_string(), tags)
}

/// All checklist lines in a section body, in document order
#[must_use]
pub fn parse_tasks(text: &str) -> Vec<TaskLine> {
    text.lines().filter_map(TaskLine::parse).collect()
}

/// First checklist line whose description matches exactly
#[must_use]
pub fn find_task(text: &str, description: &str) -> Option<TaskLine> {
    text.lines()
        .filter_map(TaskLine::parse)
        .find(|t| t.description == description)
}

/// Rewrite the first matching task line with `f`
///
/// Returns the new section text, or `None` when no line matches. All
/// non-matching lines are preserved byte-for-byte.
#[must_use]
pub fn map_task<F>(text: &str, description: &str, mut f: F) -> Option<String>
where
    F: FnMut(TaskLine) -> TaskLine,
{
    let mut out = String::with_capacity(text.len());
    let mut matched = false;
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if !matched {
            if let Some(task) = TaskLine::parse(bare) {
                if task.description == description {
                    matched = true;
                    out.push_str(&f(task).render());
                    out.push_str(&line[bare.len()..]);
                    continue;
                }
            }
        }
        out.push_str(line);
    }
    matched.then_some(out)
}

/// Delete every task line whose description matches exactly
///
/// Returns the new section text, or `None` when no line matches.
#[must_use]
pub fn remove_task(text: &str, description: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut matched = false;
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if let Some(task) = TaskLine::parse(bare) {
            if task.description == description {
                matched = true;
                continue;
            }
        }
        out.push_str(line);
    }
    matched.then_some(out)
}

/// Append a task line at the end of a section body
#[must_use]
pub fn append_task(text: &str, task: &TaskLine) -> String {
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&task.render());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_bare_task() {
        let task = TaskLine::parse("- [ ] Implement the parser").unwrap();
        assert!(!task.checked);
        assert_eq!(task.description, "Implement the parser");
        assert!(task.tags.is_empty());
        assert!(task.annotations.is_empty());
    }

    #[test]
    fn parse_checked_task() {
        assert!(TaskLine::parse("- [x] Done").unwrap().checked);
        assert!(TaskLine::parse("- [X] Done").unwrap().checked);
    }

    #[test]
    fn parse_tags_and_annotations() {
        let task =
            TaskLine::parse("- [ ] Ship it #release #urgent (added_by: planner, context: q3)")
                .unwrap();
        assert_eq!(task.description, "Ship it");
        assert_eq!(task.tags, vec!["release", "urgent"]);
        assert_eq!(task.annotation("added_by"), Some("planner"));
        assert_eq!(task.annotation("context"), Some("q3"));
    }

    #[test]
    fn parse_rejects_non_task_lines() {
        assert!(TaskLine::parse("plain prose").is_none());
        assert!(TaskLine::parse("- bullet without box").is_none());
        assert!(TaskLine::parse("  - [ ] indented is not a task").is_none());
    }

    #[test]
    fn parenthetical_prose_stays_in_description() {
        // Not a valid annotation group, so the parens belong to the text.
        let task = TaskLine::parse("- [ ] Call Ana (before lunch)").unwrap();
        assert_eq!(task.description, "Call Ana (before lunch)");
        assert!(task.annotations.is_empty());
    }

    #[test]
    fn render_parse_round_trip() {
        let mut task = TaskLine::new("Review the queue");
        task.checked = true;
        task.add_tag("ops");
        task.annotations.push(("added_by".into(), "system".into()));
        assert_eq!(TaskLine::parse(&task.render()).unwrap(), task);
    }

    #[test]
    fn add_tag_is_idempotent() {
        let mut task = TaskLine::new("x");
        task.add_tag("a");
        task.add_tag("a");
        assert_eq!(task.tags, vec!["a"]);
        task.remove_tag("missing");
        assert_eq!(task.tags, vec!["a"]);
    }

    #[test]
    fn map_task_rewrites_only_the_match() {
        let text = "prose line\n- [ ] keep me\n- [ ] flip me\ntrailer\n";
        let out = map_task(text, "flip me", |mut t| {
            t.checked = true;
            t
        })
        .unwrap();
        assert_eq!(out, "prose line\n- [ ] keep me\n- [x] flip me\ntrailer\n");
    }

    #[test]
    fn map_task_missing_returns_none() {
        assert!(map_task("- [ ] a\n", "b", |t| t).is_none());
    }

    #[test]
    fn remove_task_deletes_all_matches() {
        let text = "- [ ] dup\nmiddle\n- [x] dup\n- [ ] other\n";
        let out = remove_task(text, "dup").unwrap();
        assert_eq!(out, "middle\n- [ ] other\n");
    }

    #[test]
    fn remove_task_missing_returns_none() {
        assert!(remove_task("- [ ] a\n", "zzz").is_none());
    }

    #[test]
    fn append_task_terminates_line() {
        let out = append_task("- [ ] a", &TaskLine::new("b"));
        assert_eq!(out, "- [ ] a\n- [ ] b\n");
    }
}
