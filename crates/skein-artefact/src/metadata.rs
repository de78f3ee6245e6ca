//! Frontmatter codec
//!
//! Decodes and re-encodes the leading `---` metadata block. The codec is
//! line-oriented rather than a full YAML round-trip: key order is preserved,
//! the original block text is retained verbatim for untouched documents, and
//! `encode(decode(d)) == d` holds for any document whose block is in
//! canonical form (trimmed non-empty scalars, two-space list items).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const DELIMITER: &str = "---";

/// A single frontmatter value
///
/// Scalars are stored as raw trimmed text; interpretation (dates, numbers)
/// is the consumer's concern. Canonical form requires scalars to be
/// non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Scalar text, if this value is a scalar
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// List items, if this value is a list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Ordered frontmatter mapping
///
/// # Invariants
/// - Keys are unique
/// - Iteration order is insertion order; updating an existing key keeps its
///   position, so unrelated keys are never reordered by an edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: IndexMap<String, MetaValue>,
}

impl Metadata {
    /// Empty metadata
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Scalar value for a key, if present and scalar
    #[inline]
    #[must_use]
    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(MetaValue::as_scalar)
    }

    /// Insert or update a key, preserving its position when it exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.entries.shift_remove(key)
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, MetaValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Frontmatter decoding errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FrontmatterError {
    /// The opening `---` was found but the closing one never appeared.
    /// This is the only hard failure; every other malformed line degrades
    /// to best-effort parsing.
    #[error("frontmatter block opened but never closed")]
    Unclosed,
}

/// Result of decoding a raw document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Parsed metadata (empty when the document has no block)
    pub metadata: Metadata,
    /// Everything after the closing delimiter, verbatim
    pub body: String,
    /// The original block text including both delimiters, verbatim.
    /// `None` when the document has no block. Retained so untouched
    /// metadata re-renders byte-identically.
    pub raw_block: Option<String>,
}

/// Decode a raw document into metadata, body, and the verbatim block
///
/// A document that does not open with `---` has no metadata: the whole
/// input becomes the body. Inside an opened block, lines that fail to
/// parse (no colon, blank, `#` comments) are skipped with a debug
/// diagnostic rather than failing the decode.
///
/// # Errors
/// Returns [`FrontmatterError::Unclosed`] when the block is opened but the
/// closing `---` line never appears
pub fn decode(raw: &str) -> Result<Decoded, FrontmatterError> {
    let after_open = match raw.strip_prefix("---\n") {
        Some(rest) => rest,
        None => {
            if raw == DELIMITER || raw == "---\r\n" || raw.starts_with("---\r\n") {
                // Treat a CRLF opener the same as LF; a bare `---` with no
                // closing line is an unclosed block.
                match raw.strip_prefix("---\r\n") {
                    Some(rest) => rest,
                    None => return Err(FrontmatterError::Unclosed),
                }
            } else {
                return Ok(Decoded {
                    metadata: Metadata::new(),
                    body: raw.to_string(),
                    raw_block: None,
                });
            }
        }
    };

    let mut inner_end = None;
    let mut offset = 0usize;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            inner_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((inner_len, block_inner_end)) = inner_end else {
        return Err(FrontmatterError::Unclosed);
    };

    let open_len = raw.len() - after_open.len();
    let inner = &after_open[..inner_len];
    let raw_block = raw[..open_len + block_inner_end].to_string();
    let body = after_open[block_inner_end..].to_string();

    Ok(Decoded {
        metadata: parse_entries(inner),
        body,
        raw_block: Some(raw_block),
    })
}

/// Lenient decode for read-only callers
///
/// An unclosed block degrades to empty metadata with the whole input as
/// the body, instead of failing.
#[must_use]
pub fn decode_lossy(raw: &str) -> Decoded {
    decode(raw).unwrap_or_else(|_| Decoded {
        metadata: Metadata::new(),
        body: raw.to_string(),
        raw_block: None,
    })
}

fn parse_entries(inner: &str) -> Metadata {
    let mut metadata = Metadata::new();
    let mut pending: Option<(String, Vec<String>)> = None;

    for line in inner.lines() {
        let stripped = line.trim_end();
        let lead_trimmed = stripped.trim_start();

        if let Some((_, items)) = pending.as_mut() {
            if let Some(item) = lead_trimmed.strip_prefix("- ") {
                items.push(item.trim().to_string());
                continue;
            }
            let (key, items) = pending.take().unwrap_or_default();
            metadata.set(key, MetaValue::List(items));
        }

        if stripped.is_empty() || lead_trimmed.starts_with('#') {
            continue;
        }

        match stripped.split_once(':') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    tracing::debug!(line = %stripped, "skipping frontmatter line with empty key");
                    continue;
                }
                let value = value.trim();
                if value.is_empty() {
                    pending = Some((key.to_string(), Vec::new()));
                } else {
                    metadata.set(key, MetaValue::Scalar(value.to_string()));
                }
            }
            None => {
                tracing::debug!(line = %stripped, "skipping unparseable frontmatter line");
            }
        }
    }

    if let Some((key, items)) = pending {
        metadata.set(key, MetaValue::List(items));
    }
    metadata
}

/// Canonical encoding of a metadata block, delimiters included
///
/// Empty metadata encodes to the empty string (no block at all).
#[must_use]
pub fn encode_block(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }
    let mut out = String::from("---\n");
    for (key, value) in metadata.iter() {
        match value {
            MetaValue::Scalar(s) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(s);
                out.push('\n');
            }
            MetaValue::List(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
        }
    }
    out.push_str("---\n");
    out
}

/// Canonical encoding of a full document
///
/// Left inverse of [`decode`] for canonical-form documents.
#[must_use]
pub fn encode(metadata: &Metadata, body: &str) -> String {
    let mut out = encode_block(metadata);
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_without_block() {
        let doc = "# Title\n\nBody text.\n";
        let decoded = decode(doc).unwrap();
        assert!(decoded.metadata.is_empty());
        assert_eq!(decoded.body, doc);
        assert_eq!(decoded.raw_block, None);
    }

    #[test]
    fn decode_scalars_and_lists() {
        let doc = "---\nid: t-1\nname: Migrate DB\ntags:\n  - infra\n  - q3\n---\nBody.\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(decoded.metadata.get_scalar("id"), Some("t-1"));
        assert_eq!(decoded.metadata.get_scalar("name"), Some("Migrate DB"));
        assert_eq!(
            decoded.metadata.get("tags").unwrap().as_list().unwrap(),
            &["infra".to_string(), "q3".to_string()]
        );
        assert_eq!(decoded.body, "Body.\n");
    }

    #[test]
    fn decode_preserves_key_order() {
        let doc = "---\nzeta: 1\nalpha: 2\nmiddle: 3\n---\n";
        let decoded = decode(doc).unwrap();
        let keys: Vec<&str> = decoded.metadata.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "middle"]);
    }

    #[test]
    fn decode_unclosed_block_fails() {
        let doc = "---\nid: t-1\nno closing line";
        assert!(matches!(decode(doc), Err(FrontmatterError::Unclosed)));
        assert!(matches!(decode("---"), Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn decode_lossy_degrades_unclosed_block_to_body() {
        let doc = "---\nid: t-1\nno closing line";
        let decoded = decode_lossy(doc);
        assert!(decoded.metadata.is_empty());
        assert_eq!(decoded.body, doc);
        assert_eq!(decoded.raw_block, None);
    }

    #[test]
    fn decode_skips_malformed_lines() {
        let doc = "---\nid: t-1\nthis line has no colon\n# a comment\n\nname: ok\n---\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(decoded.metadata.len(), 2);
        assert_eq!(decoded.metadata.get_scalar("name"), Some("ok"));
    }

    #[test]
    fn decode_scalar_value_may_contain_colon() {
        let doc = "---\nlink: https://example.com/x\n---\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(
            decoded.metadata.get_scalar("link"),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn encode_decode_round_trip_canonical() {
        let doc = "---\nid: loop-7\nstatus: active\nsteps:\n  - fetch\n  - apply\n---\n\n## Plan\n\n- [ ] fetch inputs\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(encode(&decoded.metadata, &decoded.body), doc);
    }

    #[test]
    fn raw_block_is_verbatim_even_when_noncanonical() {
        // Extra spacing would be lost by re-encoding; the raw block keeps it.
        let doc = "---\nid:   padded\n---\nBody\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(decoded.raw_block.as_deref(), Some("---\nid:   padded\n---\n"));
        assert_eq!(decoded.metadata.get_scalar("id"), Some("padded"));
    }

    #[test]
    fn encode_empty_metadata_is_bare_body() {
        assert_eq!(encode(&Metadata::new(), "text\n"), "text\n");
    }

    #[test]
    fn set_keeps_position_on_update() {
        let mut m = Metadata::new();
        m.set("a", "1");
        m.set("b", "2");
        m.set("a", "changed");
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(m.get_scalar("a"), Some("changed"));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut m = Metadata::new();
        m.set("a", "1");
        m.set("b", "2");
        m.set("c", "3");
        m.remove("b");
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn empty_list_round_trips() {
        let doc = "---\ntags:\n---\n";
        let decoded = decode(doc).unwrap();
        assert_eq!(decoded.metadata.get("tags").unwrap().as_list().unwrap().len(), 0);
        assert_eq!(encode(&decoded.metadata, &decoded.body), doc);
    }
}
