//! Trace block extraction
//!
//! Sections may embed machine-readable trace records inside prose as fenced
//! blocks tagged `memory-trace`, each containing one JSON object. Extraction
//! is best-effort: a block whose JSON fails to parse is skipped with a
//! diagnostic, never aborting the scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const FENCE_OPEN: &str = "```memory-trace";
const FENCE_CLOSE: &str = "```";

/// Outcome recorded by a trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Completed,
    Executed,
}

/// Who performed the recorded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceExecutor {
    User,
    System,
}

/// One embedded trace record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub status: TraceStatus,
    pub executor: TraceExecutor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Trace serialization failures
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("trace record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Lazy scan over the `memory-trace` blocks of a section body
///
/// Finite and consumed by iteration; call [`extract`] again for a fresh
/// scan. Records come out in document order. Fence lines must start at
/// column zero (indented fences are ordinary text).
#[derive(Debug)]
pub struct TraceBlocks<'a> {
    lines: std::str::Lines<'a>,
}

impl Iterator for TraceBlocks<'_> {
    type Item = TraceRecord;

    fn next(&mut self) -> Option<TraceRecord> {
        loop {
            let line = self.lines.next()?;
            if line.trim_end() != FENCE_OPEN {
                continue;
            }

            let mut buf = String::new();
            let mut closed = false;
            for inner in self.lines.by_ref() {
                if inner.trim_end() == FENCE_CLOSE {
                    closed = true;
                    break;
                }
                buf.push_str(inner);
                buf.push('\n');
            }
            if !closed {
                tracing::warn!("unterminated memory-trace block at end of section, skipping");
                return None;
            }

            match serde_json::from_str::<TraceRecord>(&buf) {
                Ok(record) => return Some(record),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed memory-trace block");
                }
            }
        }
    }
}

/// Scan a section body for trace records
#[must_use]
pub fn extract(text: &str) -> TraceBlocks<'_> {
    TraceBlocks { lines: text.lines() }
}

/// Render a record as a fenced block ready for appending to a section
///
/// # Errors
/// Returns [`TraceError::Serialize`] when the record cannot be encoded
pub fn to_fenced_block(record: &TraceRecord) -> Result<String, TraceError> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(format!("{FENCE_OPEN}\n{json}\n{FENCE_CLOSE}\n"))
}
