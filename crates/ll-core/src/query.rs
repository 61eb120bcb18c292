//! Workload records and query identity

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Query ids are `Query_<n>` with `n` below this bound.
pub const QUERY_ID_MODULUS: u64 = 1_000_000;

/// Number of characters kept in a query preview before `...` is appended.
pub const PREVIEW_CHARS: usize = 100;

/// One aggregated workload entry, as reported by `pg_stat_statements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Normalized query text, with `$n` placeholders for literals
    pub query: String,

    /// Number of executions
    pub calls: i64,

    /// Total execution time in milliseconds
    #[serde(alias = "total_exec_time")]
    pub total_time: f64,

    /// Mean execution time in milliseconds
    #[serde(alias = "mean_exec_time")]
    pub mean_time: f64,

    /// Total rows retrieved or affected
    pub rows: i64,

    /// Block read plus write time in milliseconds
    #[serde(default)]
    pub io_time: f64,

    #[serde(default)]
    pub shared_blks_hit: i64,

    #[serde(default)]
    pub shared_blks_read: i64,

    #[serde(default)]
    pub temp_blks_written: i64,
}

impl QueryRecord {
    /// Create a record with zeroed I/O counters
    pub fn new(
        query: impl Into<String>,
        calls: i64,
        total_time: f64,
        mean_time: f64,
        rows: i64,
    ) -> Self {
        Self {
            query: query.into(),
            calls,
            total_time,
            mean_time,
            rows,
            io_time: 0.0,
            shared_blks_hit: 0,
            shared_blks_read: 0,
            temp_blks_written: 0,
        }
    }

    /// Set the I/O time
    pub fn with_io_time(mut self, io_time: f64) -> Self {
        self.io_time = io_time;
        self
    }

    /// Total time divided by rows; zero rows count as one.
    pub fn time_per_row(&self) -> f64 {
        self.total_time / self.rows.max(1) as f64
    }

    /// Share of total time spent on I/O, in percent.
    pub fn io_percentage(&self) -> f64 {
        if self.total_time <= 0.0 {
            return 0.0;
        }
        self.io_time / self.total_time * 100.0
    }

    /// Deterministic id derived from the query text
    pub fn id(&self) -> QueryId {
        QueryId::for_text(&self.query)
    }

    /// Shortened query text for display
    pub fn preview(&self) -> String {
        preview(&self.query)
    }
}

/// Short display id for a query node, e.g. `Query_48213`.
///
/// Distinct texts may collide; the id is a label, not a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    /// Derive the id for a query text
    pub fn for_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let n = u64::from_be_bytes(prefix) % QUERY_ID_MODULUS;
        Self(format!("Query_{n}"))
    }

    /// Wrap an id read back from an export
    pub fn from_existing(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, with `...` if truncated.
pub fn preview(text: &str) -> String {
    truncate_chars(text, PREVIEW_CHARS)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
