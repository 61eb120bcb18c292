//! Workload selection: drop catalog and session noise, keep the heaviest queries

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::query::QueryRecord;

/// Metric used to rank workload records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    TotalTime,
    MeanTime,
    Calls,
    Rows,
    IoTime,
}

impl SortKey {
    /// Column name in `pg_stat_statements`-shaped data
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::TotalTime => "total_time",
            SortKey::MeanTime => "mean_time",
            SortKey::Calls => "calls",
            SortKey::Rows => "rows",
            SortKey::IoTime => "io_time",
        }
    }

    fn value(&self, record: &QueryRecord) -> f64 {
        match self {
            SortKey::TotalTime => record.total_time,
            SortKey::MeanTime => record.mean_time,
            SortKey::Calls => record.calls as f64,
            SortKey::Rows => record.rows as f64,
            SortKey::IoTime => record.io_time,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_MIN_CALLS: i64 = 5;

/// Filter applied to fetched workload records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadFilter {
    pub min_calls: i64,
    pub limit: usize,
    pub sort_by: SortKey,
}

impl Default for WorkloadFilter {
    fn default() -> Self {
        Self {
            min_calls: DEFAULT_MIN_CALLS,
            limit: DEFAULT_LIMIT,
            sort_by: SortKey::default(),
        }
    }
}

impl WorkloadFilter {
    /// Drop system and administrative statements and rarely-called queries,
    /// then keep the top `limit` by `sort_by`.
    pub fn apply(&self, records: Vec<QueryRecord>) -> Vec<QueryRecord> {
        let before = records.len();
        let mut kept: Vec<QueryRecord> = records
            .into_iter()
            .filter(|r| r.calls >= self.min_calls)
            .filter(|r| !is_system_query(&r.query) && !is_admin_command(&r.query))
            .collect();

        kept.sort_by(|a, b| self.sort_by.value(b).total_cmp(&self.sort_by.value(a)));
        kept.truncate(self.limit);
        log::debug!(
            "Workload filter kept {} of {} queries (min_calls={}, sort_by={})",
            kept.len(),
            before,
            self.min_calls,
            self.sort_by
        );
        kept
    }
}

fn system_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)pg_|information_schema|pg_toast").expect("valid regex"))
}

fn admin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:BEGIN|COMMIT|ROLLBACK|SET |SHOW |CREATE TEMP|DROP TEMP|VACUUM|ANALYZE)",
        )
        .expect("valid regex")
    })
}

/// Whether the query touches PostgreSQL catalogs
pub fn is_system_query(query: &str) -> bool {
    system_pattern().is_match(query)
}

/// Whether the query is a transaction, session, or maintenance command
pub fn is_admin_command(query: &str) -> bool {
    admin_pattern().is_match(query)
}

#[cfg(test)]
#[path = "workload_test.rs"]
mod tests;
