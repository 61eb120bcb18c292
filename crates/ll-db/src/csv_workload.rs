//! Workload read from a CSV export of pg_stat_statements

use crate::error::{DbError, DbResult};
use crate::traits::WorkloadSource;
use async_trait::async_trait;
use ll_core::{QueryRecord, WorkloadFilter};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One CSV row. Exports from servers before PostgreSQL 13 carry
/// `blk_read_time`/`blk_write_time` instead of `io_time`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    query: String,
    calls: i64,
    #[serde(alias = "total_exec_time")]
    total_time: f64,
    #[serde(alias = "mean_exec_time")]
    mean_time: f64,
    rows: i64,
    #[serde(default)]
    io_time: Option<f64>,
    #[serde(default)]
    blk_read_time: Option<f64>,
    #[serde(default)]
    blk_write_time: Option<f64>,
    #[serde(default)]
    shared_blks_hit: Option<i64>,
    #[serde(default)]
    shared_blks_read: Option<i64>,
    #[serde(default)]
    temp_blks_written: Option<i64>,
}

impl From<CsvRow> for QueryRecord {
    fn from(row: CsvRow) -> Self {
        let io_time = row.io_time.unwrap_or_else(|| {
            row.blk_read_time.unwrap_or(0.0) + row.blk_write_time.unwrap_or(0.0)
        });
        QueryRecord {
            query: row.query,
            calls: row.calls,
            total_time: row.total_time,
            mean_time: row.mean_time,
            rows: row.rows,
            io_time,
            shared_blks_hit: row.shared_blks_hit.unwrap_or(0),
            shared_blks_read: row.shared_blks_read.unwrap_or(0),
            temp_blks_written: row.temp_blks_written.unwrap_or(0),
        }
    }
}

/// CSV file with a header row. Columns are matched by name; `total_exec_time`
/// and `mean_exec_time` are accepted for `total_time` and `mean_time`, and
/// the I/O columns are optional.
pub struct CsvWorkload {
    path: PathBuf,
}

impl CsvWorkload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record, unfiltered
    pub fn read_all(&self) -> DbResult<Vec<QueryRecord>> {
        if !self.path.is_file() {
            return Err(DbError::FileNotFound(self.path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let records = reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(QueryRecord::from))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Read {} workload records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

#[async_trait]
impl WorkloadSource for CsvWorkload {
    async fn stats_available(&self) -> DbResult<bool> {
        Ok(self.path.is_file())
    }

    async fn fetch_query_stats(&self, filter: &WorkloadFilter) -> DbResult<Vec<QueryRecord>> {
        Ok(filter.apply(self.read_all()?))
    }

    fn source_type(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
#[path = "csv_workload_test.rs"]
mod tests;
