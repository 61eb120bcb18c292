//! DuckDB snapshot backend
//!
//! Reads a `pg_stat_statements` table copied into DuckDB, and answers column
//! lookups from the same database's catalog.

use crate::error::{DbError, DbResult};
use crate::traits::WorkloadSource;
use async_trait::async_trait;
use duckdb::Connection;
use ll_core::{ColumnInfo, ColumnLookup, LookupError, QueryRecord, SortKey, TableRef, WorkloadFilter};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Name of the statistics table in a snapshot database
pub const STATS_TABLE: &str = "pg_stat_statements";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a DuckDB database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute multiple SQL statements
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let (schema, table) = split_relation(name);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            [schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn stats_columns_sync(&self) -> DbResult<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT lower(column_name) FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ?",
        )?;
        let (schema, table) = split_relation(STATS_TABLE);
        let columns = stmt
            .query_map([schema, table], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(columns)
    }

    /// Build the statistics SELECT for the columns this snapshot carries.
    ///
    /// PostgreSQL 13 renamed `total_time`/`mean_time` to `total_exec_time`/
    /// `mean_exec_time`; either spelling is accepted. I/O time is taken from
    /// `io_time` or `blk_read_time + blk_write_time`, else zero.
    fn stats_query(&self, sort_by: SortKey) -> DbResult<String> {
        let columns = self.stats_columns_sync()?;
        if columns.is_empty() {
            return Err(DbError::TableNotFound(STATS_TABLE.to_string()));
        }

        let require = |column: &str| -> DbResult<()> {
            if columns.contains(column) {
                Ok(())
            } else {
                Err(DbError::MissingColumn {
                    table: STATS_TABLE.to_string(),
                    column: column.to_string(),
                })
            }
        };
        require("query")?;
        require("calls")?;
        require("rows")?;

        let first_of = |candidates: &[&'static str]| -> DbResult<&'static str> {
            candidates
                .iter()
                .copied()
                .find(|c| columns.contains(*c))
                .ok_or_else(|| DbError::MissingColumn {
                    table: STATS_TABLE.to_string(),
                    column: candidates.join(" or "),
                })
        };
        let total = first_of(&["total_exec_time", "total_time"])?;
        let mean = first_of(&["mean_exec_time", "mean_time"])?;

        let io = if columns.contains("io_time") {
            "COALESCE(io_time, 0)".to_string()
        } else if columns.contains("blk_read_time") && columns.contains("blk_write_time") {
            "COALESCE(blk_read_time, 0) + COALESCE(blk_write_time, 0)".to_string()
        } else {
            "0".to_string()
        };
        let counter = |name: &str| {
            if columns.contains(name) {
                format!("COALESCE({name}, 0)")
            } else {
                "0".to_string()
            }
        };

        Ok(format!(
            "SELECT query, \
             CAST(calls AS BIGINT) AS calls, \
             CAST({total} AS DOUBLE) AS total_time, \
             CAST({mean} AS DOUBLE) AS mean_time, \
             CAST(\"rows\" AS BIGINT) AS \"rows\", \
             CAST({io} AS DOUBLE) AS io_time, \
             CAST({hit} AS BIGINT) AS shared_blks_hit, \
             CAST({read} AS BIGINT) AS shared_blks_read, \
             CAST({temp} AS BIGINT) AS temp_blks_written \
             FROM {STATS_TABLE} \
             WHERE calls >= ? \
             ORDER BY \"{order}\" DESC",
            hit = counter("shared_blks_hit"),
            read = counter("shared_blks_read"),
            temp = counter("temp_blks_written"),
            order = sort_by.column(),
        ))
    }

    fn fetch_query_stats_sync(&self, filter: &WorkloadFilter) -> DbResult<Vec<QueryRecord>> {
        let sql = self.stats_query(filter.sort_by)?;
        log::debug!("Fetching workload: {}", sql);

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([filter.min_calls], |row| {
                Ok(QueryRecord {
                    query: row.get(0)?,
                    calls: row.get(1)?,
                    total_time: row.get(2)?,
                    mean_time: row.get(3)?,
                    rows: row.get(4)?,
                    io_time: row.get(5)?,
                    shared_blks_hit: row.get(6)?,
                    shared_blks_read: row.get(7)?,
                    temp_blks_written: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filter.apply(records))
    }

    fn lookup_columns_sync(&self, table: &TableRef) -> DbResult<Vec<ColumnInfo>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info('{}') ORDER BY cid",
            catalog_name(table).replace('\'', "''")
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    not_null: row.get(2)?,
                    is_primary_key: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

/// DuckDB name for a table reference. The PostgreSQL default schema maps to
/// DuckDB's search path, so `public.users` is looked up as `users`.
fn catalog_name(table: &TableRef) -> String {
    if table.schema() == ll_core::DEFAULT_SCHEMA {
        table.name().to_string()
    } else {
        table.qualified()
    }
}

fn split_relation(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

#[async_trait]
impl WorkloadSource for DuckDbBackend {
    async fn stats_available(&self) -> DbResult<bool> {
        self.relation_exists_sync(STATS_TABLE)
    }

    async fn fetch_query_stats(&self, filter: &WorkloadFilter) -> DbResult<Vec<QueryRecord>> {
        self.fetch_query_stats_sync(filter)
    }

    fn source_type(&self) -> &'static str {
        "duckdb"
    }
}

impl ColumnLookup for DuckDbBackend {
    fn lookup_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, LookupError> {
        match self.lookup_columns_sync(table) {
            Ok(columns) => Ok(columns),
            Err(DbError::TableNotFound(_)) => Err(LookupError::TableNotFound(table.to_string())),
            Err(e) => Err(LookupError::Catalog(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
