//! ll-db - Workload sources for LineageLens
//!
//! This crate provides the `WorkloadSource` trait and implementations for
//! CSV exports and DuckDB snapshots of `pg_stat_statements`.

pub mod csv_workload;
pub mod duckdb;
pub mod error;
pub mod traits;

pub use csv_workload::CsvWorkload;
pub use duckdb::{DuckDbBackend, STATS_TABLE};
pub use error::{DbError, DbResult};
pub use traits::WorkloadSource;
