//! Per-table read/write statistics

use serde::Serialize;

use crate::enrich::ColumnInfo;
use crate::graph::LineageGraph;

/// Aggregated workload statistics for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    /// Normalized table key
    pub table_name: String,
    pub schema: String,
    pub display_name: String,
    /// Number of queries reading the table
    pub read_queries: usize,
    /// Number of queries writing the table
    pub write_queries: usize,
    pub total_queries: usize,
    pub total_read_time: f64,
    pub total_write_time: f64,
    pub total_time: f64,
    pub columns: Vec<ColumnInfo>,
}

/// Summarize every table that at least one query reads or writes.
///
/// Sorted by `total_time` descending, then by table key.
pub fn summarize(graph: &LineageGraph) -> Vec<TableStats> {
    let mut stats: Vec<TableStats> = graph
        .tables()
        .filter_map(|table| {
            let readers = graph.readers_of(table.key());
            let writers = graph.writers_of(table.key());
            if readers.is_empty() && writers.is_empty() {
                return None;
            }

            let total_read_time: f64 = readers.iter().map(|q| q.total_time).sum();
            let total_write_time: f64 = writers.iter().map(|q| q.total_time).sum();
            Some(TableStats {
                table_name: table.key().to_string(),
                schema: table.schema.clone(),
                display_name: table.display_name.clone(),
                read_queries: readers.len(),
                write_queries: writers.len(),
                total_queries: readers.len() + writers.len(),
                total_read_time,
                total_write_time,
                total_time: total_read_time + total_write_time,
                columns: table.columns.clone(),
            })
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_time
            .total_cmp(&a.total_time)
            .then_with(|| a.table_name.cmp(&b.table_name))
    });
    stats
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
