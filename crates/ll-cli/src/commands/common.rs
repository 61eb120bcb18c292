//! Shared helpers for config loading and terminal output

use anyhow::{Context, Result};
use ll_core::{ColumnInfo, Config, LineageGraph, TableStats};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Resolve the project root and load its configuration.
///
/// An explicit `--config` must exist; otherwise a missing `lineagelens.yml`
/// falls back to defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(PathBuf, Config)> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => Config::load_or_default(&root).context("Failed to load project config")?,
    };
    log::debug!("Using dialect {} for {}", config.dialect, root.display());
    Ok((root, config))
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a left-aligned table to stdout, columns separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        println!("{}", line(row.clone()));
    }
}

/// Milliseconds with two decimals
pub(crate) fn format_ms(ms: f64) -> String {
    format!("{:.2}", ms)
}

/// `name type [PK] [NOT NULL]` entries joined by commas
pub(crate) fn format_columns(columns: &[ColumnInfo]) -> String {
    columns
        .iter()
        .map(|c| {
            let mut entry = format!("{} {}", c.name, c.data_type);
            if c.is_primary_key {
                entry.push_str(" PK");
            } else if c.not_null {
                entry.push_str(" NOT NULL");
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print per-table statistics
pub(crate) fn print_table_stats(stats: &[TableStats]) {
    if stats.is_empty() {
        println!("No tables found.");
        return;
    }

    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                s.table_name.clone(),
                s.schema.clone(),
                s.read_queries.to_string(),
                s.write_queries.to_string(),
                format_ms(s.total_read_time),
                format_ms(s.total_write_time),
                format_ms(s.total_time),
                s.columns.len().to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            "TABLE", "SCHEMA", "READS", "WRITES", "READ_MS", "WRITE_MS", "TOTAL_MS", "COLUMNS",
        ],
        &rows,
    );
}

/// Print derived table-to-table edges
pub(crate) fn print_lineage(graph: &LineageGraph) {
    let edges = graph.lineage_edges();
    if edges.is_empty() {
        println!("No table-to-table lineage found.");
        return;
    }

    println!("Table lineage:");
    for edge in edges {
        let via: Vec<&str> = edge.via_queries.iter().map(|q| q.as_str()).collect();
        println!("  {} -> {} (via {})", edge.source, edge.target, via.join(", "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
