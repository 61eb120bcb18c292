//! ll-core - Core library for LineageLens
//!
//! This crate provides the workload model, the query/table lineage graph,
//! column enrichment, per-table summaries, and graph export.

pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod graph;
pub mod query;
pub mod summary;
pub mod workload;

pub use config::{AnalysisConfig, Config, Dialect, OutputConfig};
pub use enrich::{ColumnInfo, ColumnLookup, NoCatalog, TableEnricher};
pub use error::{CoreError, CoreResult, LookupError};
pub use export::{
    read_export, to_graphml, write_export, write_queries_csv, write_table_stats_csv,
    ExportFormat, ExportLink, ExportNode, ExportStatus, GraphExport,
};
pub use graph::{
    EdgeKind, LineageGraph, LineageGraphBuilder, LineageNode, NodeType, QueryNode, TableLineage,
    TableNode,
};
pub use query::{preview, QueryId, QueryRecord};
pub use summary::{summarize, TableStats};
pub use workload::{is_admin_command, is_system_query, SortKey, WorkloadFilter};

pub use ll_sql::{TableRef, DEFAULT_SCHEMA};
