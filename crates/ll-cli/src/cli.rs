//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use ll_core::SortKey;

/// LineageLens - table lineage from a PostgreSQL query workload
#[derive(Parser, Debug)]
#[command(name = "lineagelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the lineage graph and table statistics for a workload
    Analyze(AnalyzeArgs),

    /// Show the tables a single SQL statement reads and writes
    Extract(ExtractArgs),

    /// Summarize a previously exported lineage graph
    Inspect(InspectArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Where the workload comes from
    #[arg(short, long, value_enum, default_value = "csv")]
    pub source: SourceKind,

    /// CSV export or DuckDB snapshot path
    #[arg(short, long)]
    pub input: String,

    /// DuckDB database used for column metadata (defaults to the snapshot
    /// itself for --source duckdb)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Maximum number of queries to analyze
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Ignore queries called fewer times than this
    #[arg(long)]
    pub min_calls: Option<i64>,

    /// Metric used to pick the top queries
    #[arg(long, value_enum)]
    pub sort_by: Option<SortArg>,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Override output file prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Workload source kinds
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// CSV export of pg_stat_statements
    Csv,
    /// DuckDB database holding a pg_stat_statements table
    Duckdb,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Duckdb => "duckdb",
        }
    }
}

/// Sort keys for workload selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    #[value(name = "total_time")]
    TotalTime,
    #[value(name = "mean_time")]
    MeanTime,
    Calls,
    Rows,
    #[value(name = "io_time")]
    IoTime,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::TotalTime => SortKey::TotalTime,
            SortArg::MeanTime => SortKey::MeanTime,
            SortArg::Calls => SortKey::Calls,
            SortArg::Rows => SortKey::Rows,
            SortArg::IoTime => SortKey::IoTime,
        }
    }
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// SQL text (read from stdin when omitted)
    pub sql: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ExtractOutput,
}

/// Extract output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutput {
    /// Human-readable listing
    Table,
    /// JSON object with sources and destinations
    Json,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Lineage JSON written by `analyze`
    pub path: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: InspectOutput,
}

/// Inspect output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectOutput {
    /// Table statistics and lineage edges
    Table,
    /// Table statistics as JSON
    Json,
    /// Graphviz DOT
    Dot,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
