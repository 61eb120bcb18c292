//! `lineagelens analyze` command: workload -> lineage graph -> stats and exports

use anyhow::{bail, Context, Result};
use chrono::Utc;
use ll_core::{
    summarize, write_export, write_queries_csv, write_table_stats_csv, ColumnLookup, Config,
    ExportFormat, ExportStatus, LineageGraphBuilder, NoCatalog, QueryRecord, WorkloadFilter,
};
use ll_db::{CsvWorkload, DuckDbBackend, WorkloadSource};
use ll_sql::TableExtractor;
use std::path::{Path, PathBuf};

use crate::cli::{AnalyzeArgs, GlobalArgs, SourceKind};
use crate::commands::common::{load_config, print_lineage, print_table_stats};

const NO_QUERIES: &str =
    "No queries found for analysis. Check pg_stat_statements is enabled and collecting data.";

/// Execute the analyze command
pub async fn execute(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = load_config(global)?;
    let filter = resolve_filter(args, &config);
    if filter.limit == 0 {
        bail!("--limit must be greater than zero");
    }

    let extractor = TableExtractor::from_dialect_name(&config.dialect.to_string())
        .context("Invalid SQL dialect")?;

    let (records, catalog) = match args.source {
        SourceKind::Csv => {
            let source = CsvWorkload::new(&args.input);
            let records = fetch(&source, &filter).await?;
            let catalog = args
                .catalog
                .as_deref()
                .map(DuckDbBackend::new)
                .transpose()
                .context("Failed to open catalog database")?;
            (records, catalog)
        }
        SourceKind::Duckdb => {
            let db = DuckDbBackend::new(&args.input)
                .with_context(|| format!("Failed to open snapshot {}", args.input))?;
            let records = fetch(&db, &filter).await?;
            let catalog = match args.catalog.as_deref() {
                Some(path) => DuckDbBackend::new(path).context("Failed to open catalog database")?,
                None => db,
            };
            (records, Some(catalog))
        }
    };

    if records.is_empty() {
        bail!(NO_QUERIES);
    }
    log::info!("Analyzing {} queries", records.len());

    let lookup: &dyn ColumnLookup = match &catalog {
        Some(db) => db,
        None => &NoCatalog,
    };
    let graph = LineageGraphBuilder::with_extractor(extractor, lookup).build(&records);
    let stats = summarize(&graph);

    let output_dir = match &args.output_dir {
        Some(dir) => root.join(dir),
        None => config.output_dir_absolute(&root),
    };
    let prefix = args.prefix.as_deref().unwrap_or(&config.output.prefix);
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let paths = AnalysisPaths::new(&output_dir, prefix, &stamp);

    write_queries_csv(&records, &paths.queries_csv)
        .context("Failed to write query statistics")?;
    write_table_stats_csv(&stats, &paths.table_stats_csv)
        .context("Failed to write table statistics")?;
    for (format, path) in paths.exports() {
        let status = write_export(&graph, path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if status == ExportStatus::EmptyGraph {
            log::warn!("Skipped {} export: graph is empty", format.extension());
        }
    }

    println!(
        "Analyzed {} queries touching {} tables ({} source)\n",
        graph.query_count(),
        graph.table_count(),
        args.source.as_str()
    );
    print_table_stats(&stats);
    println!();
    print_lineage(&graph);
    println!("\nResults written to {}", output_dir.display());

    Ok(())
}

/// CLI flags override the config file
fn resolve_filter(args: &AnalyzeArgs, config: &Config) -> WorkloadFilter {
    let mut filter = config.workload_filter();
    if let Some(limit) = args.limit {
        filter.limit = limit;
    }
    if let Some(min_calls) = args.min_calls {
        filter.min_calls = min_calls;
    }
    if let Some(sort_by) = args.sort_by {
        filter.sort_by = sort_by.into();
    }
    filter
}

async fn fetch(source: &dyn WorkloadSource, filter: &WorkloadFilter) -> Result<Vec<QueryRecord>> {
    if !source.stats_available().await? {
        bail!(
            "pg_stat_statements data is not available from the {} source",
            source.source_type()
        );
    }
    source
        .fetch_query_stats(filter)
        .await
        .context("Failed to fetch query statistics")
}

/// Output files of one analysis run, all named `<prefix>_<timestamp>_*`
#[derive(Debug)]
pub(crate) struct AnalysisPaths {
    pub queries_csv: PathBuf,
    pub table_stats_csv: PathBuf,
    pub lineage_json: PathBuf,
    pub lineage_graphml: PathBuf,
    pub lineage_dot: PathBuf,
}

impl AnalysisPaths {
    pub(crate) fn new(dir: &Path, prefix: &str, stamp: &str) -> Self {
        let file = |suffix: &str| dir.join(format!("{prefix}_{stamp}_{suffix}"));
        Self {
            queries_csv: file("expensive_queries.csv"),
            table_stats_csv: file("table_stats.csv"),
            lineage_json: file("lineage.json"),
            lineage_graphml: file("lineage.graphml"),
            lineage_dot: file("lineage.dot"),
        }
    }

    fn exports(&self) -> [(ExportFormat, &Path); 3] {
        [
            (ExportFormat::Json, self.lineage_json.as_path()),
            (ExportFormat::GraphMl, self.lineage_graphml.as_path()),
            (ExportFormat::Dot, self.lineage_dot.as_path()),
        ]
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
