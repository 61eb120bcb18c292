use super::*;
use crate::cli::SortArg;
use ll_core::SortKey;

fn args(limit: Option<usize>, sort_by: Option<SortArg>) -> AnalyzeArgs {
    AnalyzeArgs {
        source: SourceKind::Csv,
        input: "workload.csv".to_string(),
        catalog: None,
        limit,
        min_calls: None,
        sort_by,
        output_dir: None,
        prefix: None,
    }
}

#[test]
fn test_filter_defaults_from_config() {
    let filter = resolve_filter(&args(None, None), &Config::default());
    assert_eq!(filter, WorkloadFilter::default());
}

#[test]
fn test_flags_override_config() {
    let mut config = Config::default();
    config.analysis.limit = 50;
    config.analysis.min_calls = 2;

    let filter = resolve_filter(&args(Some(3), Some(SortArg::IoTime)), &config);
    assert_eq!(filter.limit, 3);
    assert_eq!(filter.min_calls, 2);
    assert_eq!(filter.sort_by, SortKey::IoTime);
}

#[test]
fn test_analysis_paths() {
    let paths = AnalysisPaths::new(Path::new("out"), "analysis", "20240101_120000");
    assert_eq!(
        paths.queries_csv,
        Path::new("out/analysis_20240101_120000_expensive_queries.csv")
    );
    assert_eq!(
        paths.table_stats_csv,
        Path::new("out/analysis_20240101_120000_table_stats.csv")
    );
    let exports: Vec<&Path> = paths.exports().iter().map(|(_, p)| *p).collect();
    assert_eq!(
        exports,
        vec![
            Path::new("out/analysis_20240101_120000_lineage.json"),
            Path::new("out/analysis_20240101_120000_lineage.graphml"),
            Path::new("out/analysis_20240101_120000_lineage.dot"),
        ]
    );
}
