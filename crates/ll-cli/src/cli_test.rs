use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_analyze_defaults() {
    let cli = Cli::try_parse_from(["lineagelens", "analyze", "--input", "workload.csv"]).unwrap();
    assert!(!cli.global.verbose);
    assert_eq!(cli.global.project_dir, ".");
    match cli.command {
        Commands::Analyze(args) => {
            assert_eq!(args.source, SourceKind::Csv);
            assert_eq!(args.input, "workload.csv");
            assert!(args.limit.is_none());
            assert!(args.sort_by.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_analyze_overrides() {
    let cli = Cli::try_parse_from([
        "lineagelens",
        "-v",
        "analyze",
        "--source",
        "duckdb",
        "-i",
        "snap.duckdb",
        "--limit",
        "5",
        "--min-calls",
        "1",
        "--sort-by",
        "mean_time",
        "--prefix",
        "nightly",
    ])
    .unwrap();
    assert!(cli.global.verbose);
    let Commands::Analyze(args) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.source, SourceKind::Duckdb);
    assert_eq!(args.limit, Some(5));
    assert_eq!(args.min_calls, Some(1));
    assert_eq!(args.sort_by.map(SortKey::from), Some(SortKey::MeanTime));
    assert_eq!(args.prefix.as_deref(), Some("nightly"));
}

#[test]
fn test_analyze_requires_input() {
    assert!(Cli::try_parse_from(["lineagelens", "analyze"]).is_err());
}

#[test]
fn test_parse_extract_and_inspect() {
    let cli = Cli::try_parse_from(["lineagelens", "extract", "SELECT 1", "-o", "json"]).unwrap();
    let Commands::Extract(args) = cli.command else {
        panic!("expected extract");
    };
    assert_eq!(args.sql.as_deref(), Some("SELECT 1"));
    assert_eq!(args.output, ExtractOutput::Json);

    let cli = Cli::try_parse_from(["lineagelens", "inspect", "lineage.json"]).unwrap();
    let Commands::Inspect(args) = cli.command else {
        panic!("expected inspect");
    };
    assert_eq!(args.output, InspectOutput::Table);
}
