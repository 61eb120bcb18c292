use super::*;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.dialect, Dialect::Postgres);
    assert_eq!(config.analysis.limit, 20);
    assert_eq!(config.analysis.min_calls, 5);
    assert_eq!(config.analysis.sort_by, SortKey::TotalTime);
    assert_eq!(config.output.dir, "target");
    assert_eq!(config.output.prefix, "analysis");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
dialect: generic
analysis:
  limit: 50
  min_calls: 1
  sort_by: mean_time
output:
  dir: reports
  prefix: nightly
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.dialect, Dialect::Generic);
    assert_eq!(config.analysis.limit, 50);
    assert_eq!(config.analysis.sort_by, SortKey::MeanTime);
    assert_eq!(config.output.prefix, "nightly");

    let filter = config.workload_filter();
    assert_eq!(filter.min_calls, 1);
    assert_eq!(filter.limit, 50);

    let root = PathBuf::from("/tmp/project");
    assert_eq!(config.output_dir_absolute(&root), root.join("reports"));
}

#[test]
fn test_unknown_field_rejected() {
    let yaml = r#"
analysis:
  limit: 10
  max_calls: 3
"#;
    assert!(serde_yaml::from_str::<Config>(yaml).is_err());
}

#[test]
fn test_validate_rejects_zero_limit() {
    let mut config = Config::default();
    config.analysis.limit = 0;
    assert!(matches!(
        config.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_validate_rejects_blank_prefix() {
    let mut config = Config::default();
    config.output.prefix = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    let mut file = std::fs::File::create(dir.path().join("lineagelens.yaml")).unwrap();
    writeln!(file, "analysis:\n  limit: 7").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.analysis.limit, 7);
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::load_from_dir(dir.path()),
        Err(CoreError::ConfigNotFound { .. })
    ));
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.analysis.limit, 20);
}

#[test]
fn test_load_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lineagelens.yml"), "analysis:\n  limit: 0\n").unwrap();
    assert!(Config::load_or_default(dir.path()).is_err());
}
