use super::*;

fn record(sql: &str, calls: i64, total_time: f64) -> QueryRecord {
    QueryRecord::new(sql, calls, total_time, total_time / calls.max(1) as f64, calls)
}

#[test]
fn test_system_queries_detected() {
    assert!(is_system_query("SELECT * FROM pg_class"));
    assert!(is_system_query("select * from INFORMATION_SCHEMA.tables"));
    assert!(!is_system_query("SELECT * FROM users"));
}

#[test]
fn test_admin_commands_detected() {
    for sql in [
        "BEGIN",
        "  commit",
        "ROLLBACK",
        "SET search_path = app",
        "SHOW work_mem",
        "CREATE TEMP TABLE scratch (id int)",
        "DROP TEMP TABLE scratch",
        "VACUUM users",
        "analyze orders",
    ] {
        assert!(is_admin_command(sql), "{sql}");
    }
    assert!(!is_admin_command("SELECT * FROM settings"));
    assert!(!is_admin_command("UPDATE t SET x = 1"));
}

#[test]
fn test_filter_drops_noise_and_low_call_counts() {
    let filter = WorkloadFilter::default();
    let kept = filter.apply(vec![
        record("SELECT * FROM users", 10, 5.0),
        record("SELECT * FROM pg_stat_activity", 100, 500.0),
        record("BEGIN", 1000, 1.0),
        record("SELECT * FROM rare", 2, 900.0),
    ]);
    let texts: Vec<&str> = kept.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(texts, vec!["SELECT * FROM users"]);
}

#[test]
fn test_filter_sorts_and_limits() {
    let filter = WorkloadFilter {
        min_calls: 1,
        limit: 2,
        sort_by: SortKey::Calls,
    };
    let kept = filter.apply(vec![
        record("SELECT * FROM a", 5, 100.0),
        record("SELECT * FROM b", 50, 1.0),
        record("SELECT * FROM c", 20, 10.0),
    ]);
    let texts: Vec<&str> = kept.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(texts, vec!["SELECT * FROM b", "SELECT * FROM c"]);
}

#[test]
fn test_sort_key_serde_names() {
    let key: SortKey = serde_yaml::from_str("io_time").unwrap();
    assert_eq!(key, SortKey::IoTime);
    assert_eq!(SortKey::MeanTime.to_string(), "mean_time");
}
