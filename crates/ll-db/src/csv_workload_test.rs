use super::*;
use ll_core::SortKey;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("workload.csv");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_read_pg13_columns_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "query,calls,total_exec_time,mean_exec_time,rows\n\
         \"SELECT * FROM users WHERE id = $1\",42,84.0,2.0,42\n",
    );

    let source = CsvWorkload::new(&path);
    assert_eq!(source.source_type(), "csv");
    assert!(source.stats_available().await.unwrap());

    let records = source.read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].calls, 42);
    assert_eq!(records[0].total_time, 84.0);
    assert_eq!(records[0].io_time, 0.0);
}

#[tokio::test]
async fn test_fetch_applies_filter() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "query,calls,total_time,mean_time,rows,io_time\n\
         SELECT * FROM orders,10,500.0,50.0,100,20.0\n\
         SELECT * FROM users,100,50.0,0.5,100,0.0\n\
         SELECT * FROM pg_class,100,900.0,9.0,1,0.0\n\
         BEGIN,1000,1.0,0.001,0,0.0\n\
         SELECT * FROM rare,1,999.0,999.0,1,0.0\n",
    );

    let filter = WorkloadFilter {
        min_calls: 5,
        limit: 10,
        sort_by: SortKey::TotalTime,
    };
    let records = CsvWorkload::new(&path).fetch_query_stats(&filter).await.unwrap();
    let texts: Vec<&str> = records.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(texts, vec!["SELECT * FROM orders", "SELECT * FROM users"]);
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let source = CsvWorkload::new(dir.path().join("absent.csv"));
    assert!(!source.stats_available().await.unwrap());
    assert!(matches!(
        source.fetch_query_stats(&WorkloadFilter::default()).await,
        Err(DbError::FileNotFound(_))
    ));
}

#[test]
fn test_malformed_number_is_csv_error() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "query,calls,total_time,mean_time,rows\nSELECT 1,many,1.0,1.0,1\n",
    );
    assert!(matches!(
        CsvWorkload::new(&path).read_all(),
        Err(DbError::CsvError(_))
    ));
}

#[test]
fn test_legacy_block_times_become_io_time() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "query,calls,total_time,mean_time,rows,blk_read_time,blk_write_time\n\
         SELECT * FROM orders,10,200.0,20.0,100,30.0,20.0\n\
         SELECT * FROM users,10,100.0,10.0,10,,\n",
    );

    let records = CsvWorkload::new(&path).read_all().unwrap();
    assert_eq!(records[0].io_time, 50.0);
    assert_eq!(records[0].io_percentage(), 25.0);
    assert_eq!(records[1].io_time, 0.0);
}

#[test]
fn test_io_time_column_wins_over_block_times() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "query,calls,total_time,mean_time,rows,io_time,blk_read_time,blk_write_time\n\
         SELECT * FROM orders,10,200.0,20.0,100,8.0,30.0,20.0\n",
    );

    let records = CsvWorkload::new(&path).read_all().unwrap();
    assert_eq!(records[0].io_time, 8.0);
}
