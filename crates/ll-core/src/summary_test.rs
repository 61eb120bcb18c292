use super::*;
use crate::enrich::NoCatalog;
use crate::query::QueryRecord;

fn record(sql: &str, total_time: f64) -> QueryRecord {
    QueryRecord::new(sql, 5, total_time, total_time / 5.0, 10)
}

fn find<'a>(stats: &'a [TableStats], key: &str) -> &'a TableStats {
    stats.iter().find(|s| s.table_name == key).unwrap()
}

#[test]
fn test_summary_of_empty_graph() {
    assert!(summarize(&LineageGraph::new()).is_empty());
}

#[test]
fn test_counts_match_edges_for_three_tables_two_queries() {
    // q1 reads a and b; q2 reads a and writes c
    let records = vec![
        record("SELECT * FROM a JOIN b", 100.0),
        record("INSERT INTO c SELECT * FROM a", 40.0),
    ];
    let graph = LineageGraph::build(&records, &NoCatalog);
    let stats = summarize(&graph);

    assert_eq!(stats.len(), 3);
    for s in &stats {
        assert_eq!(s.read_queries, graph.readers_of(&s.table_name).len());
        assert_eq!(s.write_queries, graph.writers_of(&s.table_name).len());
        assert_eq!(s.total_queries, s.read_queries + s.write_queries);
    }

    let a = find(&stats, "a");
    assert_eq!((a.read_queries, a.write_queries), (2, 0));
    assert_eq!(a.total_read_time, 140.0);
    assert_eq!(a.total_time, 140.0);

    let b = find(&stats, "b");
    assert_eq!((b.read_queries, b.write_queries), (1, 0));
    assert_eq!(b.total_read_time, 100.0);

    let c = find(&stats, "c");
    assert_eq!((c.read_queries, c.write_queries), (0, 1));
    assert_eq!(c.total_write_time, 40.0);
    assert_eq!(c.total_read_time, 0.0);
}

#[test]
fn test_sorted_by_total_time_then_key() {
    let records = vec![
        record("SELECT * FROM zeta", 10.0),
        record("SELECT * FROM alpha", 10.0),
        record("SELECT * FROM hot", 500.0),
    ];
    let stats = summarize(&LineageGraph::build(&records, &NoCatalog));
    let order: Vec<&str> = stats.iter().map(|s| s.table_name.as_str()).collect();
    assert_eq!(order, vec!["hot", "alpha", "zeta"]);
}

#[test]
fn test_summary_carries_schema_and_display_name() {
    let records = vec![record("UPDATE sales.orders SET x = 1", 3.0)];
    let stats = summarize(&LineageGraph::build(&records, &NoCatalog));
    assert_eq!(stats[0].table_name, "sales.orders");
    assert_eq!(stats[0].schema, "sales");
    assert_eq!(stats[0].display_name, "orders");
    assert_eq!(stats[0].write_queries, 1);
}
