use super::*;
use crate::enrich::NoCatalog;
use crate::error::LookupError;
use std::cell::Cell;

fn record(sql: &str, total_time: f64) -> QueryRecord {
    QueryRecord::new(sql, 10, total_time, total_time / 10.0, 100)
}

fn two_query_batch() -> Vec<QueryRecord> {
    vec![
        record("SELECT * FROM a JOIN b", 120.0),
        record("INSERT INTO c SELECT * FROM a", 80.0),
    ]
}

struct CountingLookup {
    calls: Cell<usize>,
}

impl ColumnLookup for CountingLookup {
    fn lookup_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, LookupError> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![ColumnInfo::new(format!("{}_id", table.name()), "integer")])
    }
}

#[test]
fn test_empty_input_gives_empty_graph() {
    let graph = LineageGraph::build(&[], &NoCatalog);
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.lineage_edges().is_empty());
}

#[test]
fn test_two_query_batch() {
    let records = two_query_batch();
    let graph = LineageGraph::build(&records, &NoCatalog);

    let tables: Vec<&str> = graph.tables().map(|t| t.key()).collect();
    assert_eq!(tables, vec!["a", "b", "c"]);
    assert_eq!(graph.query_count(), 2);

    let lineage = graph.lineage_edges();
    assert_eq!(lineage.len(), 1);
    assert_eq!(lineage[0].source.key(), "a");
    assert_eq!(lineage[0].target.key(), "c");
    assert_eq!(lineage[0].via_queries, vec![records[1].id()]);
}

#[test]
fn test_read_and_write_edges() {
    let records = two_query_batch();
    let graph = LineageGraph::build(&records, &NoCatalog);
    let select_id = records[0].id();
    let insert_id = records[1].id();

    let readers: Vec<&QueryId> = graph.readers_of("a").iter().map(|q| &q.id).collect();
    assert_eq!(readers, vec![&select_id, &insert_id]);
    assert!(graph.writers_of("a").is_empty());

    let writers: Vec<&QueryId> = graph.writers_of("c").iter().map(|q| &q.id).collect();
    assert_eq!(writers, vec![&insert_id]);

    let sources: Vec<&str> = graph.sources_of(select_id.as_str()).iter().map(|t| t.key()).collect();
    assert_eq!(sources, vec!["a", "b"]);
    assert!(graph.destinations_of(select_id.as_str()).is_empty());

    let edges = graph.edge_set();
    assert!(edges.contains(&("a".to_string(), select_id.to_string())));
    assert!(edges.contains(&(insert_id.to_string(), "c".to_string())));
    assert!(edges.contains(&("a".to_string(), "c".to_string())));
    assert_eq!(edges.len(), 5);
}

#[test]
fn test_build_is_idempotent() {
    let records = vec![
        record("INSERT INTO report SELECT * FROM orders JOIN users ON true", 10.0),
        record("UPDATE users SET active = false FROM sessions", 20.0),
        record("SELECT * FROM report", 5.0),
    ];
    let first = LineageGraph::build(&records, &NoCatalog);
    let second = LineageGraph::build(&records, &NoCatalog);

    assert_eq!(first.node_keys(), second.node_keys());
    assert_eq!(first.edge_set(), second.edge_set());
    assert_eq!(first.lineage_edges(), second.lineage_edges());
}

#[test]
fn test_repeated_edges_are_deduplicated() {
    let records = vec![
        record("INSERT INTO c SELECT * FROM a", 1.0),
        record("INSERT INTO c SELECT * FROM a", 2.0),
    ];
    let graph = LineageGraph::build(&records, &NoCatalog);

    assert_eq!(graph.query_count(), 1);
    assert_eq!(graph.edge_count(), 3);
    let id = records[0].id();
    assert_eq!(graph.query(id.as_str()).unwrap().total_time, 2.0);
}

#[test]
fn test_derived_edge_accumulates_mediating_queries() {
    let records = vec![
        record("INSERT INTO c SELECT * FROM a", 1.0),
        record("INSERT INTO c SELECT * FROM a WHERE a.flag", 2.0),
    ];
    let graph = LineageGraph::build(&records, &NoCatalog);

    let lineage = graph.lineage_edges();
    assert_eq!(lineage.len(), 1);
    assert_eq!(lineage[0].via_queries, vec![records[0].id(), records[1].id()]);
}

#[test]
fn test_upstream_and_downstream() {
    let records = vec![
        record("INSERT INTO staging SELECT * FROM raw", 1.0),
        record("INSERT INTO mart SELECT * FROM staging", 1.0),
    ];
    let graph = LineageGraph::build(&records, &NoCatalog);

    let up: Vec<&str> = graph.upstream_tables("staging").iter().map(|t| t.key()).collect();
    let down: Vec<&str> = graph.downstream_tables("staging").iter().map(|t| t.key()).collect();
    assert_eq!(up, vec!["raw"]);
    assert_eq!(down, vec!["mart"]);
    assert!(graph.upstream_tables("unknown").is_empty());
}

#[test]
fn test_columns_looked_up_once_per_table() {
    let lookup = CountingLookup { calls: Cell::new(0) };
    let records = vec![
        record("SELECT * FROM users JOIN orders ON true", 1.0),
        record("SELECT * FROM users", 1.0),
        record("INSERT INTO orders SELECT * FROM users", 1.0),
    ];
    let graph = LineageGraph::build(&records, &lookup);

    assert_eq!(lookup.calls.get(), 2);
    let users = graph.table("users").unwrap();
    assert_eq!(users.columns, vec![ColumnInfo::new("users_id", "integer")]);
}

#[test]
fn test_table_node_fields() {
    let records = vec![record("SELECT * FROM sales.orders JOIN users ON true", 1.0)];
    let graph = LineageGraph::build(&records, &NoCatalog);

    let orders = graph.table("sales.orders").unwrap();
    assert_eq!(orders.schema, "sales");
    assert_eq!(orders.display_name, "orders");

    let users = graph.table("users").unwrap();
    assert_eq!(users.schema, "public");
    assert_eq!(users.display_name, "users");
}

#[test]
fn test_query_without_tables_still_gets_node() {
    let records = vec![record("SELECT 1", 1.0)];
    let graph = LineageGraph::build(&records, &NoCatalog);
    assert_eq!(graph.query_count(), 1);
    assert_eq!(graph.table_count(), 0);
}

#[test]
fn test_table_and_query_lookups_are_typed() {
    let records = two_query_batch();
    let graph = LineageGraph::build(&records, &NoCatalog);
    let id = records[0].id();
    assert!(graph.table(id.as_str()).is_none());
    assert!(graph.query("a").is_none());
    assert_eq!(graph.node("a").map(|n| n.node_type()), Some(NodeType::Table));
}

#[test]
fn test_to_dot_names_every_node() {
    let records = two_query_batch();
    let graph = LineageGraph::build(&records, &NoCatalog);
    let dot = graph.to_dot();

    assert!(dot.starts_with("digraph lineage {"));
    for key in graph.node_keys() {
        assert!(dot.contains(&format!("\"{}\"", key)), "missing {key}");
    }
    assert!(dot.contains("\"a\" -> \"c\" [style=dashed"));
}

#[test]
fn test_connect_rejects_query_to_query() {
    let mut graph = LineageGraph::new();
    graph.upsert_query(QueryNode::from_record(&record("SELECT 1", 1.0)));
    graph.upsert_query(QueryNode::from_record(&record("SELECT 2", 1.0)));
    let ids: Vec<String> = graph.queries().map(|q| q.id.to_string()).collect();
    assert!(graph.connect(&ids[0], &ids[1], Vec::new()).is_err());
    assert!(graph.connect(&ids[0], "missing", Vec::new()).is_err());
}
