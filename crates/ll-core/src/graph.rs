//! Lineage graph over queries and tables
//!
//! Queries and tables are both nodes. A table feeds the queries that read it
//! (`table -> query`), a query feeds the tables it writes (`query -> table`),
//! and after all records are added every query with table inputs and outputs
//! contributes a derived `table -> table` edge per input/output pair.

use ll_sql::{TableExtractor, TableRef};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::enrich::{ColumnInfo, ColumnLookup, TableEnricher};
use crate::error::{CoreError, CoreResult};
use crate::query::{truncate_chars, QueryId, QueryRecord};

/// Node kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Query,
    Table,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Query => write!(f, "query"),
            NodeType::Table => write!(f, "table"),
        }
    }
}

/// A query node: preview text plus the workload metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryNode {
    pub id: QueryId,
    /// Query text truncated for display
    pub text: String,
    pub calls: i64,
    pub total_time: f64,
    pub mean_time: f64,
    pub rows: i64,
    pub io_time: f64,
}

impl QueryNode {
    pub fn from_record(record: &QueryRecord) -> Self {
        Self {
            id: record.id(),
            text: record.preview(),
            calls: record.calls,
            total_time: record.total_time,
            mean_time: record.mean_time,
            rows: record.rows,
            io_time: record.io_time,
        }
    }
}

/// A table node with its column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableNode {
    pub table: TableRef,
    pub schema: String,
    pub display_name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableNode {
    pub fn new(table: TableRef, columns: Vec<ColumnInfo>) -> Self {
        Self {
            schema: table.schema().to_string(),
            display_name: table.name().to_string(),
            table,
            columns,
        }
    }

    pub fn key(&self) -> &str {
        self.table.key()
    }
}

/// Node weight
#[derive(Debug, Clone, PartialEq)]
pub enum LineageNode {
    Query(QueryNode),
    Table(TableNode),
}

impl LineageNode {
    /// Graph-wide unique key: the query id or the table key
    pub fn key(&self) -> &str {
        match self {
            LineageNode::Query(q) => q.id.as_str(),
            LineageNode::Table(t) => t.key(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            LineageNode::Query(_) => NodeType::Query,
            LineageNode::Table(_) => NodeType::Table,
        }
    }
}

/// Edge weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    /// `table -> query`
    Reads,
    /// `query -> table`
    Writes,
    /// `table -> table`, through the listed queries in first-seen order
    Derived { via_queries: Vec<QueryId> },
}

/// A derived table-to-table dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLineage {
    pub source: TableRef,
    pub target: TableRef,
    pub via_queries: Vec<QueryId>,
}

/// Directed lineage graph of queries and tables
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<LineageNode, EdgeKind>,
    node_map: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from workload records using the PostgreSQL extractor
    pub fn build(records: &[QueryRecord], lookup: &dyn ColumnLookup) -> Self {
        LineageGraphBuilder::new(lookup).build(records)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn query_count(&self) -> usize {
        self.queries().count()
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a table node by normalized key
    pub fn table(&self, key: &str) -> Option<&TableNode> {
        match self.node(key)? {
            LineageNode::Table(t) => Some(t),
            LineageNode::Query(_) => None,
        }
    }

    /// Look up a query node by id
    pub fn query(&self, id: &str) -> Option<&QueryNode> {
        match self.node(id)? {
            LineageNode::Query(q) => Some(q),
            LineageNode::Table(_) => None,
        }
    }

    /// Any node by key
    pub fn node(&self, key: &str) -> Option<&LineageNode> {
        self.node_map.get(key).map(|&idx| &self.graph[idx])
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &LineageNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Table nodes in insertion order
    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.nodes().filter_map(|node| match node {
            LineageNode::Table(t) => Some(t),
            LineageNode::Query(_) => None,
        })
    }

    /// Query nodes in insertion order
    pub fn queries(&self) -> impl Iterator<Item = &QueryNode> {
        self.nodes().filter_map(|node| match node {
            LineageNode::Query(q) => Some(q),
            LineageNode::Table(_) => None,
        })
    }

    /// All edges as `(source key, target key, kind)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeKind)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].key(),
                self.graph[e.target()].key(),
                e.weight(),
            )
        })
    }

    /// Queries that read `table`
    pub fn readers_of(&self, table: &str) -> Vec<&QueryNode> {
        self.query_neighbors(table, Direction::Outgoing)
    }

    /// Queries that write `table`
    pub fn writers_of(&self, table: &str) -> Vec<&QueryNode> {
        self.query_neighbors(table, Direction::Incoming)
    }

    /// Tables read by a query
    pub fn sources_of(&self, query_id: &str) -> Vec<&TableNode> {
        self.table_neighbors(query_id, Direction::Incoming)
    }

    /// Tables written by a query
    pub fn destinations_of(&self, query_id: &str) -> Vec<&TableNode> {
        self.table_neighbors(query_id, Direction::Outgoing)
    }

    /// Tables that `table` is derived from
    pub fn upstream_tables(&self, table: &str) -> Vec<&TableNode> {
        self.table_neighbors(table, Direction::Incoming)
    }

    /// Tables derived from `table`
    pub fn downstream_tables(&self, table: &str) -> Vec<&TableNode> {
        self.table_neighbors(table, Direction::Outgoing)
    }

    /// Derived table-to-table edges
    pub fn lineage_edges(&self) -> Vec<TableLineage> {
        self.graph
            .edge_references()
            .filter_map(|e| match (e.weight(), &self.graph[e.source()], &self.graph[e.target()]) {
                (
                    EdgeKind::Derived { via_queries },
                    LineageNode::Table(source),
                    LineageNode::Table(target),
                ) => Some(TableLineage {
                    source: source.table.clone(),
                    target: target.table.clone(),
                    via_queries: via_queries.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Edge endpoints as key pairs, for order-independent comparison
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.edges()
            .map(|(source, target, _)| (source.to_string(), target.to_string()))
            .collect()
    }

    /// Node keys, for order-independent comparison
    pub fn node_keys(&self) -> BTreeSet<String> {
        self.node_map.keys().cloned().collect()
    }

    /// Render the graph in Graphviz DOT format
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph lineage {\n  rankdir=LR;\n\n");

        for node in self.nodes() {
            let (shape, label) = match node {
                LineageNode::Query(q) => (
                    "box",
                    format!("{}\\n{}", q.id, dot_escape(&truncate_chars(&q.text, 30))),
                ),
                LineageNode::Table(t) => ("ellipse", dot_escape(t.key())),
            };
            dot.push_str(&format!(
                "  \"{}\" [shape={}, label=\"{}\"];\n",
                dot_escape(node.key()),
                shape,
                label
            ));
        }

        dot.push('\n');

        for (source, target, kind) in self.edges() {
            let attrs = match kind {
                EdgeKind::Derived { via_queries } => {
                    let via: Vec<&str> = via_queries.iter().map(QueryId::as_str).collect();
                    format!(" [style=dashed, label=\"{}\"]", via.join(", "))
                }
                _ => String::new(),
            };
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\"{};\n",
                dot_escape(source),
                dot_escape(target),
                attrs
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Insert or refresh a query node. A repeated id keeps the node and its
    /// edges but takes the newest metrics.
    pub(crate) fn upsert_query(&mut self, node: QueryNode) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(node.id.as_str()) {
            self.graph[idx] = LineageNode::Query(node);
            return idx;
        }
        let key = node.id.to_string();
        let idx = self.graph.add_node(LineageNode::Query(node));
        self.node_map.insert(key, idx);
        idx
    }

    /// Insert a table node unless one with the same key exists
    pub(crate) fn insert_table(&mut self, node: TableNode) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(node.key()) {
            return idx;
        }
        let key = node.key().to_string();
        let idx = self.graph.add_node(LineageNode::Table(node));
        self.node_map.insert(key, idx);
        idx
    }

    fn ensure_table(&mut self, table: &TableRef, enricher: &mut TableEnricher<'_>) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(table.key()) {
            return idx;
        }
        let columns = enricher.columns_for(table);
        self.insert_table(TableNode::new(table.clone(), columns))
    }

    /// Connect two existing nodes, inferring the edge kind from node types.
    pub(crate) fn connect(
        &mut self,
        source: &str,
        target: &str,
        via_queries: Vec<QueryId>,
    ) -> CoreResult<()> {
        let from = self.index_of(source)?;
        let to = self.index_of(target)?;
        let kind = match (self.graph[from].node_type(), self.graph[to].node_type()) {
            (NodeType::Table, NodeType::Query) => EdgeKind::Reads,
            (NodeType::Query, NodeType::Table) => EdgeKind::Writes,
            (NodeType::Table, NodeType::Table) => EdgeKind::Derived { via_queries },
            (NodeType::Query, NodeType::Query) => {
                return Err(CoreError::InvalidExport {
                    message: format!("edge between two queries: {} -> {}", source, target),
                })
            }
        };
        self.add_edge_once(from, to, kind);
        Ok(())
    }

    fn index_of(&self, key: &str) -> CoreResult<NodeIndex> {
        self.node_map
            .get(key)
            .copied()
            .ok_or_else(|| CoreError::InvalidExport {
                message: format!("edge references unknown node '{}'", key),
            })
    }

    fn add_edge_once(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) {
        let Some(edge) = self.graph.find_edge(from, to) else {
            self.graph.add_edge(from, to, kind);
            return;
        };
        if let (EdgeKind::Derived { via_queries: existing }, EdgeKind::Derived { via_queries }) =
            (&mut self.graph[edge], kind)
        {
            for id in via_queries {
                if !existing.contains(&id) {
                    existing.push(id);
                }
            }
        }
    }

    /// Second build pass: one `table -> table` edge per input/output pair of
    /// every query.
    fn derive_table_edges(&mut self) {
        let query_nodes: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph[idx].node_type() == NodeType::Query)
            .collect();

        for q in query_nodes {
            let id = QueryId::from_existing(self.graph[q].key());
            let inputs = self.sorted_neighbors(q, Direction::Incoming, NodeType::Table);
            let outputs = self.sorted_neighbors(q, Direction::Outgoing, NodeType::Table);
            for &source in &inputs {
                for &target in &outputs {
                    if source != target {
                        self.add_edge_once(
                            source,
                            target,
                            EdgeKind::Derived {
                                via_queries: vec![id.clone()],
                            },
                        );
                    }
                }
            }
        }
    }

    fn sorted_neighbors(&self, idx: NodeIndex, dir: Direction, kind: NodeType) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, dir)
            .filter(|&n| self.graph[n].node_type() == kind)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn query_neighbors(&self, key: &str, dir: Direction) -> Vec<&QueryNode> {
        let Some(&idx) = self.node_map.get(key) else {
            return Vec::new();
        };
        self.sorted_neighbors(idx, dir, NodeType::Query)
            .into_iter()
            .filter_map(|n| match &self.graph[n] {
                LineageNode::Query(q) => Some(q),
                LineageNode::Table(_) => None,
            })
            .collect()
    }

    fn table_neighbors(&self, key: &str, dir: Direction) -> Vec<&TableNode> {
        let Some(&idx) = self.node_map.get(key) else {
            return Vec::new();
        };
        self.sorted_neighbors(idx, dir, NodeType::Table)
            .into_iter()
            .filter_map(|n| match &self.graph[n] {
                LineageNode::Table(t) => Some(t),
                LineageNode::Query(_) => None,
            })
            .collect()
    }
}

/// Builds a [`LineageGraph`] from workload records
pub struct LineageGraphBuilder<'a> {
    extractor: TableExtractor,
    enricher: TableEnricher<'a>,
}

impl<'a> LineageGraphBuilder<'a> {
    /// Builder with the PostgreSQL extractor
    pub fn new(lookup: &'a dyn ColumnLookup) -> Self {
        Self::with_extractor(TableExtractor::postgres(), lookup)
    }

    pub fn with_extractor(extractor: TableExtractor, lookup: &'a dyn ColumnLookup) -> Self {
        Self {
            extractor,
            enricher: TableEnricher::new(lookup),
        }
    }

    /// Build the graph. Records whose text yields no tables still get a
    /// query node.
    pub fn build(mut self, records: &[QueryRecord]) -> LineageGraph {
        let mut graph = LineageGraph::new();

        for record in records {
            let deps = self.extractor.extract(&record.query);
            if deps.is_empty() {
                log::debug!("No tables found in query: {}", record.preview());
            }

            let q = graph.upsert_query(QueryNode::from_record(record));
            for source in &deps.sources {
                let t = graph.ensure_table(source, &mut self.enricher);
                graph.add_edge_once(t, q, EdgeKind::Reads);
            }
            for destination in &deps.destinations {
                let t = graph.ensure_table(destination, &mut self.enricher);
                graph.add_edge_once(q, t, EdgeKind::Writes);
            }
        }

        graph.derive_table_edges();
        log::debug!(
            "Built lineage graph: {} queries, {} tables, {} edges, {} column lookups",
            graph.query_count(),
            graph.table_count(),
            graph.edge_count(),
            self.enricher.lookups_performed()
        );
        graph
    }
}

fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ")
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
