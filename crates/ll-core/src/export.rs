//! Lineage graph export and import
//!
//! The node-link JSON document is the interchange format: every node
//! attribute is a primitive, so table columns travel as a JSON-encoded string.
//! GraphML and DOT are write-only renderings for external tools.

use ll_sql::TableRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::enrich::ColumnInfo;
use crate::error::{CoreError, CoreResult};
use crate::graph::{EdgeKind, LineageGraph, LineageNode, QueryNode, TableNode};
use crate::query::{QueryId, QueryRecord};
use crate::summary::TableStats;

/// Output format for [`write_export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    GraphMl,
    Dot,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::GraphMl => "graphml",
            ExportFormat::Dot => "dot",
        }
    }
}

/// Outcome of [`write_export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Written,
    /// Nothing to export; no file was written
    EmptyGraph,
}

/// Node-link graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub directed: bool,
    pub nodes: Vec<ExportNode>,
    pub links: Vec<ExportLink>,
}

/// One node of a [`GraphExport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportNode {
    Query {
        id: String,
        text: String,
        calls: i64,
        total_time: f64,
        mean_time: f64,
        rows: i64,
        #[serde(default)]
        io_time: f64,
    },
    Table {
        id: String,
        schema: String,
        display_name: String,
        /// JSON-encoded list of columns
        #[serde(default)]
        columns: String,
    },
}

/// One edge of a [`GraphExport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLink {
    pub source: String,
    pub target: String,
    /// Comma-separated mediating query ids of a table-to-table edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_query: Option<String>,
}

impl GraphExport {
    /// Flatten a graph into a node-link document
    pub fn from_graph(graph: &LineageGraph) -> CoreResult<Self> {
        let mut nodes = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            nodes.push(match node {
                LineageNode::Query(q) => ExportNode::Query {
                    id: q.id.to_string(),
                    text: q.text.clone(),
                    calls: q.calls,
                    total_time: q.total_time,
                    mean_time: q.mean_time,
                    rows: q.rows,
                    io_time: q.io_time,
                },
                LineageNode::Table(t) => ExportNode::Table {
                    id: t.key().to_string(),
                    schema: t.schema.clone(),
                    display_name: t.display_name.clone(),
                    columns: serde_json::to_string(&t.columns)?,
                },
            });
        }

        let links = graph
            .edges()
            .map(|(source, target, kind)| ExportLink {
                source: source.to_string(),
                target: target.to_string(),
                via_query: match kind {
                    EdgeKind::Derived { via_queries } => Some(
                        via_queries
                            .iter()
                            .map(QueryId::as_str)
                            .collect::<Vec<_>>()
                            .join(","),
                    ),
                    EdgeKind::Reads | EdgeKind::Writes => None,
                },
            })
            .collect();

        Ok(Self {
            directed: true,
            nodes,
            links,
        })
    }

    /// Rebuild a graph, decoding column lists
    pub fn to_graph(&self) -> CoreResult<LineageGraph> {
        if !self.directed {
            return Err(CoreError::InvalidExport {
                message: "lineage graphs are directed".to_string(),
            });
        }

        let mut graph = LineageGraph::new();
        for node in &self.nodes {
            match node {
                ExportNode::Query {
                    id,
                    text,
                    calls,
                    total_time,
                    mean_time,
                    rows,
                    io_time,
                } => {
                    graph.upsert_query(QueryNode {
                        id: QueryId::from_existing(id.as_str()),
                        text: text.clone(),
                        calls: *calls,
                        total_time: *total_time,
                        mean_time: *mean_time,
                        rows: *rows,
                        io_time: *io_time,
                    });
                }
                ExportNode::Table {
                    id,
                    schema,
                    display_name,
                    columns,
                } => {
                    if id.is_empty() {
                        return Err(CoreError::InvalidExport {
                            message: "table node without id".to_string(),
                        });
                    }
                    graph.insert_table(TableNode {
                        table: TableRef::new(id.as_str()),
                        schema: schema.clone(),
                        display_name: display_name.clone(),
                        columns: decode_columns(columns)?,
                    });
                }
            }
        }

        for link in &self.links {
            let via = link
                .via_query
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(QueryId::from_existing)
                .collect();
            graph.connect(&link.source, &link.target, via)?;
        }

        Ok(graph)
    }

    pub fn to_json_string(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn decode_columns(encoded: &str) -> CoreResult<Vec<ColumnInfo>> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(encoded)?)
}

/// Render a graph as GraphML
pub fn to_graphml(graph: &LineageGraph) -> CoreResult<String> {
    const KEYS: &[(&str, &str, &str)] = &[
        ("type", "node", "string"),
        ("text", "node", "string"),
        ("calls", "node", "long"),
        ("total_time", "node", "double"),
        ("mean_time", "node", "double"),
        ("rows", "node", "long"),
        ("io_time", "node", "double"),
        ("schema", "node", "string"),
        ("display_name", "node", "string"),
        ("columns", "node", "string"),
        ("via_query", "edge", "string"),
    ];

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n",
    );
    for (id, domain, ty) in KEYS {
        xml.push_str(&format!(
            "  <key id=\"{id}\" for=\"{domain}\" attr.name=\"{id}\" attr.type=\"{ty}\"/>\n"
        ));
    }
    xml.push_str("  <graph id=\"lineage\" edgedefault=\"directed\">\n");

    for node in GraphExport::from_graph(graph)?.nodes {
        let (id, data) = match node {
            ExportNode::Query {
                id,
                text,
                calls,
                total_time,
                mean_time,
                rows,
                io_time,
            } => (
                id,
                vec![
                    ("type", "query".to_string()),
                    ("text", text),
                    ("calls", calls.to_string()),
                    ("total_time", total_time.to_string()),
                    ("mean_time", mean_time.to_string()),
                    ("rows", rows.to_string()),
                    ("io_time", io_time.to_string()),
                ],
            ),
            ExportNode::Table {
                id,
                schema,
                display_name,
                columns,
            } => (
                id,
                vec![
                    ("type", "table".to_string()),
                    ("schema", schema),
                    ("display_name", display_name),
                    ("columns", columns),
                ],
            ),
        };
        xml.push_str(&format!("    <node id=\"{}\">\n", xml_escape(&id)));
        for (key, value) in data {
            xml.push_str(&format!(
                "      <data key=\"{}\">{}</data>\n",
                key,
                xml_escape(&value)
            ));
        }
        xml.push_str("    </node>\n");
    }

    for (source, target, kind) in graph.edges() {
        let open = format!(
            "    <edge source=\"{}\" target=\"{}\"",
            xml_escape(source),
            xml_escape(target)
        );
        match kind {
            EdgeKind::Derived { via_queries } => {
                let via: Vec<&str> = via_queries.iter().map(QueryId::as_str).collect();
                xml.push_str(&format!(
                    "{}>\n      <data key=\"via_query\">{}</data>\n    </edge>\n",
                    open,
                    xml_escape(&via.join(","))
                ));
            }
            EdgeKind::Reads | EdgeKind::Writes => {
                xml.push_str(&open);
                xml.push_str("/>\n");
            }
        }
    }

    xml.push_str("  </graph>\n</graphml>\n");
    Ok(xml)
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Write a graph to `path` in the given format.
///
/// An empty graph is not written and reports [`ExportStatus::EmptyGraph`].
pub fn write_export(
    graph: &LineageGraph,
    path: &Path,
    format: ExportFormat,
) -> CoreResult<ExportStatus> {
    if graph.is_empty() {
        log::warn!("No lineage graph to export");
        return Ok(ExportStatus::EmptyGraph);
    }

    let content = match format {
        ExportFormat::Json => GraphExport::from_graph(graph)?.to_json_string()?,
        ExportFormat::GraphMl => to_graphml(graph)?,
        ExportFormat::Dot => graph.to_dot(),
    };
    write_file(path, &content)?;
    log::info!("Lineage graph exported to {}", path.display());
    Ok(ExportStatus::Written)
}

/// Read a node-link JSON export back into a graph
pub fn read_export(path: &Path) -> CoreResult<LineageGraph> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    GraphExport::from_json_str(&content)?.to_graph()
}

fn write_file(path: &Path, content: &str) -> CoreResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, content).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

fn ensure_parent(path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[derive(Serialize)]
struct QueryCsvRow<'a> {
    query_id: String,
    query: &'a str,
    calls: i64,
    total_time: f64,
    mean_time: f64,
    rows: i64,
    io_time: f64,
    time_per_row: f64,
    io_percentage: f64,
    shared_blks_hit: i64,
    shared_blks_read: i64,
    temp_blks_written: i64,
}

/// Write the analyzed workload with derived per-query metrics
pub fn write_queries_csv(records: &[QueryRecord], path: &Path) -> CoreResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for r in records {
        writer.serialize(QueryCsvRow {
            query_id: r.id().to_string(),
            query: &r.query,
            calls: r.calls,
            total_time: r.total_time,
            mean_time: r.mean_time,
            rows: r.rows,
            io_time: r.io_time,
            time_per_row: r.time_per_row(),
            io_percentage: r.io_percentage(),
            shared_blks_hit: r.shared_blks_hit,
            shared_blks_read: r.shared_blks_read,
            temp_blks_written: r.temp_blks_written,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct TableStatsCsvRow<'a> {
    table_name: &'a str,
    schema: &'a str,
    display_name: &'a str,
    read_queries: usize,
    write_queries: usize,
    total_queries: usize,
    total_read_time: f64,
    total_write_time: f64,
    total_time: f64,
    columns: String,
}

/// Write per-table statistics; columns are JSON-encoded in one cell
pub fn write_table_stats_csv(stats: &[TableStats], path: &Path) -> CoreResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for s in stats {
        writer.serialize(TableStatsCsvRow {
            table_name: &s.table_name,
            schema: &s.schema,
            display_name: &s.display_name,
            read_queries: s.read_queries,
            write_queries: s.write_queries,
            total_queries: s.total_queries,
            total_read_time: s.total_read_time,
            total_write_time: s.total_write_time,
            total_time: s.total_time,
            columns: serde_json::to_string(&s.columns)?,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
