//! Source and destination table extraction from SQL text
//!
//! A best-effort lexical heuristic, not a relational parser: it tolerates
//! malformed or partially tokenizable SQL and returns whatever it can find.
//! Two tiers cooperate: a scan over the grouped [`TokenStream`] finds tables
//! after `FROM`, `JOIN`, `INTO` and `UPDATE`; a regex pass recovers the
//! destination of a `CREATE TABLE … AS SELECT` or embedded `INSERT INTO`
//! that a SELECT-classified statement would otherwise lose.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::dialect::{dialect_from_name, PostgresDialect, SqlDialect};
use crate::error::SqlResult;
use crate::table_ref::TableRef;
use crate::tokens::{SqlToken, StatementKind, TokenStream};

/// Tables read and written by one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableDependencies {
    /// Tables the query reads from
    pub sources: Vec<TableRef>,
    /// Tables the query writes to
    pub destinations: Vec<TableRef>,
}

impl TableDependencies {
    /// True when neither sources nor destinations were found
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.destinations.is_empty()
    }
}

/// Extract tables using the default PostgreSQL dialect.
pub fn extract_tables(sql: &str) -> TableDependencies {
    TableExtractor::postgres().extract(sql)
}

/// Table extractor bound to a tokenizer dialect
pub struct TableExtractor {
    dialect: Box<dyn SqlDialect>,
}

impl TableExtractor {
    /// Create an extractor for a dialect
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self { dialect }
    }

    /// Create an extractor with the PostgreSQL dialect
    pub fn postgres() -> Self {
        Self::new(Box::new(PostgresDialect::new()))
    }

    /// Create an extractor from a dialect name
    pub fn from_dialect_name(name: &str) -> SqlResult<Self> {
        Ok(Self::new(dialect_from_name(name)?))
    }

    /// Get the dialect name
    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }

    /// Extract source and destination tables. Never fails: unrecognized or
    /// untokenizable text yields an empty result.
    pub fn extract(&self, sql: &str) -> TableDependencies {
        let text = sql.trim().to_lowercase();
        if text.is_empty() {
            return TableDependencies::default();
        }

        let stream = match TokenStream::tokenize(&text, self.dialect.as_ref()) {
            Ok(stream) => stream,
            Err(e) => {
                log::debug!("Skipping table extraction: {e}");
                return TableDependencies::default();
            }
        };

        let mut raw = RawTables::default();
        match stream.statement_kind() {
            StatementKind::Select => {
                collect_embedded_destinations(&text, &mut raw.destinations);
                collect_select_sources(&stream, &mut raw.sources);
            }
            StatementKind::Insert => {
                collect_insert_destination(&stream, &mut raw.destinations);
                collect_insert_sources(&stream, &mut raw.sources);
            }
            StatementKind::Update => {
                collect_update_destination(&stream, &mut raw.destinations);
                collect_from_sources(stream.tokens(), &mut raw.sources);
            }
            StatementKind::Other => return TableDependencies::default(),
        }

        raw.finish()
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::postgres()
    }
}

/// Raw names as they appeared in the token stream, before normalization.
#[derive(Default)]
struct RawTables {
    sources: Vec<String>,
    destinations: Vec<String>,
}

impl RawTables {
    /// Normalize, drop empties and duplicates, and remove destinations from
    /// the source list.
    fn finish(self) -> TableDependencies {
        let destinations = normalize_all(&self.destinations);
        let sources = normalize_all(&self.sources)
            .into_iter()
            .filter(|t| !destinations.contains(t))
            .collect();
        TableDependencies {
            sources,
            destinations,
        }
    }
}

fn normalize_all(raw: &[String]) -> Vec<TableRef> {
    let mut out: Vec<TableRef> = Vec::new();
    for table in raw.iter().filter_map(|r| TableRef::from_raw(r)) {
        if !out.contains(&table) {
            out.push(table);
        }
    }
    out
}

fn create_table_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"create\s+table\s+(?:if\s+not\s+exists\s+)?(\w+(?:\.\w+)?)")
            .expect("valid regex")
    })
}

fn insert_into_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"insert\s+into\s+(\w+(?:\.\w+)?)").expect("valid regex"))
}

/// Regex tier: destinations of DDL or INSERT wrapped around a SELECT.
fn collect_embedded_destinations(text: &str, destinations: &mut Vec<String>) {
    for pattern in [create_table_pattern(), insert_into_pattern()] {
        if let Some(name) = pattern.captures(text).and_then(|c| c.get(1)) {
            destinations.push(name.as_str().to_string());
        }
    }
}

fn push_identifiers(token: &SqlToken, out: &mut Vec<String>) {
    match token {
        SqlToken::IdentifierList(items) => out.extend(items.iter().cloned()),
        SqlToken::Identifier(name) => out.push(name.clone()),
        _ => {}
    }
}

/// Token tier for SELECT: identifiers after `FROM` (lists included) and the
/// single identifier after each `JOIN` variant. A comma list directly after
/// a JOIN keyword is not expanded.
fn collect_select_sources(stream: &TokenStream, sources: &mut Vec<String>) {
    let mut from_seen = false;
    let mut join_seen = false;

    for token in stream {
        if token.is_keyword("FROM") {
            from_seen = true;
            continue;
        }
        if from_seen && !token.is_whitespace() {
            push_identifiers(token, sources);
            from_seen = false;
        }

        if token.is_join_keyword() {
            join_seen = true;
            continue;
        }
        if join_seen && !token.is_whitespace() {
            if let SqlToken::Identifier(name) = token {
                sources.push(name.clone());
            }
            join_seen = false;
        }
    }
}

/// The identifier immediately after `INTO`.
fn collect_insert_destination(stream: &TokenStream, destinations: &mut Vec<String>) {
    let mut tokens = stream.iter().skip_while(|t| !t.is_keyword("INTO")).skip(1);
    if let Some(SqlToken::Identifier(name)) = tokens.find(|t| !t.is_whitespace()) {
        destinations.push(name.clone());
    }
}

/// For `INSERT … SELECT`, identifiers after each `FROM` following the SELECT.
fn collect_insert_sources(stream: &TokenStream, sources: &mut Vec<String>) {
    let Some(select_at) = stream.iter().position(|t| t.is_keyword("SELECT")) else {
        return;
    };
    collect_from_sources(&stream.tokens()[select_at..], sources);
}

/// The first identifier after `UPDATE`.
fn collect_update_destination(stream: &TokenStream, destinations: &mut Vec<String>) {
    let mut tokens = stream.iter().skip_while(|t| !t.is_keyword("UPDATE")).skip(1);
    if let Some(SqlToken::Identifier(name)) = tokens.find(|t| !t.is_whitespace()) {
        destinations.push(name.clone());
    }
}

/// Identifiers (or identifier lists) immediately after each `FROM`.
fn collect_from_sources(tokens: &[SqlToken], sources: &mut Vec<String>) {
    let mut from_seen = false;
    for token in tokens {
        if token.is_keyword("FROM") {
            from_seen = true;
            continue;
        }
        if from_seen && !token.is_whitespace() {
            push_identifiers(token, sources);
            from_seen = false;
        }
    }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
