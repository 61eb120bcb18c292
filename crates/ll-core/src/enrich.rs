//! Column metadata for table nodes
//!
//! A [`ColumnLookup`] is whatever can describe a table's columns: a live
//! catalog, a snapshot database, or nothing at all. [`TableEnricher`] sits in
//! front of it during a graph build so each table is looked up once.

use ll_sql::TableRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::LookupError;

/// Column metadata attached to a table node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub not_null: bool,

    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            is_primary_key: false,
        }
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark the column as part of the primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.not_null = true;
        self
    }
}

/// Source of column metadata
pub trait ColumnLookup {
    /// Columns of `table` in ordinal order
    fn lookup_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, LookupError>;
}

/// Lookup used when no catalog is available. Every table has no columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

impl ColumnLookup for NoCatalog {
    fn lookup_columns(&self, _table: &TableRef) -> Result<Vec<ColumnInfo>, LookupError> {
        Ok(Vec::new())
    }
}

/// Per-build memo over a [`ColumnLookup`].
///
/// Failures are logged and cached as an empty list; they are not retried.
pub struct TableEnricher<'a> {
    lookup: &'a dyn ColumnLookup,
    cache: HashMap<TableRef, Vec<ColumnInfo>>,
    lookups: usize,
}

impl<'a> TableEnricher<'a> {
    pub fn new(lookup: &'a dyn ColumnLookup) -> Self {
        Self {
            lookup,
            cache: HashMap::new(),
            lookups: 0,
        }
    }

    /// Columns for `table`, consulting the lookup on first request only
    pub fn columns_for(&mut self, table: &TableRef) -> Vec<ColumnInfo> {
        if let Some(columns) = self.cache.get(table) {
            return columns.clone();
        }

        self.lookups += 1;
        let columns = match self.lookup.lookup_columns(table) {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("Could not get columns for {}: {}", table, e);
                Vec::new()
            }
        };
        self.cache.insert(table.clone(), columns.clone());
        columns
    }

    /// Number of times the underlying lookup was consulted
    pub fn lookups_performed(&self) -> usize {
        self.lookups
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
