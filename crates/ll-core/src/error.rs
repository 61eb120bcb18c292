//! Error types for ll-core

use thiserror::Error;

/// Core error type for LineageLens
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Config YAML parse error
    #[error("[E003] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E004: IO error
    #[error("[E004] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E005: IO error with file path context
    #[error("[E005] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E006: JSON serialization/deserialization error
    #[error("[E006] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// E007: CSV read/write error
    #[error("[E007] CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// E008: A graph export references something the importer cannot rebuild
    #[error("[E008] Invalid lineage export: {message}")]
    InvalidExport { message: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Column metadata lookup failures.
///
/// These never escape a graph build: the enricher logs them and falls back to
/// an empty column list.
#[derive(Error, Debug)]
pub enum LookupError {
    /// L001: The catalog has no such table
    #[error("[L001] Table not found in catalog: {0}")]
    TableNotFound(String),

    /// L002: The catalog could not be queried
    #[error("[L002] Catalog lookup failed: {0}")]
    Catalog(String),
}
