//! ll-sql - SQL layer for LineageLens
//!
//! This crate turns raw query text into a grouped token stream using
//! sqlparser's tokenizer, classifies the statement, and extracts the tables
//! it reads and writes with alias and quote normalization.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod normalize;
pub mod table_ref;
pub mod tokens;

pub use dialect::{dialect_from_name, GenericDialect, PostgresDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{extract_tables, TableDependencies, TableExtractor};
pub use normalize::normalize_table_name;
pub use table_ref::{TableRef, DEFAULT_SCHEMA};
pub use tokens::{SqlToken, StatementKind, TokenStream};
