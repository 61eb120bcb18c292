//! SQL dialect abstraction

use sqlparser::dialect::{
    Dialect, GenericDialect as SqlParserGeneric, PostgreSqlDialect as SqlParserPostgres,
};
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn tokenizer_dialect(&self) -> &dyn Dialect;

    /// Tokenize SQL into raw sqlparser tokens
    fn tokenize(&self, sql: &str) -> SqlResult<Vec<Token>> {
        if sql.trim().is_empty() {
            return Err(SqlError::EmptySql);
        }
        Tokenizer::new(self.tokenizer_dialect(), sql)
            .tokenize()
            .map_err(|e| {
                let msg = e.to_string();
                // Extract line/column from error message (format: "... at Line: X, Column: Y")
                let (line, column) = parse_location_from_error(&msg);
                SqlError::TokenizeError {
                    message: msg,
                    line,
                    column,
                }
            })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Resolve a dialect from its configured name
pub fn dialect_from_name(name: &str) -> SqlResult<Box<dyn SqlDialect>> {
    match name.to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(Box::new(PostgresDialect::new())),
        "generic" => Ok(Box::new(GenericDialect::new())),
        _ => Err(SqlError::UnknownDialect(name.to_string())),
    }
}

/// Parse line and column from a sqlparser tokenizer error message.
///
/// `TokenizerError`'s `Display` renders the location as
/// "Line: N, Column: M", so we read it back from the message text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.find("Line: ") else {
        return (0, 0);
    };
    let line_start = line_idx + 6;
    let Some(comma_idx) = msg[line_start..].find(',') else {
        return (0, 0);
    };
    let Ok(line) = msg[line_start..line_start + comma_idx]
        .trim()
        .parse::<usize>()
    else {
        return (0, 0);
    };
    let Some(col_idx) = msg.find("Column: ") else {
        return (0, 0);
    };
    let col_start = col_idx + 8;
    let col_end = msg[col_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| col_start + i)
        .unwrap_or(msg.len());
    let Ok(column) = msg[col_start..col_end].trim().parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

/// PostgreSQL dialect (default: workloads come from `pg_stat_statements`)
pub struct PostgresDialect {
    dialect: SqlParserPostgres,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserPostgres {},
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for PostgresDialect {
    fn tokenizer_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// Vendor-neutral dialect
pub struct GenericDialect {
    dialect: SqlParserGeneric,
}

impl GenericDialect {
    /// Create a new generic dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserGeneric {},
        }
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for GenericDialect {
    fn tokenizer_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
