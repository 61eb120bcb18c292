//! `lineagelens extract` command: tables read and written by one statement

use anyhow::{Context, Result};
use ll_sql::{TableDependencies, TableExtractor};
use std::io::Read;

use crate::cli::{ExtractArgs, ExtractOutput, GlobalArgs};
use crate::commands::common::load_config;

/// Execute the extract command
pub async fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let (_, config) = load_config(global)?;
    let extractor = TableExtractor::from_dialect_name(&config.dialect.to_string())
        .context("Invalid SQL dialect")?;

    let sql = match &args.sql {
        Some(sql) => sql.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read SQL from stdin")?;
            buf
        }
    };

    let deps = extractor.extract(&sql);
    match args.output {
        ExtractOutput::Json => println!("{}", serde_json::to_string_pretty(&deps)?),
        ExtractOutput::Table => print!("{}", render_dependencies(&deps)),
    }
    Ok(())
}

fn render_dependencies(deps: &TableDependencies) -> String {
    if deps.is_empty() {
        return "No tables found.\n".to_string();
    }

    let mut out = String::new();
    for (label, tables) in [("Sources", &deps.sources), ("Destinations", &deps.destinations)] {
        out.push_str(&format!("{}:\n", label));
        if tables.is_empty() {
            out.push_str("  (none)\n");
        }
        for table in tables {
            out.push_str(&format!("  {} ({})\n", table, table.qualified()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ll_sql::extract_tables;

    #[test]
    fn test_render_dependencies() {
        let text = render_dependencies(&extract_tables("INSERT INTO t SELECT * FROM sales.s"));
        assert_eq!(
            text,
            "Sources:\n  sales.s (sales.s)\nDestinations:\n  t (public.t)\n"
        );
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(render_dependencies(&extract_tables("BEGIN")), "No tables found.\n");
    }

    #[test]
    fn test_render_missing_side() {
        let text = render_dependencies(&extract_tables("SELECT * FROM a"));
        assert!(text.contains("Destinations:\n  (none)\n"));
    }
}
