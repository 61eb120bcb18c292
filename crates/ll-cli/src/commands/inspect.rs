//! `lineagelens inspect` command: summarize an exported lineage graph

use anyhow::{Context, Result};
use ll_core::{read_export, summarize};
use std::path::Path;

use crate::cli::{GlobalArgs, InspectArgs, InspectOutput};
use crate::commands::common::{format_columns, print_lineage, print_table_stats};

/// Execute the inspect command
pub async fn execute(args: &InspectArgs, global: &GlobalArgs) -> Result<()> {
    let graph = read_export(Path::new(&args.path))
        .with_context(|| format!("Failed to read lineage export {}", args.path))?;
    if global.verbose {
        eprintln!(
            "[verbose] Loaded {} nodes and {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            args.path
        );
    }

    let stats = summarize(&graph);
    match args.output {
        InspectOutput::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        InspectOutput::Dot => print!("{}", graph.to_dot()),
        InspectOutput::Table => {
            print_table_stats(&stats);
            let described: Vec<_> = stats.iter().filter(|s| !s.columns.is_empty()).collect();
            if !described.is_empty() {
                println!("\nColumns:");
                for s in described {
                    println!("  {}: {}", s.table_name, format_columns(&s.columns));
                }
            }
            println!();
            print_lineage(&graph);
        }
    }
    Ok(())
}
