//! LineageLens CLI - table lineage and workload statistics from pg_stat_statements

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{analyze, extract, inspect};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Analyze(args) => analyze::execute(args, &cli.global).await,
        cli::Commands::Extract(args) => extract::execute(args, &cli.global).await,
        cli::Commands::Inspect(args) => inspect::execute(args, &cli.global).await,
    }
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warn.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
