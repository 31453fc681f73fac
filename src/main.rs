//! prodlens - product page extraction and competitive profiling CLI

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prodlens::cli::{CacheCommands, Cli, Commands, ConfigCommands};
use prodlens::error::Result;

mod commands;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; `PRODLENS_LOG` wins over `-v`
fn init_logging(verbose: bool) {
    let default = if verbose { "prodlens=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("PRODLENS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            target,
            location,
            offline,
            json,
            embed,
            insights,
        } => commands::cmd_generate(&target, location, offline, json, embed, insights),
        Commands::Extract { target, location, json } => {
            commands::cmd_extract(&target, location, json)
        }

        Commands::Cache(CacheCommands::Clear) => commands::cmd_cache_clear(),
        Commands::Cache(CacheCommands::Stats) => commands::cmd_cache_stats(),
        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),

        Commands::Doctor => commands::cmd_doctor(),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
