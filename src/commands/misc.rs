//! Miscellaneous commands: cache, config, doctor, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

use prodlens::agent::{self, generator_from_config};
use prodlens::cache::{ResponseCache, SqliteCache};
use prodlens::cli::{Cli, CompletionShell};
use prodlens::competitors::StaticCatalog;
use prodlens::config::{AiProvider, Config};
use prodlens::error::Result;

fn open_cache(config: &Config) -> Result<SqliteCache> {
    let ttl = chrono::Duration::hours(config.cache.ttl_hours as i64);
    SqliteCache::open(&config.cache_db_path()?, ttl)
}

/// Remove every cached response
pub fn cmd_cache_clear() -> Result<()> {
    let config = Config::load()?;
    let cache = open_cache(&config)?;
    let before = cache.stats()?;
    cache.clear()?;
    println!(
        "{} Cleared {} cached responses",
        "✓".green(),
        before.fresh + before.stale
    );
    Ok(())
}

/// Count fresh and stale entries
pub fn cmd_cache_stats() -> Result<()> {
    let config = Config::load()?;
    let cache = open_cache(&config)?;
    let stats = cache.stats()?;

    println!("\nCache: {}", config.cache_db_path()?.display());
    println!("  Fresh entries: {}", stats.fresh);
    println!("  Stale entries: {}", stats.stale);
    println!("  Freshness window: {}h", config.cache.ttl_hours);
    if !config.cache.enabled {
        println!("  {}", "Caching is disabled in config".yellow());
    }
    println!();
    Ok(())
}

/// Print the effective configuration
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Print the config file path
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Check generative provider and cache health
pub fn cmd_doctor() -> Result<()> {
    println!("\nprodlens doctor\n");

    println!("  prodlens binary: v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(config) => {
            println!("  Config: {}", Config::config_path()?.display());
            config
        }
        Err(e) => {
            println!("  Config: ERROR - {}", e);
            Config::default()
        }
    };

    if !config.ai.enabled {
        println!("  Generative provider: disabled in config");
    } else {
        match config.ai.provider {
            AiProvider::Openai => {
                let key_set = std::env::var(&config.ai.api_key_env)
                    .map(|k| !k.trim().is_empty())
                    .unwrap_or(false);
                if key_set {
                    println!("  OpenAI: {} ({})", "ready".green(), config.ai.model);
                } else {
                    println!("  OpenAI: {} is not set", config.ai.api_key_env.yellow());
                }
            }
            AiProvider::ClaudeCli => match agent::claude_version() {
                Some(v) => println!("  Claude CLI: {} (installed)", v),
                None => println!("  Claude CLI: NOT INSTALLED"),
            },
        }
        let generator = generator_from_config(&config.ai);
        if !generator.is_available() {
            println!("  {}", "Narratives and competitors will use offline fallbacks".dimmed());
        }
    }

    if config.cache.enabled {
        match open_cache(&config).and_then(|c| c.stats()) {
            Ok(stats) => println!("  Cache: OK ({} fresh entries)", stats.fresh),
            Err(e) => println!("  Cache: ERROR - {}", e),
        }
    } else {
        println!("  Cache: disabled");
    }

    match config.catalog_path {
        Some(ref path) => match StaticCatalog::from_json_file(path) {
            Ok(catalog) => println!("  Catalog: {} ({} products)", path.display(), catalog.len()),
            Err(e) => println!("  Catalog: ERROR - {}", e),
        },
        None => println!("  Catalog: built-in ({} products)", StaticCatalog::builtin().len()),
    }

    println!();
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "prodlens", &mut io::stdout());
    Ok(())
}
