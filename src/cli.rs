use clap::{Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "prodlens")]
#[command(author, version, about = "Turn product pages into competitive profiles", long_about = None)]
#[command(after_help = r#"Examples:
  prodlens generate https://shop.example.com/p/drill           Full profile
  prodlens generate https://shop.example.com/p/drill --offline No generative calls
  prodlens extract ./saved-page.html --location https://...    Extraction only
  prodlens doctor                                              Check setup
"#)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a full product profile from a page
    #[command(after_help = r#"Examples:
  prodlens generate https://shop.example.com/p/drill
  prodlens generate https://shop.example.com/p/drill --json
  prodlens generate ./page.html --location https://shop.example.com/p/drill --embed
  prodlens generate https://shop.example.com/p/drill --offline --insights
"#)]
    Generate {
        /// Product page URL or saved HTML file
        target: String,

        /// Location of a saved page (used to identify the subject product)
        #[arg(long)]
        location: Option<String>,

        /// Skip the generative collaborator; use catalog and template only
        #[arg(long)]
        offline: bool,

        /// Output the profile as JSON
        #[arg(long)]
        json: bool,

        /// Output an embeddable HTML fragment
        #[arg(long, conflicts_with = "json")]
        embed: bool,

        /// Also print gap analysis
        #[arg(long)]
        insights: bool,
    },

    /// Extract the product record only (no competitors or narrative)
    Extract {
        /// Product page URL or saved HTML file
        target: String,

        /// Location of a saved page (used to identify the subject product)
        #[arg(long)]
        location: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the generative response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check generative provider and cache health
    Doctor,

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  prodlens completions bash > ~/.local/share/bash-completion/completions/prodlens
  prodlens completions zsh > ~/.zfunc/_prodlens
  prodlens completions fish > ~/.config/fish/completions/prodlens.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove every cached response
    Clear,
    /// Count fresh and stale entries
    Stats,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::parse_from([
            "prodlens",
            "generate",
            "https://x.test/p",
            "--offline",
            "--insights",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate { target, offline, insights, json, .. } => {
                assert_eq!(target, "https://x.test/p");
                assert!(offline);
                assert!(insights);
                assert!(!json);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_embed_conflicts_with_json() {
        assert!(Cli::try_parse_from(["prodlens", "generate", "u", "--json", "--embed"]).is_err());
    }
}
