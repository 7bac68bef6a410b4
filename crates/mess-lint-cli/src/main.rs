//! mess-lint CLI tool.
//!
//! Usage:
//! ```bash
//! mess-lint check [OPTIONS] [PATH]
//! mess-lint list-rules
//! mess-lint init
//! mess-lint cache info|clear
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use mess_lint::{CacheStrategy, Verbosity};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Incremental, inheritance-aware code quality linter for PHP
#[derive(Parser)]
#[command(name = "mess-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MESS_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rule sets (comma-separated)
        #[arg(long)]
        rulesets: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Report violations even where they are suppressed
        #[arg(long)]
        strict: bool,

        /// Reuse results of unchanged files from the previous run
        #[arg(long, overrides_with = "no_cache")]
        cache: bool,

        /// Disable the result cache, even if the configuration enables it
        #[arg(long, overrides_with = "cache")]
        no_cache: bool,

        /// Cache file location
        #[arg(long)]
        cache_file: Option<PathBuf>,

        /// How the cache detects changed files
        #[arg(long)]
        cache_strategy: Option<CacheStrategyArg>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Inspect or remove the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show what the cache file holds
    Info {
        /// Cache file location
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },
    /// Delete the cache file
    Clear {
        /// Cache file location
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets with labels.
    Rich,
}

/// Change detection strategy flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CacheStrategyArg {
    /// Compare file contents.
    Content,
    /// Compare modification times.
    Timestamp,
}

impl From<CacheStrategyArg> for CacheStrategy {
    fn from(arg: CacheStrategyArg) -> Self {
        match arg {
            CacheStrategyArg::Content => Self::Content,
            CacheStrategyArg::Timestamp => Self::Timestamp,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let verbosity = Verbosity::from_occurrences(cli.verbose);

    match cli.command {
        Commands::Check {
            path,
            format,
            rulesets,
            exclude,
            strict,
            cache,
            no_cache,
            cache_file,
            cache_strategy,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let args = commands::check::CheckArgs {
                path,
                format,
                rulesets,
                exclude,
                strict,
                cache: cache_flag(cache, no_cache),
                cache_file,
                cache_strategy: cache_strategy.map(Into::into),
                verbosity,
            };
            commands::check::run(args, &source)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
        Commands::Cache { action } => {
            let source = config_resolver::resolve(std::path::Path::new("."), cli.config.as_deref());
            match action {
                CacheAction::Info { cache_file } => {
                    commands::cache::info(&source, cache_file.as_deref())
                }
                CacheAction::Clear { cache_file } => {
                    commands::cache::clear(&source, cache_file.as_deref())
                }
            }
        }
    }
}

/// `--cache` and `--no-cache` override the configuration; neither keeps it.
fn cache_flag(cache: bool, no_cache: bool) -> Option<bool> {
    match (cache, no_cache) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn last_cache_flag_wins() {
        let cli = Cli::try_parse_from(["mess-lint", "check", "--cache", "--no-cache"])
            .expect("valid arguments");
        let Commands::Check { cache, no_cache, .. } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(cache_flag(cache, no_cache), Some(false));
    }

    #[test]
    fn verbosity_is_counted() {
        let cli = Cli::try_parse_from(["mess-lint", "check", "-vv", "src"]).expect("valid arguments");
        assert_eq!(Verbosity::from_occurrences(cli.verbose), Verbosity::VeryVerbose);
    }
}
