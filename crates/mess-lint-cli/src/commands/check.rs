//! Check command implementation.

use anyhow::{Context, Result};
use mess_lint::{Analyzer, CacheStrategy, Config, LintResult, RunOptions, Verbosity};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Flags of `mess-lint check`.
#[derive(Debug, Clone)]
pub struct CheckArgs {
    /// Directory to analyze.
    pub path: PathBuf,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule set names replacing the configured ones.
    pub rulesets: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Force strict mode on.
    pub strict: bool,
    /// Cache override (`None` keeps the configured setting).
    pub cache: Option<bool>,
    /// Cache file override.
    pub cache_file: Option<PathBuf>,
    /// Change detection override.
    pub cache_strategy: Option<CacheStrategy>,
    /// Advisory output level.
    pub verbosity: Verbosity,
}

/// Runs the check command.
pub fn run(args: CheckArgs, source: &ConfigSource) -> Result<()> {
    let (root, result) = analyze(&args, source)?;

    super::output::print(&result, args.format, &root)?;

    // Exit with error code if there are errors
    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Resolves configuration and flags, then runs the analyzer.
///
/// Returns the analysis root along with the result.
pub fn analyze(args: &CheckArgs, source: &ConfigSource) -> Result<(PathBuf, LintResult)> {
    let mut config = source.load()?;
    if let Some(list) = &args.rulesets {
        config.rulesets = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
    }

    let cwd = std::env::current_dir()?;
    let options = run_options(args, &config, &cwd);
    let root = resolve_root(&args.path, &config);

    let mut builder = Analyzer::builder()
        .root(&root)
        .config(config)
        .options(options);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.clone());
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    Ok((analyzer.root().to_path_buf(), result))
}

fn run_options(args: &CheckArgs, config: &Config, cwd: &Path) -> RunOptions {
    let mut options = RunOptions::from_config(config, cwd)
        .with_strict(config.strict || args.strict)
        .with_verbosity(args.verbosity);
    if let Some(enabled) = args.cache {
        options = options.with_cache(enabled);
    }
    if let Some(file) = &args.cache_file {
        options = options.with_cache_file(cwd.join(file));
    }
    if let Some(strategy) = args.cache_strategy {
        options = options.with_cache_strategy(strategy);
    }
    options
}

/// A configured `[analyzer] root` is taken relative to the checked path.
fn resolve_root(path: &Path, config: &Config) -> PathBuf {
    if config.analyzer.root == Path::new(".") {
        path.to_path_buf()
    } else {
        path.join(&config.analyzer.root)
    }
}
