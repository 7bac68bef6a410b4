//! Configuration types for mess-lint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::options::CacheStrategy;

/// Rule sets enabled when the configuration names none.
pub const DEFAULT_RULE_SETS: &[&str] = &["naming", "design"];

/// Top-level configuration, read from `mess-lint.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Report violations even where suppression annotations say otherwise.
    #[serde(default)]
    pub strict: bool,

    /// Rule sets to run (e.g., `["naming", "design"]`). Empty means the defaults.
    #[serde(default)]
    pub rulesets: Vec<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Result cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-rule configurations, keyed by rule name (e.g., `ShortMethodName`).
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns the configured rule set names, or the defaults.
    #[must_use]
    pub fn rule_set_names(&self) -> Vec<String> {
        if self.rulesets.is_empty() {
            DEFAULT_RULE_SETS.iter().map(|s| (*s).to_string()).collect()
        } else {
            self.rulesets.clone()
        }
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the options for a rule, if configured.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File extensions to analyze.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Abort instead of skipping files that fail to parse.
    #[serde(default)]
    pub fail_on_parse_error: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            extensions: default_extensions(),
            respect_gitignore: true,
            parallelism: None,
            fail_on_parse_error: false,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the result cache is used.
    #[serde(default)]
    pub enabled: bool,

    /// Cache file location (default: `.mess-lint.cache.json` in the working directory).
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Change detection strategy.
    #[serde(default)]
    pub strategy: CacheStrategy,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec!["**/vendor/**".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string array option.
    ///
    /// A single comma-separated string is accepted as well.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        match self.options.get(key)? {
            toml::Value::Array(arr) => Some(
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            toml::Value::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(!config.cache.enabled);
        assert!(config.rules.is_empty());
        assert_eq!(config.rule_set_names(), vec!["naming", "design"]);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
rulesets = ["naming"]

[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[cache]
enabled = true
strategy = "content"

[rules.ShortMethodName]
enabled = true
severity = "error"
minimum = 4
exceptions = "id,do"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.extensions, vec!["php"]);
        assert!(config.cache.enabled);
        assert_eq!(config.rule_set_names(), vec!["naming"]);
        assert!(config.is_rule_enabled("ShortMethodName"));
        assert_eq!(
            config.rule_severity("ShortMethodName"),
            Some(crate::Severity::Error)
        );

        let rule_config = config.rule("ShortMethodName").expect("configured");
        assert_eq!(rule_config.get_int("minimum", 3), 4);
        assert_eq!(
            rule_config.get_str_array("exceptions"),
            Some(vec!["id".to_string(), "do".to_string()])
        );
    }

    #[test]
    fn test_partial_analyzer_table_keeps_default_excludes() {
        let config = Config::parse("[analyzer]\nparallelism = 1\n").expect("parse");
        assert_eq!(config.analyzer.parallelism, Some(1));
        assert_eq!(config.analyzer.exclude, AnalyzerConfig::default().exclude);

        let cleared = Config::parse("[analyzer]\nexclude = []\n").expect("parse");
        assert!(cleared.analyzer.exclude.is_empty());
    }

    #[test]
    fn test_disabled_rule() {
        let config = Config::parse("[rules.TooManyMethods]\nenabled = false\n").expect("parse");
        assert!(!config.is_rule_enabled("TooManyMethods"));
        assert!(config.is_rule_enabled("ShortMethodName"));
    }

    #[test]
    fn test_invalid_strategy_is_parse_error() {
        let err = Config::parse("[cache]\nstrategy = \"sometimes\"\n").expect_err("invalid");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
