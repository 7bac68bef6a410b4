//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# mess-lint configuration

# Rule sets to run (default: naming, design)
rulesets = ["naming", "design"]

# Report violations even where @SuppressWarnings says otherwise
strict = false

[analyzer]
# Root directory to analyze, relative to the checked path
# root = "src"

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/var/cache/**",
]

# File extensions to analyze
extensions = ["php"]

# Respect .gitignore files
respect_gitignore = true

[cache]
# Reuse results of unchanged files from the previous run
enabled = false
# file = ".mess-lint.cache.json"
# "content" (default) or "timestamp"
strategy = "content"

# Rule configurations
# Each rule can be disabled and have its severity overridden

[rules.ShortMethodName]
minimum = 3
exceptions = ["id", "up"]

[rules.CamelCaseMethodName]
allow_underscore = false
allow_underscore_test = true

[rules.TooManyMethods]
# severity = "error"
max_methods = 25
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("mess-lint.toml"), force)?;

    println!("Created mess-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit mess-lint.toml to configure rules");
    println!("  2. Run: mess-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint::rules::rule_sets_from_config;
    use mess_lint::{CacheStrategy, Config};
    use tempfile::TempDir;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).expect("valid config");
        assert_eq!(config.rule_set_names(), vec!["naming", "design"]);
        assert_eq!(config.cache.strategy, CacheStrategy::Content);
        assert!(!config.cache.enabled);

        let sets = rule_sets_from_config(&config).expect("known rule sets");
        assert_eq!(sets.iter().map(|s| s.len()).sum::<usize>(), 3);
    }

    #[test]
    fn template_only_names_known_rules() {
        let table: toml::Table = toml::from_str(DEFAULT_CONFIG).expect("valid toml");
        let rules = table["rules"].as_table().expect("rules table");
        for name in rules.keys() {
            assert!(
                mess_lint::rules::rule_set_of(name).is_some(),
                "unknown rule {name}"
            );
        }
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("mess-lint.toml");
        std::fs::write(&path, "strict = true\n").expect("write");

        let err = write_config(&path, false).expect_err("existing file");
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "strict = true\n");

        write_config(&path, true).expect("forced");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), DEFAULT_CONFIG);
    }
}
