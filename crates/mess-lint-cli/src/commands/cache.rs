//! Cache command implementation.

use anyhow::{Context, Result};
use mess_lint::cache::{CacheState, CacheStateStore};
use mess_lint::RunOptions;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;

/// Prints what the cache file holds.
pub fn info(source: &ConfigSource, cache_file: Option<&Path>) -> Result<()> {
    let path = cache_path(source, cache_file)?;
    print!("{}", describe(&path, CacheStateStore::load(&path).as_ref()));
    Ok(())
}

/// Deletes the cache file.
pub fn clear(source: &ConfigSource, cache_file: Option<&Path>) -> Result<()> {
    let path = cache_path(source, cache_file)?;
    let removed = CacheStateStore::clear(&path)
        .with_context(|| format!("Failed to remove {}", path.display()))?;
    if removed {
        println!("Removed {}", path.display());
    } else {
        println!("No cache file at {}", path.display());
    }
    Ok(())
}

/// The `--cache-file` flag, else the configured location.
fn cache_path(source: &ConfigSource, cache_file: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    if let Some(file) = cache_file {
        return Ok(cwd.join(file));
    }
    let config = source.load()?;
    Ok(RunOptions::from_config(&config, &cwd).cache_file().to_path_buf())
}

fn describe(path: &Path, state: Option<&CacheState>) -> String {
    let Some(state) = state else {
        return format!("No usable cache at {}\n", path.display());
    };
    format!(
        "Cache file:     {}\nFormat version: {}\nConfiguration:  {}\nFiles:          {}\nViolations:     {}\n",
        path.display(),
        state.version,
        state.fingerprint,
        state.len(),
        state.violation_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint::cache::{ConfigFingerprint, FileMetadata, FileRecord};
    use mess_lint::{Location, Severity, Violation};
    use tempfile::TempDir;

    fn state() -> CacheState {
        let violation = Violation::new(
            "ML001",
            "ShortMethodName",
            Severity::Warning,
            Location::new(PathBuf::from("src/Point.php"), 6, 21),
            "short",
        );
        CacheState::new(ConfigFingerprint::create(false, &[]))
            .with_record(
                "src/Point.php",
                FileRecord::new("sha256:00", vec![violation], FileMetadata::new()),
            )
            .with_record(
                "src/Line.php",
                FileRecord::new("sha256:01", Vec::new(), FileMetadata::new()),
            )
    }

    #[test]
    fn describes_a_loaded_state() {
        let text = describe(Path::new("/repo/.mess-lint.cache.json"), Some(&state()));
        assert!(text.starts_with("Cache file:     /repo/.mess-lint.cache.json\nFormat version: 1\n"));
        assert!(text.contains("Files:          2\n"));
        assert!(text.ends_with("Violations:     1\n"));
    }

    #[test]
    fn describes_a_missing_state() {
        assert_eq!(
            describe(Path::new("/repo/state.json"), None),
            "No usable cache at /repo/state.json\n"
        );
    }

    #[test]
    fn explicit_cache_file_wins_and_clear_removes_it() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("state.json");
        CacheStateStore::save(&path, &state()).expect("saved");

        let resolved = cache_path(&ConfigSource::Default, Some(&path)).expect("resolved");
        assert_eq!(resolved, path);

        clear(&ConfigSource::Default, Some(&path)).expect("cleared");
        assert!(!path.exists());
        clear(&ConfigSource::Default, Some(&path)).expect("nothing to clear");
    }

    #[test]
    fn configured_cache_file_is_used() {
        let tmp = TempDir::new().expect("temp dir");
        let config = tmp.path().join("mess-lint.toml");
        let cache = tmp.path().join("custom.cache.json");
        std::fs::write(&config, format!("[cache]\nfile = {:?}\n", cache.display().to_string()))
            .expect("write");

        let resolved = cache_path(&ConfigSource::Project(config), None).expect("resolved");
        assert_eq!(resolved, cache);
    }
}
