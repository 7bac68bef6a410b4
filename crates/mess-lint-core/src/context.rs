//! Context types for rule execution.

use std::path::{Path, PathBuf};

use crate::ast::Span;
use crate::types::Location;

/// Context provided to rules for one source file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Path relative to the analysis root.
    pub relative_path: PathBuf,
    /// Whether this file looks like a test (`tests/` directory or `*Test.php`).
    pub is_test: bool,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        Self {
            path,
            is_test: Self::detect_test_file(&relative_path),
            relative_path,
        }
    }

    /// Builds a location in this file from a parsed span.
    #[must_use]
    pub fn location(&self, span: &Span) -> Location {
        Location::from_span(self.relative_path.clone(), span)
    }

    fn detect_test_file(path: &Path) -> bool {
        let in_test_dir = path.components().any(|c| {
            matches!(c, std::path::Component::Normal(s) if s == "tests" || s == "test")
        });
        in_test_dir
            || path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.ends_with("Test"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_is_stripped_from_root() {
        let ctx = FileContext::new(Path::new("/repo/src/User.php"), Path::new("/repo"));
        assert_eq!(ctx.relative_path, PathBuf::from("src/User.php"));
        assert!(!ctx.is_test);
    }

    #[test]
    fn detects_test_files() {
        let root = Path::new("/repo");
        assert!(FileContext::new(Path::new("/repo/tests/Unit/FooTest.php"), root).is_test);
        assert!(FileContext::new(Path::new("/repo/src/UserTest.php"), root).is_test);
        assert!(!FileContext::new(Path::new("/repo/src/Testing.php"), root).is_test);
    }

    #[test]
    fn location_uses_relative_path() {
        let ctx = FileContext::new(Path::new("/repo/src/A.php"), Path::new("/repo"));
        let loc = ctx.location(&Span::lines(3, 3));
        assert_eq!(loc.file, PathBuf::from("src/A.php"));
        assert_eq!(loc.line, 3);
    }
}
