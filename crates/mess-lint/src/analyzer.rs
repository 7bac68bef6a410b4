//! Drives a lint run: discovery, extraction, cache-aware rule evaluation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;
use tracing::{debug, info, warn};

use mess_lint_cache::{relative_key, CacheEngineFactory, FileAnalysis, FileMetadata};
use mess_lint_core::ast::{Codebase, SourceUnit, TypeDecl};
use mess_lint_core::{
    Config, FileContext, HierarchyResolver, LintResult, OutputSink, RuleSet, RunOptions,
    SyntaxNode, TracingSink, TypeNode, Violation,
};
use mess_lint_php::{ExtractError, LanguageExtractor, PhpExtractor};
use mess_lint_rules::{rule_sets_from_config, UnknownRuleSet};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A source file failed to parse and `fail_on_parse_error` is set.
    #[error(transparent)]
    Parse(#[from] ExtractError),

    /// Invalid exclude pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk failed.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// The configuration names a rule set that doesn't exist.
    #[error(transparent)]
    RuleSet(#[from] UnknownRuleSet),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    options: Option<RunOptions>,
    config: Option<Config>,
    rule_sets: Vec<RuleSet>,
    exclude_patterns: Vec<String>,
    extractors: Vec<Box<dyn LanguageExtractor>>,
    sink: Option<Arc<dyn OutputSink>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the run options (strictness, cache settings, verbosity).
    ///
    /// Without this, options are taken from the configuration.
    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a rule set. Without any, the sets named in the configuration are used.
    #[must_use]
    pub fn rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_sets.push(rule_set);
        self
    }

    /// Adds several rule sets.
    #[must_use]
    pub fn rule_sets(mut self, rule_sets: impl IntoIterator<Item = RuleSet>) -> Self {
        self.rule_sets.extend(rule_sets);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds a language front end. Without any, PHP is used.
    #[must_use]
    pub fn extractor(mut self, extractor: Box<dyn LanguageExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Sets where advisory messages go (default: `tracing` at the run's verbosity).
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory can't be resolved, an
    /// exclude pattern is invalid, or the configuration names an unknown
    /// rule set.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let cwd = std::env::current_dir()?;

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            cwd.join(&root)
        };

        let options = self
            .options
            .unwrap_or_else(|| RunOptions::from_config(&config, &cwd));

        let rule_sets = if self.rule_sets.is_empty() {
            rule_sets_from_config(&config)?
        } else {
            self.rule_sets
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let extractors = if self.extractors.is_empty() {
            vec![Box::new(PhpExtractor::new()) as Box<dyn LanguageExtractor>]
        } else {
            self.extractors
        };

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink::new(options.verbosity())));

        Ok(Analyzer {
            root,
            options,
            rule_sets,
            exclude_patterns,
            excludes,
            extensions: config.analyzer.extensions,
            respect_gitignore: config.analyzer.respect_gitignore,
            parallelism: config.analyzer.parallelism,
            fail_on_parse_error: config.analyzer.fail_on_parse_error,
            extractors,
            sink,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    options: RunOptions,
    rule_sets: Vec<RuleSet>,
    exclude_patterns: Vec<String>,
    excludes: Vec<glob::Pattern>,
    extensions: Vec<String>,
    respect_gitignore: bool,
    parallelism: Option<usize>,
    fail_on_parse_error: bool,
    extractors: Vec<Box<dyn LanguageExtractor>>,
    sink: Arc<dyn OutputSink>,
}

/// Every extracted declaration plus the files that didn't parse.
struct Extracted {
    codebase: Codebase,
    failed: HashSet<PathBuf>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the run options.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Returns the active rule sets.
    #[must_use]
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rule_sets.iter().map(RuleSet::len).sum()
    }

    /// Analyzes all files and returns the results.
    ///
    /// Every discovered file is parsed so that inherited suppressions and
    /// declaration status resolve against the whole codebase. When the
    /// result cache is enabled, rules only run on files that changed
    /// (or whose ancestors changed) since the last run.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, a file can't be read, or a file
    /// doesn't parse and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        match self.parallelism {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| self.run())
            }
            None => self.run(),
        }
    }

    fn run(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let factory = CacheEngineFactory::new(&self.root, Arc::clone(&self.sink));
        let engine = factory.create(&self.options, &self.rule_sets);
        if let Some(engine) = &engine {
            engine.observe(&files);
        }

        let extracted = self.extract_all(&files)?;
        debug!("Indexed {} type declarations", extracted.codebase.len());

        let check = |path: &Path| -> Result<Option<FileAnalysis>, AnalyzerError> {
            if extracted.failed.contains(path) {
                return Ok(None);
            }
            Ok(Some(self.check_file(path, &extracted.codebase)))
        };

        let mut result = LintResult::new();
        if let Some(engine) = engine {
            let declared = extracted.codebase.iter().map(TypeDecl::qualified_name);
            let run = engine.with_declared_types(declared).process(&files, check)?;
            result.violations = run.violations();
            result.files_checked = files.len() - run.stats.skipped;
            result.files_reused = run.stats.reused;
        } else {
            let analyses: Vec<Result<Option<FileAnalysis>, AnalyzerError>> =
                files.par_iter().map(|path| check(path)).collect();
            for analysis in analyses {
                if let Some(analysis) = analysis? {
                    result.violations.extend(analysis.violations);
                    result.files_checked += 1;
                }
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files ({} reused)",
            result.violations.len(),
            result.files_checked,
            result.files_reused
        );

        Ok(result)
    }

    /// Reads and parses every file into one codebase.
    fn extract_all(&self, files: &[PathBuf]) -> Result<Extracted, AnalyzerError> {
        let parsed: Vec<Result<Result<SourceUnit, ExtractError>, AnalyzerError>> = files
            .par_iter()
            .map(|path| self.extract_file(path))
            .collect();

        let mut extracted = Extracted {
            codebase: Codebase::new(),
            failed: HashSet::new(),
        };
        for (path, unit) in files.iter().zip(parsed) {
            match unit? {
                Ok(unit) => extracted.codebase.add_unit(unit),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse(e));
                    }
                    extracted.failed.insert(path.clone());
                }
            }
        }
        Ok(extracted)
    }

    fn extract_file(&self, path: &Path) -> Result<Result<SourceUnit, ExtractError>, AnalyzerError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let Some(extractor) = self.extractors.iter().find(|e| e.handles(path)) else {
            return Ok(Ok(SourceUnit {
                path: relative.to_path_buf(),
                types: Vec::new(),
            }));
        };
        debug!("Parsing: {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(extractor.extract(relative, &source))
    }

    /// Runs every rule on the types declared in one file.
    fn check_file(&self, path: &Path, codebase: &Codebase) -> FileAnalysis {
        debug!("Analyzing: {}", path.display());

        let ctx = FileContext::new(path, &self.root);
        let mut violations = Vec::new();
        let mut metadata = FileMetadata::new();

        let resolver = HierarchyResolver::new(codebase);
        for decl in codebase.types_in(&ctx.relative_path) {
            let ty = TypeNode::new(decl, codebase);
            for ancestor in resolver.ancestor_chain(&ty).iter().skip(1) {
                let file = ancestor.file();
                if !file.as_os_str().is_empty() && file != ctx.relative_path {
                    metadata = metadata.depends_on(relative_key(Path::new(""), file));
                }
            }
            for name in resolver.unresolved_ancestors(&ty) {
                metadata = metadata.awaits_type(name);
            }

            self.check_node(&ctx, &SyntaxNode::Type(ty.clone()), &mut violations);
            for method in ty.methods() {
                self.check_node(&ctx, &SyntaxNode::Method(method), &mut violations);
            }
        }

        FileAnalysis::new(violations, metadata)
    }

    fn check_node(&self, ctx: &FileContext<'_>, node: &SyntaxNode<'_>, out: &mut Vec<Violation>) {
        if !node.is_declaration() {
            return;
        }
        for rule_set in &self.rule_sets {
            for entry in rule_set.rules() {
                let rule = entry.rule.as_ref();
                if !self.options.has_strict() && node.has_suppression_for(rule.name()) {
                    debug!("{} suppressed on {}", rule.name(), node.fully_qualified_name());
                    continue;
                }
                out.extend(rule.check(ctx, node).into_iter().map(|mut v| {
                    v.severity = entry.severity;
                    v
                }));
            }
        }
    }

    /// Discovers all source files to analyze, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .parents(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || !self.has_supported_extension(path) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn has_supported_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_str = relative_key(Path::new(""), relative);

        if self
            .excludes
            .iter()
            .any(|p| p.matches(&relative_str) || p.matches_path(path))
        {
            return true;
        }

        // Directory patterns like "**/vendor/**" also match at the root.
        self.exclude_patterns.iter().any(|pattern| {
            let clean = pattern.replace("**/", "").replace("/**", "");
            !clean.is_empty() && relative_str.split('/').any(|part| part == clean)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint_core::NullSink;

    fn analyzer(excludes: &[&str]) -> Analyzer {
        let mut builder = Analyzer::builder()
            .root("/repo")
            .config(Config::default())
            .sink(Arc::new(NullSink));
        for pattern in excludes {
            builder = builder.exclude(*pattern);
        }
        builder.build().expect("Failed to build analyzer")
    }

    #[test]
    fn test_builder_defaults() {
        let analyzer = analyzer(&[]);
        assert_eq!(analyzer.root(), Path::new("/repo"));
        assert_eq!(analyzer.rule_sets().len(), 2);
        assert_eq!(analyzer.rule_count(), 3);
        assert!(!analyzer.options().is_cache_enabled());
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = analyzer(&["**/generated/**", "legacy/*.php"]);

        assert!(analyzer.should_exclude(Path::new("/repo/vendor/lib/A.php")));
        assert!(analyzer.should_exclude(Path::new("/repo/src/vendor/A.php")));
        assert!(analyzer.should_exclude(Path::new("/repo/src/generated/Proxy.php")));
        assert!(analyzer.should_exclude(Path::new("/repo/legacy/Old.php")));
        assert!(!analyzer.should_exclude(Path::new("/repo/src/Service.php")));
        assert!(!analyzer.should_exclude(Path::new("/repo/src/Vendors.php")));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = Analyzer::builder()
            .root("/repo")
            .exclude("src/[")
            .build()
            .err()
            .expect("invalid pattern");
        assert!(matches!(err, AnalyzerError::Glob(_)));
    }

    #[test]
    fn test_supported_extensions() {
        let analyzer = analyzer(&[]);
        assert!(analyzer.has_supported_extension(Path::new("/repo/src/A.php")));
        assert!(analyzer.has_supported_extension(Path::new("/repo/src/A.PHP")));
        assert!(!analyzer.has_supported_extension(Path::new("/repo/src/A.rs")));
        assert!(!analyzer.has_supported_extension(Path::new("/repo/Makefile")));
    }
}
