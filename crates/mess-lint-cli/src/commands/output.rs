//! Shared output formatting for lint results.

use anyhow::Result;
use mess_lint::{LintResult, Severity, Violation, ViolationDiagnostic};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is where violation paths are relative to; the rich format reads
/// source snippets from there.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result)?,
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Rich => render_rich(result, root),
    };
    print!("{rendered}");
    Ok(())
}

fn render_text(result: &LintResult) -> String {
    let (errors, warnings, infos) = result.count_by_severity();
    let mut out = String::new();

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        let _ = writeln!(
            out,
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        let _ = writeln!(out, "  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            let _ = writeln!(out, "  = help: {}", suggestion.message);
        }
        out.push('\n');
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let _ = writeln!(
        out,
        "{}{}\x1b[0m",
        summary_color,
        summary_line(result, errors, warnings, infos)
    );
    out
}

fn summary_line(result: &LintResult, errors: usize, warnings: usize, infos: usize) -> String {
    let mut line = format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
    if result.files_reused > 0 {
        let _ = write!(line, " ({} from cache)", result.files_reused);
    }
    line
}

#[derive(Serialize)]
struct JsonReport<'a> {
    violations: &'a [Violation],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
    files_checked: usize,
    files_reused: usize,
}

fn render_json(result: &LintResult) -> Result<String> {
    let (errors, warnings, infos) = result.count_by_severity();
    let report = JsonReport {
        violations: &result.violations,
        summary: JsonSummary {
            errors,
            warnings,
            infos,
            files_checked: result.files_checked,
            files_reused: result.files_reused,
        },
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(|violation| format!("{violation}\n"))
        .collect()
}

fn render_rich(result: &LintResult, root: &Path) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let name = violation.location.file.display().to_string();
        let report = miette::Report::new(ViolationDiagnostic::from(violation));
        let report = match std::fs::read_to_string(root.join(&violation.location.file)) {
            Ok(source) => report.with_source_code(miette::NamedSource::new(name, source)),
            Err(e) => {
                tracing::debug!("No source for {name}: {e}");
                report
            }
        };
        let _ = writeln!(out, "{report:?}");
    }

    let (errors, warnings, infos) = result.count_by_severity();
    let _ = writeln!(out, "{}", summary_line(result, errors, warnings, infos));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mess_lint::{Location, Suggestion};
    use std::path::PathBuf;

    fn result() -> LintResult {
        let mut result = LintResult::new();
        result.violations.push(
            Violation::new(
                "ML001",
                "ShortMethodName",
                Severity::Warning,
                Location::new(PathBuf::from("src/Point.php"), 6, 21),
                "Avoid using short method names like Point::x(). The configured minimum method name length is 3.",
            )
            .with_node("App\\Point::x()")
            .with_suggestion(Suggestion::new("Rename the method to describe what it does")),
        );
        result.violations.push(Violation::new(
            "ML002",
            "CamelCaseMethodName",
            Severity::Error,
            Location::new(PathBuf::from("src/Point.php"), 8, 21),
            "The method y_value is not named in camelCase.",
        ));
        result.files_checked = 4;
        result.files_reused = 3;
        result
    }

    #[test]
    fn compact_output() {
        insta::assert_snapshot!(render_compact(&result()), @r"
        src/Point.php:6:21: warning [ML001] Avoid using short method names like Point::x(). The configured minimum method name length is 3.
        src/Point.php:8:21: error [ML002] The method y_value is not named in camelCase.
        ");
    }

    #[test]
    fn summary_mentions_cache_reuse() {
        let result = result();
        assert_eq!(
            summary_line(&result, 1, 1, 0),
            "Found 1 error(s), 1 warning(s), 0 info(s) in 4 file(s) (3 from cache)"
        );

        let fresh = LintResult::new();
        assert_eq!(
            summary_line(&fresh, 0, 0, 0),
            "Found 0 error(s), 0 warning(s), 0 info(s) in 0 file(s)"
        );
    }

    #[test]
    fn json_output_has_summary() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&result()).expect("serializable")).expect("valid json");
        assert_eq!(json["violations"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["violations"][0]["node"], "App\\Point::x()");
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["summary"]["files_reused"], 3);
    }

    #[test]
    fn text_output_lists_every_violation() {
        let text = render_text(&result());
        assert!(text.contains("ML001 ShortMethodName at src/Point.php:6:21"));
        assert!(text.contains("= help: Rename the method to describe what it does"));
        assert!(text.contains("ML002 CamelCaseMethodName at src/Point.php:8:21"));
    }

    #[test]
    fn rich_output_without_sources_still_reports() {
        let rich = render_rich(&result(), Path::new("/nonexistent"));
        assert!(rich.contains("[ML002] The method y_value is not named in camelCase."));
        assert!(rich.ends_with("(3 from cache)\n"));
    }
}
