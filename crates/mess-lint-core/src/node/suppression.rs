//! `@SuppressWarnings` annotation parsing.
//!
//! Recognized forms inside a doc comment:
//!
//! ```text
//! @SuppressWarnings(PHPMD)                    suppress every rule
//! @SuppressWarnings("PMD")                    suppress every rule
//! @SuppressWarnings(PHPMD.ShortMethodName)    suppress one rule
//! @SuppressWarnings("shortMethodName")        suppress one rule
//! @SuppressWarnings("PHPMD.A", "PHPMD.B")     suppress several rules
//! ```
//!
//! Rule names match with the first letter compared case-insensitively and
//! the remainder compared exactly, so `shortMethodName` matches
//! `ShortMethodName` but `SHORTMETHODNAME` does not.

const ANNOTATION: &str = "@suppresswarnings";

/// Values that suppress every rule.
const BLANKET: &[&str] = &["PHPMD", "PMD"];

/// Prefixes that namespace a rule name inside an annotation value.
const RULE_PREFIXES: &[&str] = &["PHPMD.", "PMD."];

/// The parsed suppression values of one doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suppressions {
    values: Vec<String>,
}

impl Suppressions {
    /// Parses every `@SuppressWarnings(...)` annotation in a doc comment.
    #[must_use]
    pub fn parse(doc_comment: &str) -> Self {
        let lower = doc_comment.to_ascii_lowercase();
        let mut values = Vec::new();
        let mut search_from = 0;

        while let Some(found) = lower[search_from..].find(ANNOTATION) {
            let after = search_from + found + ANNOTATION.len();
            search_from = after;

            let rest = doc_comment[after..].trim_start();
            let Some(args) = rest.strip_prefix('(') else {
                continue;
            };
            let Some(end) = args.find(')') else {
                continue;
            };

            values.extend(
                args[..end]
                    .split(',')
                    .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').trim())
                    .filter(|v| !v.is_empty())
                    .map(String::from),
            );
        }

        Self { values }
    }

    /// Parses an optional doc comment.
    #[must_use]
    pub fn from_doc(doc_comment: Option<&str>) -> Self {
        doc_comment.map(Self::parse).unwrap_or_default()
    }

    /// Returns `true` if no annotation values were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if these annotations suppress `rule`.
    #[must_use]
    pub fn suppresses(&self, rule: &str) -> bool {
        self.values.iter().any(|value| value_suppresses(value, rule))
    }
}

fn value_suppresses(value: &str, rule: &str) -> bool {
    if BLANKET.contains(&value) {
        return true;
    }
    let name = RULE_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value);
    names_match(name, rule)
}

/// First character case-insensitive, the rest exact.
fn names_match(annotated: &str, rule: &str) -> bool {
    let mut a = annotated.chars();
    let mut r = rule.chars();
    match (a.next(), r.next()) {
        (Some(x), Some(y)) => {
            x.to_lowercase().eq(y.to_lowercase()) && a.as_str() == r.as_str()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_values() {
        let s = Suppressions::parse(
            "/**\n * @SuppressWarnings(PHPMD.ShortMethodName)\n * @SuppressWarnings(\"unused\", 'PMD.TooManyMethods')\n */",
        );
        assert!(s.suppresses("ShortMethodName"));
        assert!(s.suppresses("TooManyMethods"));
        assert!(s.suppresses("Unused"));
        assert!(!s.suppresses("CamelCaseMethodName"));
    }

    #[test]
    fn blanket_forms_suppress_everything() {
        assert!(Suppressions::parse("/** @SuppressWarnings(PHPMD) */").suppresses("Anything"));
        assert!(Suppressions::parse("/** @SuppressWarnings(\"PMD\") */").suppresses("Anything"));
    }

    #[test]
    fn first_letter_is_case_insensitive_only() {
        let lower = Suppressions::parse("/** @SuppressWarnings(\"foobar\") */");
        let exact = Suppressions::parse("/** @SuppressWarnings(\"FooBar\") */");
        let shouting = Suppressions::parse("/** @SuppressWarnings(\"FOOBAR\") */");

        assert!(lower.suppresses("FooBar"));
        assert!(exact.suppresses("FooBar"));
        assert!(!shouting.suppresses("FooBar"));
        assert!(!lower.suppresses("Foo"));
    }

    #[test]
    fn annotation_keyword_is_case_insensitive() {
        let s = Suppressions::parse("/** @suppressWarnings(PHPMD.FooBar) */");
        assert!(s.suppresses("FooBar"));
    }

    #[test]
    fn malformed_annotations_are_ignored() {
        assert!(Suppressions::parse("/** @SuppressWarnings PHPMD */").is_empty());
        assert!(Suppressions::parse("/** @SuppressWarnings(PHPMD").is_empty());
        assert!(Suppressions::parse("/** @SuppressWarnings() */").is_empty());
        assert!(Suppressions::from_doc(None).is_empty());
    }
}
