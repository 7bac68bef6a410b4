//! Configuration fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mess_lint_core::RuleSet;

/// Digest of everything that influences rule output: the tool version,
/// strict mode, and every active rule with its severity and parameters.
///
/// The order of rule sets and of rules within a set does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigFingerprint(String);

impl ConfigFingerprint {
    /// Fingerprints the active configuration.
    #[must_use]
    pub fn create(strict: bool, rule_sets: &[RuleSet]) -> Self {
        let mut lines: Vec<String> = rule_sets.iter().flat_map(RuleSet::describe).collect();
        lines.sort();

        let mut hasher = Sha256::new();
        hasher.update(concat!("mess-lint ", env!("CARGO_PKG_VERSION"), "\n"));
        hasher.update(format!("strict={strict}\n"));
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Value equality.
    #[must_use]
    pub fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }

    /// Hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
