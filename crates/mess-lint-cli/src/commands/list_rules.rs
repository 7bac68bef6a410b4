//! List rules command implementation.

use mess_lint::rules::{all_rules, rule_set_of, AVAILABLE_RULE_SETS};

/// Runs the list-rules command.
pub fn run() {
    print!("{}", render());
}

fn render() -> String {
    let mut out = String::from("Available rules:\n\n");
    out.push_str(&format!("{:<8} {:<22} {:<8} Description\n", "Code", "Name", "Set"));
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for rule in all_rules() {
        out.push_str(&format!(
            "{:<8} {:<22} {:<8} {}\n",
            rule.code(),
            rule.name(),
            rule_set_of(rule.name()).unwrap_or("-"),
            rule.description()
        ));
    }

    out.push_str(&format!("\nRule sets: {}\n", AVAILABLE_RULE_SETS.join(", ")));
    out.push_str("\nUse --rulesets to pick rule sets, e.g.:\n");
    out.push_str("  mess-lint check --rulesets naming\n");
    out.push_str("\nSuppress a rule with a doc comment annotation:\n");
    out.push_str("  @SuppressWarnings(PHPMD.ShortMethodName)\n");
    out
}
