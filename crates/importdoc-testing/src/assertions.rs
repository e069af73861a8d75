//! Custom assertions over emitted findings.
//!
//! Findings are single lines; downstream tooling keys on substrings such as
//! `"Found file:"`, so the assertions match substrings too.

use anyhow::Result;
use importdoc_types::{Finding, Severity};

/// Assert that some finding contains `needle`.
pub fn assert_logged(findings: &[Finding], needle: &str) -> Result<()> {
    if findings.iter().any(|f| f.message.contains(needle)) {
        return Ok(());
    }
    anyhow::bail!(
        "Expected a finding containing {:?}, got:\n{}",
        needle,
        render(findings)
    )
}

/// Assert that no finding contains `needle`.
pub fn assert_not_logged(findings: &[Finding], needle: &str) -> Result<()> {
    if let Some(found) = findings.iter().find(|f| f.message.contains(needle)) {
        anyhow::bail!(
            "Expected no finding containing {:?}, found {:?} in:\n{}",
            needle,
            found.message,
            render(findings)
        );
    }
    Ok(())
}

/// Number of findings with the given severity.
pub fn count_severity(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

fn render(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|f| format!("  [{}] {}", f.severity, f.message))
        .collect::<Vec<_>>()
        .join("\n")
}
