use crate::ImportFailure;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity of a single diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    /// Suggested next step for the user.
    Hint,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// One single-line message emitted during a diagnostic session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Machine-readable summary of one diagnostic session.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub target: String,
    pub package_dir: Option<String>,
    pub success: bool,
    pub failure: Option<ImportFailure>,
    /// Sorted.
    pub discovered_modules: Vec<String>,
    /// Sorted.
    pub skipped_modules: Vec<String>,
    pub findings: Vec<Finding>,
    pub generated_at: DateTime<Utc>,
}

impl DiagnosticReport {
    /// Findings of one severity, in emission order.
    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.severity == severity)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
