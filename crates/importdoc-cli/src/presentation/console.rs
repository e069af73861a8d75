use importdoc_engine::Reporter;
use importdoc_types::{DiagnosticReport, Finding, Severity};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io::Write;

/// Prints findings to stdout as the session emits them.
pub struct ConsoleReporter<W> {
    out: W,
    color: bool,
}

impl ConsoleReporter<std::io::Stdout> {
    /// Stdout reporter; colored only on a terminal and when NO_COLOR is unset.
    pub fn stdout() -> Self {
        let stdout = std::io::stdout();
        let color = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { out: stdout, color }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, finding: &Finding) -> String {
        let icon = match finding.severity {
            Severity::Info => " ",
            Severity::Success => "✓",
            Severity::Warning => "!",
            Severity::Error => "✗",
            Severity::Hint => "→",
        };
        if !self.color {
            return format!("{} {}", icon, finding.message);
        }

        match finding.severity {
            Severity::Info => format!("{} {}", icon, finding.message),
            Severity::Success => format!("{} {}", icon.green().bold(), finding.message.green()),
            Severity::Warning => format!("{} {}", icon.yellow().bold(), finding.message.yellow()),
            Severity::Error => format!("{} {}", icon.red().bold(), finding.message.red()),
            Severity::Hint => format!("{} {}", icon.cyan(), finding.message.cyan()),
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn emit(&mut self, finding: &Finding) {
        let line = self.render(finding);
        // SIGPIPE ends the process on a closed pipe; other write errors are dropped.
        let _ = writeln!(self.out, "{}", line);
    }
}

/// Closing lines of a plain-text run.
pub fn print_summary(report: &DiagnosticReport) {
    println!();
    if report.success {
        println!("Result: '{}' imports cleanly", report.target);
        return;
    }

    println!("Result: '{}' failed to import", report.target);
    if let Some(failure) = &report.failure {
        println!("  Cause: {}", failure);
    }
    if !report.discovered_modules.is_empty() {
        println!("  Discovered modules: {}", report.discovered_modules.len());
    }
    if !report.skipped_modules.is_empty() {
        println!("  Skipped by pattern: {}", report.skipped_modules.join(", "));
    }
}
