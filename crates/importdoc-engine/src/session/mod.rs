//! Diagnostic session: one run of the engine against one target module.
//!
//! ```text
//! run_diagnostic("pkg.sub")
//!   ├── header (target, package dir, interpreter)
//!   ├── import attempt ── ok ──> true
//!   └── failed
//!         ├── explain exception kind
//!         ├── search path health
//!         ├── first unresolvable dotted prefix
//!         ├── validate_package ── no spec ──> diagnose_path_issue
//!         ├── package? ──> discover submodule tree (exclusion-filtered)
//!         └── package dir vs. search path ──> false
//! ```

mod discover;
mod validate;

use crate::exclusion::ExclusionFilter;
use crate::reporter::Reporter;
use crate::system::ImportSystem;
use crate::Result;
use chrono::Utc;
use importdoc_types::{
    DiagnosticReport, FailureKind, Finding, ImportFailure, ImportOutcome, ModuleName, ModuleSpec,
    Severity,
};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Running with root privileges is expected; do not warn about it.
    pub allow_root: bool,
    /// Regular expressions; matching module names are skipped during discovery.
    pub exclude_patterns: Vec<String>,
    /// Maximum package nesting below the target that discovery descends into.
    pub max_depth: Option<usize>,
    /// Whether the current process has root privileges.
    pub privileged: bool,
}

/// Stateful import diagnosis against an injected import system.
pub struct DiagnosticSession<S, R> {
    system: S,
    reporter: R,
    allow_root: bool,
    privileged: bool,
    max_depth: Option<usize>,
    exclusion: ExclusionFilter,
    discovered_modules: BTreeSet<String>,
    undiscoverable_modules: BTreeSet<String>,
    walked_locations: HashSet<PathBuf>,
    findings: Vec<Finding>,
    target: Option<String>,
    package_dir: Option<PathBuf>,
    outcome: Option<ImportOutcome>,
}

impl<S: ImportSystem, R: Reporter> DiagnosticSession<S, R> {
    /// Create a session. Fails only when an exclusion pattern does not compile.
    pub fn new(system: S, reporter: R, config: SessionConfig) -> Result<Self> {
        Ok(Self {
            system,
            reporter,
            allow_root: config.allow_root,
            privileged: config.privileged,
            max_depth: config.max_depth,
            exclusion: ExclusionFilter::new(&config.exclude_patterns)?,
            discovered_modules: BTreeSet::new(),
            undiscoverable_modules: BTreeSet::new(),
            walked_locations: HashSet::new(),
            findings: Vec::new(),
            target: None,
            package_dir: None,
            outcome: None,
        })
    }

    /// Attempt to import `module_name` and diagnose the failure if it does not import.
    ///
    /// Returns `Ok(true)` iff the import succeeds. Every expected failure is
    /// reported and turned into `Ok(false)`; `Err` means the engine itself failed.
    pub fn run_diagnostic(&mut self, module_name: &str, package_dir: Option<&Path>) -> Result<bool> {
        self.target = Some(module_name.to_string());
        self.package_dir = package_dir.map(Path::to_path_buf);

        self.print_header(module_name, package_dir);

        let outcome = self.system.import_module(module_name)?;
        let imported = match &outcome {
            ImportOutcome::Imported => {
                self.log(
                    Severity::Success,
                    format!("Successfully imported '{}'", module_name),
                );
                true
            }
            ImportOutcome::Failed(failure) => {
                self.log(Severity::Error, format!("Import failed: {}", failure));
                self.explain_failure(module_name, failure);
                false
            }
        };
        self.outcome = Some(outcome);

        if !imported {
            self.diagnose_failure(module_name, package_dir);
        }

        Ok(imported)
    }

    /// Header lines naming the target and the environment it is checked against.
    pub fn print_header(&mut self, module_name: &str, package_dir: Option<&Path>) {
        self.log(Severity::Info, format!("Target package: {}", module_name));
        if let Some(dir) = package_dir {
            self.log(Severity::Info, format!("Package dir: {}", dir.display()));
        }
        let interpreter = self.system.describe();
        self.log(Severity::Info, format!("Interpreter: {}", interpreter));
        let entries = self.system.search_paths().len();
        self.log(Severity::Info, format!("Search path entries: {}", entries));

        if self.privileged && !self.allow_root {
            self.log(
                Severity::Warning,
                "Running as root; results may differ from an unprivileged environment (pass --allow-root to silence)",
            );
        }
    }

    pub fn discovered_modules(&self) -> &BTreeSet<String> {
        &self.discovered_modules
    }

    pub fn skipped_modules(&self) -> &BTreeSet<String> {
        self.exclusion.skipped_modules()
    }

    /// Names whose spec lookup failed during discovery.
    pub fn undiscoverable_modules(&self) -> &BTreeSet<String> {
        &self.undiscoverable_modules
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Check `name` against the exclusion patterns, recording it when skipped.
    pub fn should_skip_module(&mut self, name: &str) -> bool {
        self.exclusion.should_skip_module(name)
    }

    /// Snapshot of everything the session found so far.
    pub fn report(&self) -> DiagnosticReport {
        let failure = match &self.outcome {
            Some(ImportOutcome::Failed(failure)) => Some(failure.clone()),
            _ => None,
        };

        DiagnosticReport {
            target: self.target.clone().unwrap_or_default(),
            package_dir: self
                .package_dir
                .as_ref()
                .map(|dir| dir.display().to_string()),
            success: self.outcome.as_ref().is_some_and(ImportOutcome::is_imported),
            failure,
            discovered_modules: self.discovered_modules.iter().cloned().collect(),
            skipped_modules: self.skipped_modules().iter().cloned().collect(),
            findings: self.findings.clone(),
            generated_at: Utc::now(),
        }
    }

    pub(crate) fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let finding = Finding::new(severity, message);
        self.reporter.emit(&finding);
        self.findings.push(finding);
    }

    fn explain_failure(&mut self, module_name: &str, failure: &ImportFailure) {
        match &failure.kind {
            FailureKind::ModuleNotFound(missing) => {
                let is_target_or_parent = module_name == missing
                    || module_name.starts_with(&format!("{}.", missing));
                if !is_target_or_parent {
                    self.log(
                        Severity::Hint,
                        format!(
                            "'{}' was found, but it imports '{}', which is not installed or not on the search path",
                            module_name, missing
                        ),
                    );
                }
            }
            FailureKind::ImportError => self.log(
                Severity::Hint,
                "The module was found, but a name it imports could not be resolved (circular import or version mismatch)",
            ),
            FailureKind::SyntaxError => self.log(
                Severity::Hint,
                "The module source does not compile; fix the file named in the traceback",
            ),
            FailureKind::Other => self.log(
                Severity::Hint,
                format!(
                    "Module-level code raised {} while importing",
                    failure.exception
                ),
            ),
        }
    }

    fn diagnose_failure(&mut self, module_name: &str, package_dir: Option<&Path>) {
        self.report_search_path();

        match ModuleName::parse(module_name) {
            Ok(name) => {
                if !name.is_top_level() {
                    self.report_missing_parent(&name);
                }

                if let Some(spec) = self.resolve_spec(module_name) {
                    self.report_resolved_spec(&name, spec);
                }
            }
            Err(err) => {
                self.log(Severity::Error, err.to_string());
                self.validate_package(module_name);
            }
        }

        if let Some(dir) = package_dir {
            self.report_package_dir(dir);
        }
    }

    fn report_search_path(&mut self) {
        let paths = self.system.search_paths().to_vec();
        self.log(Severity::Info, format!("Search path ({} entries):", paths.len()));

        for path in paths {
            match std::fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => {
                    self.log(Severity::Info, format!("  {}", path.display()));
                }
                Ok(_) => {
                    self.log(
                        Severity::Info,
                        format!("  {} (file, e.g. zip archive)", path.display()),
                    );
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    self.log(
                        Severity::Warning,
                        format!("  {} (does not exist)", path.display()),
                    );
                }
                Err(err) => {
                    self.log(
                        Severity::Warning,
                        format!("  {} (unreadable: {})", path.display(), err),
                    );
                }
            }
        }
    }

    /// Report the first dotted prefix of `name` that cannot contain the next segment.
    fn report_missing_parent(&mut self, name: &ModuleName) {
        let prefixes = name.prefixes();
        for (parent, child) in prefixes.iter().zip(prefixes.iter().skip(1)) {
            match self.system.find_spec(parent) {
                Ok(ModuleSpec::Package { .. }) => continue,
                Ok(ModuleSpec::Leaf { origin }) => {
                    self.log(
                        Severity::Error,
                        format!(
                            "'{}' is a module ({}), not a package; it cannot contain '{}'",
                            parent,
                            origin.display(),
                            child
                        ),
                    );
                    return;
                }
                Ok(ModuleSpec::NotFound) => {
                    self.log(
                        Severity::Error,
                        format!("Parent package '{}' cannot be found on the search path", parent),
                    );
                    return;
                }
                Err(err) => {
                    self.log(
                        Severity::Warning,
                        format!("Could not look up parent package '{}': {}", parent, err),
                    );
                    return;
                }
            }
        }
    }

    /// The spec was found although the import failed: show where it lives and walk packages.
    fn report_resolved_spec(&mut self, name: &ModuleName, spec: ModuleSpec) {
        match &spec {
            ModuleSpec::Package { origin: None, .. } => {
                self.log(
                    Severity::Info,
                    format!("'{}' resolves to a namespace package", name),
                );
            }
            _ => {
                if let Some(origin) = spec.origin() {
                    let origin = origin.display().to_string();
                    self.log(Severity::Info, format!("Spec origin: {}", origin));
                }
            }
        }

        if spec.is_package() {
            self.discover_target(name, &spec);
            let discovered = self.discovered_modules.len();
            let skipped = self.skipped_modules().len();
            let undiscoverable = self.undiscoverable_modules.len();
            self.log(
                Severity::Info,
                format!(
                    "Discovered {} modules ({} skipped by pattern, {} undiscoverable)",
                    discovered, skipped, undiscoverable
                ),
            );
        }
    }

    /// Relate the user's package directory to the search path. Read-only.
    fn report_package_dir(&mut self, dir: &Path) {
        if !dir.exists() {
            self.log(
                Severity::Warning,
                format!("Package dir {} does not exist", dir.display()),
            );
            return;
        }

        let canonical = canonical_or_self(dir);
        let search_paths: Vec<PathBuf> = self
            .system
            .search_paths()
            .iter()
            .map(|entry| canonical_or_self(entry))
            .collect();
        let parent_on_path = canonical
            .parent()
            .is_some_and(|parent| search_paths.iter().any(|entry| entry == parent));
        let dir_on_path = search_paths.iter().any(|entry| *entry == canonical);

        if parent_on_path {
            let parent = canonical
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            self.log(
                Severity::Info,
                format!("Parent of package dir ({}) is on the search path", parent),
            );
        } else if dir_on_path {
            self.log(
                Severity::Info,
                "Package dir itself is on the search path; its contents import as top-level modules",
            );
        } else {
            let parent = canonical
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            self.log(
                Severity::Warning,
                "Neither the package dir nor its parent is on the search path",
            );
            self.log(
                Severity::Hint,
                format!(
                    "Install the project into the environment or add {} to PYTHONPATH",
                    parent
                ),
            );
        }
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
