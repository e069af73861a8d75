use super::DiagnosticSession;
use crate::locator::{find_case_insensitive_match, permission_bits, permission_string};
use crate::reporter::Reporter;
use crate::system::{ImportSystem, LookupError};
use importdoc_types::{ModuleName, ModuleSpec, Severity};
use tracing::debug;

impl<S: ImportSystem, R: Reporter> DiagnosticSession<S, R> {
    /// Check that `name` resolves to a spec without executing it.
    ///
    /// Both "no spec" and a failing lookup trigger exactly one
    /// `diagnose_path_issue` call.
    pub fn validate_package(&mut self, name: &str) -> bool {
        self.resolve_spec(name).is_some()
    }

    /// Look up the spec of `name` once; `None` after diagnosing why it has none.
    pub(super) fn resolve_spec(&mut self, name: &str) -> Option<ModuleSpec> {
        let lookup = ModuleName::parse(name)
            .map_err(LookupError::from)
            .and_then(|module| self.system.find_spec(&module));

        match lookup {
            Ok(spec) if spec.is_found() => Some(spec),
            Ok(_) => {
                self.diagnose_path_issue(name);
                None
            }
            Err(err) => {
                debug!(module = name, error = %err, "spec lookup failed");
                self.diagnose_path_issue(name);
                None
            }
        }
    }

    /// Root-cause a failed spec lookup: find the file the name should map to
    /// and show its permissions, or say that no such file exists.
    pub fn diagnose_path_issue(&mut self, name: &str) {
        let Ok(module) = ModuleName::parse(name) else {
            self.log(Severity::Error, "No file found matching module.");
            return;
        };

        let located = match self.system.find_module_file_path(&module) {
            Ok(located) => located,
            Err(err) => {
                self.log(
                    Severity::Error,
                    format!("Could not search for module file: {}", err),
                );
                return;
            }
        };

        let Some(path) = located else {
            self.log(Severity::Error, "No file found matching module.");
            self.hint_case_mismatch(&module);
            return;
        };

        self.log(Severity::Info, format!("Found file: {}", path.display()));
        match std::fs::metadata(&path) {
            Ok(metadata) => {
                let permissions = permission_string(&metadata);
                self.log(Severity::Info, format!("Permissions: {}", permissions));
                if permission_bits(&metadata) & 0o400 == 0 {
                    self.log(Severity::Warning, "File is not readable by its owner");
                }
            }
            Err(err) => {
                self.log(
                    Severity::Error,
                    format!("Could not read permissions for {}: {}", path.display(), err),
                );
            }
        }
    }

    fn hint_case_mismatch(&mut self, module: &ModuleName) {
        let search_paths = self.system.search_paths().to_vec();
        match find_case_insensitive_match(module, &search_paths) {
            Ok(Some(candidate)) => self.log(
                Severity::Hint,
                format!(
                    "Found {} which differs only in case; module names are case-sensitive",
                    candidate.display()
                ),
            ),
            Ok(None) => self.log(
                Severity::Hint,
                "The module is not installed in this environment, or its name is misspelled",
            ),
            Err(err) => {
                debug!(module = %module, error = %err, "case-insensitive probe failed");
            }
        }
    }
}
