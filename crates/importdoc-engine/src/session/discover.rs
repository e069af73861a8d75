use super::DiagnosticSession;
use crate::reporter::Reporter;
use crate::system::ImportSystem;
use importdoc_types::{ModuleName, ModuleSpec, Severity};
use std::path::PathBuf;
use tracing::{debug, trace};

impl<S: ImportSystem, R: Reporter> DiagnosticSession<S, R> {
    /// Walk the submodule tree rooted at `package_name`.
    ///
    /// Every name, the root included, is checked against the exclusion
    /// patterns before it is recorded or descended into. Names already
    /// discovered are not walked again.
    pub fn discover_all_modules(&mut self, package_name: &str) {
        match ModuleName::parse(package_name) {
            Ok(name) => self.discover(&name, 0),
            Err(err) => self.log(
                Severity::Warning,
                format!("Cannot discover '{}': {}", package_name, err),
            ),
        }
    }

    /// Discovery for the user's target: the root is never excluded.
    pub(super) fn discover_target(&mut self, name: &ModuleName, spec: &ModuleSpec) {
        if let Some(pattern) = self.exclusion.matching_pattern(name.as_str()) {
            let pattern = pattern.to_string();
            self.log(
                Severity::Info,
                format!(
                    "Target '{}' matches exclusion pattern '{}'; walking it anyway",
                    name, pattern
                ),
            );
        }
        if self.discovered_modules.insert(name.to_string()) {
            self.walk_children(name, spec, 0);
        }
    }

    fn discover(&mut self, name: &ModuleName, depth: usize) {
        if self.discovered_modules.contains(name.as_str()) {
            trace!(module = %name, "already discovered");
            return;
        }
        if self.should_skip_module(name.as_str()) {
            return;
        }

        self.discovered_modules.insert(name.to_string());
        self.descend(name, depth);
    }

    fn descend(&mut self, name: &ModuleName, depth: usize) {
        let spec = match self.system.find_spec(name) {
            Ok(spec) => spec,
            Err(err) => {
                self.discovered_modules.remove(name.as_str());
                self.undiscoverable_modules.insert(name.to_string());
                self.log(
                    Severity::Warning,
                    format!("Could not discover '{}': {}", name, err),
                );
                return;
            }
        };
        self.walk_children(name, &spec, depth);
    }

    fn walk_children(&mut self, name: &ModuleName, spec: &ModuleSpec, depth: usize) {
        let Some(locations) = spec.submodule_search_locations() else {
            return;
        };

        if self.max_depth.is_some_and(|max| depth >= max) {
            self.log(
                Severity::Info,
                format!("Not descending into '{}': maximum depth reached", name),
            );
            return;
        }

        let fresh: Vec<PathBuf> = locations
            .iter()
            .filter(|location| {
                let canonical =
                    std::fs::canonicalize(location).unwrap_or_else(|_| location.to_path_buf());
                self.walked_locations.insert(canonical)
            })
            .cloned()
            .collect();
        if fresh.is_empty() && !locations.is_empty() {
            self.log(
                Severity::Warning,
                format!(
                    "Not descending into '{}': its search locations were already walked (cyclic package layout)",
                    name
                ),
            );
            return;
        }

        let children = match self.system.iter_submodules(&fresh) {
            Ok(children) => children,
            Err(err) => {
                self.log(
                    Severity::Warning,
                    format!("Could not list submodules of '{}': {}", name, err),
                );
                return;
            }
        };
        debug!(package = %name, children = children.len(), "enumerated submodules");

        for child in children {
            match name.child(&child.name) {
                Ok(child_name) => self.discover(&child_name, depth + 1),
                Err(err) => self.log(
                    Severity::Warning,
                    format!("Ignoring malformed submodule name under '{}': {}", name, err),
                ),
            }
        }
    }
}
