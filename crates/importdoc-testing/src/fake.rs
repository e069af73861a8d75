//! In-memory import system.
//!
//! Every lookup is answered from tables filled by the builder, and every
//! call is recorded so tests can assert how often the engine probed.

use importdoc_engine::{ImportSystem, LookupError, Submodule};
use importdoc_types::{ImportFailure, ImportOutcome, ModuleName, ModuleSpec, categorize_import_error};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

enum SpecEntry {
    Spec(ModuleSpec),
    Error(String),
}

enum FileEntry {
    Path(PathBuf),
    Error(io::ErrorKind, String),
}

/// Scriptable `ImportSystem` for engine tests.
///
/// # Example
/// ```
/// use importdoc_testing::FakeImportSystem;
///
/// let system = FakeImportSystem::new()
///     .importable("os")
///     .package("pkg", "/site/pkg")
///     .module("pkg.util", "/site/pkg/util.py");
/// ```
#[derive(Default)]
pub struct FakeImportSystem {
    description: Option<String>,
    search_paths: Vec<PathBuf>,
    importable: HashSet<String>,
    failures: HashMap<String, String>,
    broken: Option<String>,
    specs: HashMap<String, SpecEntry>,
    submodules: HashMap<PathBuf, Vec<Submodule>>,
    submodule_errors: HashMap<PathBuf, String>,
    files: HashMap<String, FileEntry>,
    import_calls: RefCell<Vec<String>>,
    spec_calls: RefCell<Vec<String>>,
    file_calls: RefCell<Vec<String>>,
}

impl FakeImportSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Imports of `name` succeed.
    pub fn importable(mut self, name: &str) -> Self {
        self.importable.insert(name.to_string());
        self
    }

    /// Imports of `name` fail with the given `Exception: message` line.
    ///
    /// Names neither importable nor failing explicitly fail with
    /// `ModuleNotFoundError: No module named '<name>'`.
    pub fn failing_import(mut self, name: &str, error_line: &str) -> Self {
        self.failures
            .insert(name.to_string(), error_line.to_string());
        self
    }

    /// Every import attempt returns `Err`, as if the interpreter could not be started.
    pub fn broken(mut self, message: &str) -> Self {
        self.broken = Some(message.to_string());
        self
    }

    pub fn spec(mut self, name: &str, spec: ModuleSpec) -> Self {
        self.specs.insert(name.to_string(), SpecEntry::Spec(spec));
        self
    }

    /// Leaf module backed by `origin`.
    pub fn module(self, name: &str, origin: impl Into<PathBuf>) -> Self {
        self.spec(
            name,
            ModuleSpec::Leaf {
                origin: origin.into(),
            },
        )
    }

    /// Regular package whose single search location is `location`.
    pub fn package(self, name: &str, location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        self.spec(
            name,
            ModuleSpec::Package {
                origin: Some(location.join("__init__.py")),
                search_locations: vec![location],
            },
        )
    }

    /// Spec lookup for `name` fails.
    pub fn spec_error(mut self, name: &str, message: &str) -> Self {
        self.specs
            .insert(name.to_string(), SpecEntry::Error(message.to_string()));
        self
    }

    /// Children reported for a package search location.
    pub fn submodules(mut self, location: impl Into<PathBuf>, children: Vec<Submodule>) -> Self {
        self.submodules.insert(location.into(), children);
        self
    }

    /// Enumerating `location` fails.
    pub fn submodule_error(mut self, location: impl Into<PathBuf>, message: &str) -> Self {
        self.submodule_errors
            .insert(location.into(), message.to_string());
        self
    }

    /// `find_module_file_path(name)` returns `path` instead of probing the search path.
    pub fn file(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.files
            .insert(name.to_string(), FileEntry::Path(path.into()));
        self
    }

    /// `find_module_file_path(name)` fails with an I/O error.
    pub fn file_error(mut self, name: &str, kind: io::ErrorKind, message: &str) -> Self {
        self.files
            .insert(name.to_string(), FileEntry::Error(kind, message.to_string()));
        self
    }

    pub fn import_calls(&self) -> Vec<String> {
        self.import_calls.borrow().clone()
    }

    pub fn spec_calls(&self) -> Vec<String> {
        self.spec_calls.borrow().clone()
    }

    /// Names passed to `find_module_file_path`, i.e. one entry per path diagnosis.
    pub fn file_calls(&self) -> Vec<String> {
        self.file_calls.borrow().clone()
    }

    pub fn file_call_count(&self, name: &str) -> usize {
        self.file_calls
            .borrow()
            .iter()
            .filter(|called| called.as_str() == name)
            .count()
    }
}

impl ImportSystem for FakeImportSystem {
    fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "Fake Python 3.12.0 (in-memory)".to_string())
    }

    fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn import_module(&self, name: &str) -> importdoc_engine::Result<ImportOutcome> {
        self.import_calls.borrow_mut().push(name.to_string());

        if let Some(message) = &self.broken {
            return Err(importdoc_engine::Error::ImportSystem(message.clone()));
        }
        if self.importable.contains(name) {
            return Ok(ImportOutcome::Imported);
        }

        let failure: ImportFailure = match self.failures.get(name) {
            Some(line) => categorize_import_error(line),
            None => categorize_import_error(&format!(
                "ModuleNotFoundError: No module named '{}'",
                name
            )),
        };
        Ok(ImportOutcome::Failed(failure))
    }

    fn find_spec(&self, name: &ModuleName) -> Result<ModuleSpec, LookupError> {
        self.spec_calls.borrow_mut().push(name.to_string());

        match self.specs.get(name.as_str()) {
            Some(SpecEntry::Spec(spec)) => Ok(spec.clone()),
            Some(SpecEntry::Error(message)) => Err(LookupError::Failed(message.clone())),
            None => Ok(ModuleSpec::NotFound),
        }
    }

    fn iter_submodules(&self, search_locations: &[PathBuf]) -> Result<Vec<Submodule>, LookupError> {
        let mut children = Vec::new();
        for location in search_locations {
            if let Some(message) = self.submodule_errors.get(location) {
                return Err(LookupError::Failed(message.clone()));
            }
            if let Some(found) = self.submodules.get(location) {
                children.extend(found.iter().cloned());
            }
        }
        Ok(children)
    }

    fn find_module_file_path(&self, name: &ModuleName) -> io::Result<Option<PathBuf>> {
        self.file_calls.borrow_mut().push(name.to_string());

        match self.files.get(name.as_str()) {
            Some(FileEntry::Path(path)) => Ok(Some(path.clone())),
            Some(FileEntry::Error(kind, message)) => Err(io::Error::new(*kind, message.clone())),
            None => importdoc_engine::find_module_file_path(name, &self.search_paths),
        }
    }
}

/// Location helper: `/site/<relative>` without touching the filesystem.
pub fn site_path(relative: &str) -> PathBuf {
    Path::new("/site").join(relative)
}
