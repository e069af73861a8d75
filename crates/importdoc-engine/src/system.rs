use crate::Result;
use importdoc_types::{ImportOutcome, ModuleName, ModuleSpec};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of an interpreter's import machinery.
///
/// Responsibilities:
/// - Attempt an import and report the outcome
/// - Find a module spec without executing the module
/// - Enumerate direct submodules of a package
///
/// Implementations must not mutate the search path or any module cache.
pub trait ImportSystem {
    /// Human-readable interpreter description (e.g. "Python 3.12.1 (/usr/bin/python3)")
    fn describe(&self) -> String;

    /// Search locations, in lookup order
    fn search_paths(&self) -> &[PathBuf];

    /// Attempt to import `name`.
    ///
    /// A failing import is `Ok(ImportOutcome::Failed)`. `Err` means the attempt
    /// itself could not be made.
    fn import_module(&self, name: &str) -> Result<ImportOutcome>;

    /// Find the spec for `name` without executing it
    fn find_spec(&self, name: &ModuleName) -> std::result::Result<ModuleSpec, LookupError>;

    /// Direct children of a package living in `search_locations`
    fn iter_submodules(
        &self,
        search_locations: &[PathBuf],
    ) -> std::result::Result<Vec<Submodule>, LookupError>;

    /// Locate a plausible source file for `name` on the search path
    fn find_module_file_path(&self, name: &ModuleName) -> io::Result<Option<PathBuf>> {
        crate::locator::find_module_file_path(name, self.search_paths())
    }
}

impl<S: ImportSystem + ?Sized> ImportSystem for &S {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn search_paths(&self) -> &[PathBuf] {
        (**self).search_paths()
    }

    fn import_module(&self, name: &str) -> Result<ImportOutcome> {
        (**self).import_module(name)
    }

    fn find_spec(&self, name: &ModuleName) -> std::result::Result<ModuleSpec, LookupError> {
        (**self).find_spec(name)
    }

    fn iter_submodules(
        &self,
        search_locations: &[PathBuf],
    ) -> std::result::Result<Vec<Submodule>, LookupError> {
        (**self).iter_submodules(search_locations)
    }

    fn find_module_file_path(&self, name: &ModuleName) -> io::Result<Option<PathBuf>> {
        (**self).find_module_file_path(name)
    }
}

/// Direct child of a package, as reported by submodule enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    /// Unqualified name (`"sub"`, not `"pkg.sub"`)
    pub name: String,
    pub is_package: bool,
}

impl Submodule {
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_package: false,
        }
    }

    pub fn package(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_package: true,
        }
    }
}

/// The spec lookup mechanism itself failed.
///
/// Expected during diagnosis and handled like "spec not found".
#[derive(Debug)]
pub enum LookupError {
    /// Filesystem probing failed
    Io { path: PathBuf, source: io::Error },

    /// Name cannot be looked up at all
    InvalidName(importdoc_types::Error),

    /// Finder-specific failure (malformed package metadata, unsupported loader)
    Failed(String),
}

impl LookupError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        LookupError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Io { path, source } => {
                write!(f, "cannot probe {}: {}", path.display(), source)
            }
            LookupError::InvalidName(err) => write!(f, "{}", err),
            LookupError::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Io { source, .. } => Some(source),
            LookupError::InvalidName(err) => Some(err),
            LookupError::Failed(_) => None,
        }
    }
}

impl From<importdoc_types::Error> for LookupError {
    fn from(err: importdoc_types::Error) -> Self {
        LookupError::InvalidName(err)
    }
}
