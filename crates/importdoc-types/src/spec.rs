use serde::Serialize;
use std::path::{Path, PathBuf};

/// How the import system would load a module, found without executing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleSpec {
    /// No finder on the search path knows the name.
    NotFound,
    /// Plain module: a source file or an extension module. Cannot contain submodules.
    Leaf { origin: PathBuf },
    /// Package with submodule search locations.
    ///
    /// Namespace packages have no `origin` and may span several locations.
    Package {
        origin: Option<PathBuf>,
        search_locations: Vec<PathBuf>,
    },
}

impl ModuleSpec {
    pub fn is_found(&self) -> bool {
        !matches!(self, ModuleSpec::NotFound)
    }

    pub fn is_package(&self) -> bool {
        matches!(self, ModuleSpec::Package { .. })
    }

    pub fn is_namespace_package(&self) -> bool {
        matches!(self, ModuleSpec::Package { origin: None, .. })
    }

    pub fn origin(&self) -> Option<&Path> {
        match self {
            ModuleSpec::NotFound => None,
            ModuleSpec::Leaf { origin } => Some(origin),
            ModuleSpec::Package { origin, .. } => origin.as_deref(),
        }
    }

    /// Locations to enumerate for submodules; `None` for anything but a package.
    pub fn submodule_search_locations(&self) -> Option<&[PathBuf]> {
        match self {
            ModuleSpec::Package {
                search_locations, ..
            } => Some(search_locations),
            _ => None,
        }
    }
}
