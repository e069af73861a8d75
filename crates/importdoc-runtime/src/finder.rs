//! Path-based spec finder.
//!
//! Resolves module specs over a fixed list of search locations the same way
//! the interpreter's path finder does, without running any Python:
//! a top-level name is looked up on the search path, a dotted name inside its
//! parent package's search locations. Regular packages win immediately;
//! namespace portions are collected across all locations and only used when
//! nothing else matches.
//!
//! Directory contents are read once per finder and shared by every lookup,
//! so a finder sees the filesystem as it was when a directory was first read.

use importdoc_engine::locator::Candidate;
use importdoc_engine::{DirectoryCache, LookupError, Submodule};
use importdoc_types::{ModuleName, ModuleSpec, is_identifier};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    search_paths: Vec<PathBuf>,
    cache: DirectoryCache,
}

impl PathFinder {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: DirectoryCache::new(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn find_spec(&self, name: &ModuleName) -> Result<ModuleSpec, LookupError> {
        let locations = match name.parent() {
            None => self.search_paths.clone(),
            Some(parent) => match self.find_spec(&parent)? {
                ModuleSpec::Package {
                    search_locations, ..
                } => search_locations,
                ModuleSpec::Leaf { .. } | ModuleSpec::NotFound => return Ok(ModuleSpec::NotFound),
            },
        };

        let mut namespace_portions = Vec::new();
        for location in &locations {
            trace!(module = %name, location = %location.display(), "find_spec");
            let candidate = self
                .cache
                .lookup(location, name.last())
                .map_err(|err| LookupError::io(location, err))?;

            match candidate {
                Some(Candidate::Package(init)) => {
                    let package_dir = location.join(name.last());
                    return Ok(ModuleSpec::Package {
                        origin: Some(init),
                        search_locations: vec![package_dir],
                    });
                }
                Some(Candidate::Module(origin)) => return Ok(ModuleSpec::Leaf { origin }),
                Some(Candidate::Namespace(dir)) => namespace_portions.push(dir),
                None => {}
            }
        }

        if namespace_portions.is_empty() {
            Ok(ModuleSpec::NotFound)
        } else {
            Ok(ModuleSpec::Package {
                origin: None,
                search_locations: namespace_portions,
            })
        }
    }

    /// File that would back `name`, using this finder's directory listings.
    pub fn find_module_file(&self, name: &ModuleName) -> std::io::Result<Option<PathBuf>> {
        self.cache.find_module_file(name, &self.search_paths)
    }

    /// Direct children of a package: regular subpackages and module files.
    ///
    /// Like `pkgutil.iter_modules`, namespace subdirectories are not listed,
    /// missing locations are ignored and the first location wins on duplicate
    /// names. Symlinked entries count as what they point to.
    pub fn iter_submodules(&self, search_locations: &[PathBuf]) -> Result<Vec<Submodule>, LookupError> {
        let mut seen = HashSet::new();
        let mut children = Vec::new();

        for location in search_locations {
            let Some(listing) = self
                .cache
                .listing(location)
                .map_err(|err| LookupError::io(location, err))?
            else {
                continue;
            };

            let mut found = Vec::new();
            for dir in listing.dirs.iter().filter(|dir| is_identifier(dir)) {
                let package_dir = location.join(dir);
                let init = self
                    .cache
                    .find_init(&package_dir)
                    .map_err(|err| LookupError::io(&package_dir, err))?;
                if init.is_some() {
                    found.push(Submodule::package(dir.as_str()));
                }
            }
            found.extend(
                listing
                    .files
                    .iter()
                    .filter_map(|file| module_name_of(file))
                    .map(Submodule::module),
            );
            found.sort_by(|a, b| a.name.cmp(&b.name));

            for child in found {
                if seen.insert(child.name.clone()) {
                    children.push(child);
                }
            }
        }

        Ok(children)
    }
}

/// `util.py` → `util`, `_speedups.cpython-312-x86_64-linux-gnu.so` → `_speedups`.
/// `__init__` files and non-identifiers are not submodules.
fn module_name_of(file_name: &str) -> Option<&str> {
    let (stem, extension) = file_name.split_once('.')?;
    let is_module_file = match extension.rsplit('.').next() {
        Some("py") | Some("pyc") => !extension.contains('.'),
        Some("so") | Some("pyd") => true,
        _ => false,
    };

    if is_module_file && stem != "__init__" && is_identifier(stem) {
        Some(stem)
    } else {
        None
    }
}
