use crate::finder::PathFinder;
use crate::{Error, Result};
use importdoc_engine::{ImportSystem, LookupError, Submodule};
use importdoc_types::{ImportFailure, ImportOutcome, ModuleName, ModuleSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const PROBE_SCRIPT: &str = "import json, sys; \
print(json.dumps({'version': sys.version.split()[0], 'executable': sys.executable, 'path': sys.path}))";

const IMPORT_SCRIPT: &str = "import importlib, sys; importlib.import_module(sys.argv[1])";

#[derive(Debug, Deserialize)]
struct InterpreterProbe {
    version: String,
    executable: String,
    path: Vec<String>,
}

/// Import system backed by a real Python interpreter.
///
/// Imports run in a child interpreter so nothing the target executes can
/// touch this process. Spec lookup and submodule enumeration run in-process
/// over the interpreter's `sys.path`, read once at construction.
#[derive(Debug, Clone)]
pub struct PythonEnvironment {
    interpreter: PathBuf,
    version: String,
    executable: String,
    finder: PathFinder,
}

impl PythonEnvironment {
    /// Ask `interpreter` for its version and `sys.path`.
    pub fn detect(interpreter: &Path) -> Result<Self> {
        debug!(interpreter = %interpreter.display(), "probing interpreter");

        let output = Command::new(interpreter)
            .arg("-c")
            .arg(PROBE_SCRIPT)
            .output()
            .map_err(|err| {
                Error::Interpreter(format!(
                    "cannot run '{}': {}",
                    interpreter.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Interpreter(format!(
                "'{}' exited with {} while reading sys.path: {}",
                interpreter.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let probe: InterpreterProbe = serde_json::from_slice(&output.stdout)?;
        let cwd = std::env::current_dir()?;
        let search_paths = probe
            .path
            .iter()
            .map(|entry| {
                if entry.is_empty() {
                    cwd.clone()
                } else {
                    PathBuf::from(entry)
                }
            })
            .collect::<Vec<_>>();
        debug!(version = %probe.version, entries = search_paths.len(), "interpreter detected");

        Ok(Self {
            interpreter: interpreter.to_path_buf(),
            version: probe.version,
            executable: probe.executable,
            finder: PathFinder::new(search_paths),
        })
    }

    /// Environment with a known search path; the interpreter is only run for imports.
    pub fn with_search_paths(interpreter: impl Into<PathBuf>, search_paths: Vec<PathBuf>) -> Self {
        let interpreter = interpreter.into();
        Self {
            executable: interpreter.display().to_string(),
            interpreter,
            version: "unknown".to_string(),
            finder: PathFinder::new(search_paths),
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl ImportSystem for PythonEnvironment {
    fn describe(&self) -> String {
        format!("Python {} ({})", self.version, self.executable)
    }

    fn search_paths(&self) -> &[PathBuf] {
        self.finder.search_paths()
    }

    fn import_module(&self, name: &str) -> importdoc_engine::Result<ImportOutcome> {
        debug!(module = name, "attempting import");

        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(IMPORT_SCRIPT)
            .arg(name)
            .output()
            .map_err(|err| {
                importdoc_engine::Error::ImportSystem(format!(
                    "cannot run '{}': {}",
                    self.interpreter.display(),
                    err
                ))
            })?;

        if output.status.success() {
            return Ok(ImportOutcome::Imported);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let traceback = if stderr.trim().is_empty() {
            format!("interpreter exited with {}", output.status)
        } else {
            stderr.into_owned()
        };
        Ok(ImportOutcome::Failed(ImportFailure::from_traceback(&traceback)))
    }

    fn find_module_file_path(&self, name: &ModuleName) -> std::io::Result<Option<PathBuf>> {
        self.finder.find_module_file(name)
    }

    fn find_spec(&self, name: &ModuleName) -> std::result::Result<ModuleSpec, LookupError> {
        self.finder.find_spec(name)
    }

    fn iter_submodules(
        &self,
        search_locations: &[PathBuf],
    ) -> std::result::Result<Vec<Submodule>, LookupError> {
        self.finder.iter_submodules(search_locations)
    }
}
