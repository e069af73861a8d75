//! On-disk fixtures.
//!
//! Provides utilities to:
//! - Lay out package trees in a temporary site directory
//! - Install a scripted stand-in for the Python interpreter

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding Python packages and modules.
///
/// # Example
/// ```no_run
/// use importdoc_testing::PackageTree;
///
/// let tree = PackageTree::new()
///     .package("pkg")
///     .module("pkg/util.py")
///     .namespace("ns");
/// assert!(tree.path("pkg/__init__.py").exists());
/// ```
pub struct PackageTree {
    temp_dir: TempDir,
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Root of the tree; use it as a search path entry.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Regular package: `<relative>/__init__.py`.
    pub fn package(self, relative_dir: &str) -> Self {
        self.write(&format!("{}/__init__.py", relative_dir), "");
        self
    }

    /// Module file at `relative` (e.g. `"pkg/util.py"`).
    pub fn module(self, relative: &str) -> Self {
        self.write(relative, "");
        self
    }

    /// Namespace package portion: a bare directory.
    pub fn namespace(self, relative_dir: &str) -> Self {
        fs::create_dir_all(self.path(relative_dir)).expect("Failed to create namespace dir");
        self
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Symlink `relative` to `target`, another path inside the tree.
    #[cfg(unix)]
    pub fn symlink(self, relative: &str, target: &str) -> Self {
        let link = self.path(relative);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::os::unix::fs::symlink(self.path(target), link).expect("Failed to create symlink");
        self
    }

    /// Set the permission bits of `relative`.
    #[cfg(unix)]
    pub fn chmod(&self, relative: &str, mode: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path(relative);
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))
            .expect("Failed to set permissions");
        path
    }
}

/// Shell script standing in for `python`.
///
/// It answers the `sys.path` probe with the configured search path, and
/// answers `import_module` attempts from a fixed table: importable names exit
/// 0, everything else prints a traceback and exits 1.
#[derive(Debug, Clone)]
pub struct FakeInterpreter {
    version: String,
    importable: Vec<String>,
    failures: Vec<(String, String)>,
}

impl Default for FakeInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeInterpreter {
    pub fn new() -> Self {
        Self {
            version: "3.12.0".to_string(),
            importable: vec!["os".to_string(), "sys".to_string(), "json".to_string()],
            failures: Vec::new(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn importable(mut self, name: &str) -> Self {
        self.importable.push(name.to_string());
        self
    }

    /// Importing `name` fails with `error_line` (`"Exception: message"`).
    pub fn failing(mut self, name: &str, error_line: &str) -> Self {
        self.failures
            .push((name.to_string(), error_line.to_string()));
        self
    }

    /// Write the script as `<bin_dir>/python` and make it executable.
    #[cfg(unix)]
    pub fn install(&self, bin_dir: &Path, search_paths: &[PathBuf]) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(bin_dir)?;
        let script_path = bin_dir.join("python");

        let probe = serde_json::json!({
            "version": self.version,
            "executable": script_path.display().to_string(),
            "path": search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
        });

        let mut script = String::from("#!/bin/sh\n");
        script.push_str("case \"$2\" in\n");
        script.push_str(&format!(
            "  *sys.path*) printf '%s\\n' {}; exit 0 ;;\n",
            shell_quote(&probe.to_string())
        ));
        script.push_str("esac\n");
        script.push_str("case \"$3\" in\n");
        for name in &self.importable {
            script.push_str(&format!("  {}) exit 0 ;;\n", shell_quote(name)));
        }
        for (name, error_line) in &self.failures {
            script.push_str(&format!(
                "  {}) echo 'Traceback (most recent call last):' >&2; printf '%s\\n' {} >&2; exit 1 ;;\n",
                shell_quote(name),
                shell_quote(error_line)
            ));
        }
        script.push_str(
            "  *) echo 'Traceback (most recent call last):' >&2; echo \"ModuleNotFoundError: No module named '$3'\" >&2; exit 1 ;;\n",
        );
        script.push_str("esac\n");

        fs::write(&script_path, script)
            .with_context(|| format!("Failed to write {}", script_path.display()))?;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;

        Ok(script_path)
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_tree_layout() {
        let tree = PackageTree::new()
            .package("pkg")
            .module("pkg/util.py")
            .namespace("ns");

        assert!(tree.path("pkg/__init__.py").is_file());
        assert!(tree.path("pkg/util.py").is_file());
        assert!(tree.path("ns").is_dir());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }
}
