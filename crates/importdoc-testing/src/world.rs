//! TestWorld pattern for CLI integration tests.
//!
//! Provides a fluent interface for:
//! - Creating an isolated environment (HOME, config dir, working directory)
//! - Laying out a site directory with packages
//! - Installing a fake interpreter whose search path is that site directory
//! - Executing the `importdoc` binary against it

use crate::fixtures::{FakeInterpreter, PackageTree};
use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use importdoc_testing::TestWorld;
///
/// let world = TestWorld::new().with_package("mypkg");
/// let result = world.run(&["mypkg"]).unwrap();
/// assert_eq!(result.code(), Some(1));
/// ```
pub struct TestWorld {
    site: PackageTree,
    home: tempfile::TempDir,
    cwd: PathBuf,
    interpreter: FakeInterpreter,
    extra_search_paths: Vec<PathBuf>,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let home = tempfile::TempDir::new().expect("Failed to create temp dir");
        let cwd = home.path().join("work");
        std::fs::create_dir_all(&cwd).expect("Failed to create working dir");

        Self {
            site: PackageTree::new(),
            home,
            cwd,
            interpreter: FakeInterpreter::new(),
            extra_search_paths: Vec::new(),
            env_vars: HashMap::new(),
        }
    }

    /// The site directory (first search path entry of the fake interpreter).
    pub fn site(&self) -> &Path {
        self.site.root()
    }

    pub fn with_package(self, relative_dir: &str) -> Self {
        Self {
            site: self.site.package(relative_dir),
            ..self
        }
    }

    pub fn with_module(self, relative: &str) -> Self {
        Self {
            site: self.site.module(relative),
            ..self
        }
    }

    /// Symlink `relative` to `target` inside the site directory.
    #[cfg(unix)]
    pub fn with_symlink(self, relative: &str, target: &str) -> Self {
        Self {
            site: self.site.symlink(relative, target),
            ..self
        }
    }

    pub fn with_interpreter(mut self, interpreter: FakeInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Append a search path entry after the site directory.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_search_paths.push(path.into());
        self
    }

    /// Write `importdoc.toml` into the working directory.
    pub fn with_config(self, contents: &str) -> Self {
        std::fs::write(self.cwd.join("importdoc.toml"), contents)
            .expect("Failed to write config");
        self
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Install the fake interpreter and return its path.
    #[cfg(unix)]
    pub fn python(&self) -> Result<PathBuf> {
        let mut search_paths = vec![self.site.root().to_path_buf()];
        search_paths.extend(self.extra_search_paths.iter().cloned());
        self.interpreter
            .install(&self.home.path().join("bin"), &search_paths)
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// Does not pass `--python`; callers that want the fake interpreter use `run`.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(&self.cwd)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("IMPORTDOC_CONFIG")
            .env_remove("IMPORTDOC_PYTHON")
            .env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run `importdoc` with the fake interpreter and `args`.
    #[cfg(unix)]
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let python = self.python()?;
        let mut cmd = Command::cargo_bin("importdoc")
            .map_err(|e| anyhow::anyhow!("Failed to find importdoc binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.arg("--python").arg(&python);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, `None` when killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
