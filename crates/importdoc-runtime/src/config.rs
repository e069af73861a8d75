use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_INTERPRETER: &str = "python3";

/// Resolve the configuration file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. IMPORTDOC_CONFIG environment variable (with tilde expansion)
/// 3. ./importdoc.toml, if it exists
/// 4. XDG config directory
///
/// Returns `None` when no candidate applies; defaults are used then.
pub fn resolve_config_path(explicit_path: Option<&str>) -> Option<PathBuf> {
    // Priority 1: Explicit path
    if let Some(path) = explicit_path {
        return Some(expand_tilde(path));
    }

    // Priority 2: IMPORTDOC_CONFIG environment variable
    if let Ok(env_path) = std::env::var("IMPORTDOC_CONFIG")
        && !env_path.is_empty()
    {
        return Some(expand_tilde(&env_path));
    }

    // Priority 3: project-local file
    let local = PathBuf::from("importdoc.toml");
    if local.is_file() {
        return Some(local);
    }

    // Priority 4: XDG config directory
    dirs::config_dir().map(|dir| dir.join("importdoc").join("config.toml"))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interpreter used for import attempts
    #[serde(default)]
    pub python: Option<String>,

    #[serde(default)]
    pub allow_root: bool,

    /// Module name patterns skipped during discovery
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Config {
    /// Load from the resolved path; a missing implicit file yields defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) if explicit_path.is_some() => Self::load_required(&path),
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_required(path)
    }

    fn load_required(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        toml::from_str(&content)
            .map_err(|err| Error::Config(format!("invalid {}: {}", path.display(), err)))
    }

    /// Interpreter to run: explicit flag, config file, IMPORTDOC_PYTHON, then `python3`.
    pub fn resolve_interpreter(&self, explicit: Option<&str>) -> PathBuf {
        if let Some(python) = explicit {
            return expand_tilde(python);
        }
        if let Some(python) = &self.python {
            return expand_tilde(python);
        }
        if let Ok(python) = std::env::var("IMPORTDOC_PYTHON")
            && !python.is_empty()
        {
            return expand_tilde(&python);
        }
        PathBuf::from(DEFAULT_INTERPRETER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.python, None);
        assert!(!config.allow_root);
        assert!(config.exclude.is_empty());
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_config_load_from() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
python = "/opt/python/bin/python3"
allow_root = true
exclude = ["\\.tests?$", "^pkg\\.vendored"]
max_depth = 3
"#,
        )?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.python.as_deref(), Some("/opt/python/bin/python3"));
        assert!(config.allow_root);
        assert_eq!(config.exclude, vec!["\\.tests?$", "^pkg\\.vendored"]);
        assert_eq!(config.max_depth, Some(3));
        Ok(())
    }

    #[test]
    fn test_config_partial_file_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "exclude = [\"tests\"]\n")?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.exclude, vec!["tests"]);
        assert!(!config.allow_root);
        assert_eq!(config.python, None);
        Ok(())
    }

    #[test]
    fn test_config_missing_file_is_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_from(&temp_dir.path().join("absent.toml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let result = Config::load(Some("/nonexistent/importdoc/config.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_rejects_unknown_fields() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "exclude_patterns = [\"tests\"]\n")?;

        let result = Config::load_from(&config_path);
        assert!(matches!(result, Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_resolve_config_path_explicit() {
        assert_eq!(
            resolve_config_path(Some("/etc/importdoc.toml")),
            Some(PathBuf::from("/etc/importdoc.toml"))
        );
    }

    #[test]
    fn test_resolve_interpreter_precedence() {
        let config = Config {
            python: Some("/from/config/python".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_interpreter(Some("/from/flag/python")),
            PathBuf::from("/from/flag/python")
        );
        assert_eq!(
            config.resolve_interpreter(None),
            PathBuf::from("/from/config/python")
        );
    }

    #[test]
    fn test_expand_tilde_plain_path() {
        assert_eq!(expand_tilde("/usr/bin/python3"), PathBuf::from("/usr/bin/python3"));
        assert_eq!(expand_tilde("python3"), PathBuf::from("python3"));
    }
}
