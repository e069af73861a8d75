use crate::types::{LogLevel, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "importdoc")]
#[command(about = "Explain why a Python module fails to import", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dotted module name to diagnose (e.g. "mypkg.sub")
    pub module_name: String,

    /// Directory the package is expected to live in
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Do not warn when running as root
    #[arg(long)]
    pub allow_root: bool,

    /// Regular expression; matching submodules are skipped during discovery (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Maximum package nesting to descend into below the target
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Python interpreter to diagnose against
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Configuration file (default: ./importdoc.toml, then the user config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    #[arg(long, default_value = "plain")]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["importdoc", "mypkg"]).unwrap();
        assert_eq!(cli.module_name, "mypkg");
        assert_eq!(cli.format, OutputFormat::Plain);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert!(!cli.allow_root);
        assert!(cli.exclude.is_empty());
    }

    #[test]
    fn test_parse_repeated_exclude() {
        let cli = Cli::try_parse_from([
            "importdoc",
            "mypkg",
            "--exclude",
            "tests",
            "--exclude",
            "^mypkg\\.vendored",
            "--max-depth",
            "2",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.exclude, vec!["tests", "^mypkg\\.vendored"]);
        assert_eq!(cli.max_depth, Some(2));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_module_name_required() {
        assert!(Cli::try_parse_from(["importdoc"]).is_err());
    }
}
