use crate::args::Cli;
use crate::presentation::{ConsoleReporter, print_summary};
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use importdoc_engine::SilentReporter;
use importdoc_runtime::{Config, DiagnoseOptions, DoctorService};
use tracing::debug;

/// Run one diagnosis. `Ok(true)` iff the module imported.
pub fn run(cli: Cli) -> Result<bool> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");

    let options = DiagnoseOptions {
        module: cli.module_name,
        package_dir: cli.package_dir,
        python: cli.python,
        allow_root: cli.allow_root,
        exclude: cli.exclude,
        max_depth: cli.max_depth,
    }
    .merge_config(&config);

    match cli.format {
        OutputFormat::Plain => {
            let outcome = DoctorService::diagnose(&options, ConsoleReporter::stdout())
                .with_context(|| format!("Failed to diagnose '{}'", options.module))?;
            print_summary(&outcome.report);
            Ok(outcome.imported)
        }
        OutputFormat::Json => {
            let outcome = DoctorService::diagnose(&options, SilentReporter)
                .with_context(|| format!("Failed to diagnose '{}'", options.module))?;
            println!("{}", outcome.report.to_json()?);
            Ok(outcome.imported)
        }
    }
}
