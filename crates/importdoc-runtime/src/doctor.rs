use crate::config::Config;
use crate::privilege;
use crate::python::PythonEnvironment;
use crate::Result;
use importdoc_engine::{DiagnosticSession, Reporter, SessionConfig};
use importdoc_types::DiagnosticReport;
use std::path::PathBuf;
use tracing::debug;

/// One diagnosis request, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct DiagnoseOptions {
    pub module: String,
    pub package_dir: Option<PathBuf>,
    pub python: Option<String>,
    pub allow_root: bool,
    pub exclude: Vec<String>,
    pub max_depth: Option<usize>,
}

impl DiagnoseOptions {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    /// Fill in settings from a config file.
    ///
    /// `allow_root` is OR-ed, config patterns come before flag patterns,
    /// `python` and `max_depth` from flags win.
    pub fn merge_config(mut self, config: &Config) -> Self {
        self.allow_root |= config.allow_root;

        let mut exclude = config.exclude.clone();
        exclude.append(&mut self.exclude);
        self.exclude = exclude;

        self.max_depth = self.max_depth.or(config.max_depth);
        let interpreter = config.resolve_interpreter(self.python.as_deref());
        self.python = Some(interpreter.display().to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct DiagnoseOutcome {
    pub imported: bool,
    pub report: DiagnosticReport,
}

pub struct DoctorService;

impl DoctorService {
    /// Detect the interpreter and run a full diagnosis of `options.module`.
    pub fn diagnose<R: Reporter>(options: &DiagnoseOptions, reporter: R) -> Result<DiagnoseOutcome> {
        let interpreter = Config::default().resolve_interpreter(options.python.as_deref());
        let environment = PythonEnvironment::detect(&interpreter)?;
        Self::diagnose_with(&environment, options, reporter)
    }

    /// Run a diagnosis against an already detected environment.
    pub fn diagnose_with<R: Reporter>(
        environment: &PythonEnvironment,
        options: &DiagnoseOptions,
        reporter: R,
    ) -> Result<DiagnoseOutcome> {
        let config = SessionConfig {
            allow_root: options.allow_root,
            exclude_patterns: options.exclude.clone(),
            max_depth: options.max_depth,
            privileged: privilege::is_root(),
        };

        let mut session = DiagnosticSession::new(environment, reporter, config)?;
        let imported = session.run_diagnostic(&options.module, options.package_dir.as_deref())?;
        debug!(
            module = %options.module,
            imported,
            discovered = session.discovered_modules().len(),
            "diagnosis finished"
        );

        Ok(DiagnoseOutcome {
            imported,
            report: session.report(),
        })
    }
}
