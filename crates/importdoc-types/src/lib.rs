pub mod error;
pub mod name;
pub mod outcome;
pub mod report;
pub mod spec;

pub use error::{Error, Result};
pub use name::{ModuleName, is_identifier};
pub use outcome::{FailureKind, ImportFailure, ImportOutcome, categorize_import_error};
pub use report::{DiagnosticReport, Finding, Severity};
pub use spec::ModuleSpec;
