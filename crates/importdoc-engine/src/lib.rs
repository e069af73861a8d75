// Engine module - Core diagnosis logic (import attempt, validation, discovery, root-causing)
// This layer sits between the import system (runtime) and CLI presentation

pub mod error;
pub mod exclusion;
pub mod locator;
pub mod reporter;
pub mod session;
pub mod system;

pub use error::{Error, Result};
pub use exclusion::ExclusionFilter;
pub use locator::{
    DirectoryCache, find_case_insensitive_match, find_module_file_path, permission_string,
};
pub use reporter::{Reporter, SilentReporter};
pub use session::{DiagnosticSession, SessionConfig};
pub use system::{ImportSystem, LookupError, Submodule};
