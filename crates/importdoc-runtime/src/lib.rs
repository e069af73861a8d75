pub mod config;
pub mod doctor;
pub mod error;
pub mod finder;
pub mod privilege;
pub mod python;

pub use config::{Config, resolve_config_path};
pub use doctor::{DiagnoseOptions, DiagnoseOutcome, DoctorService};
pub use error::{Error, Result};
pub use finder::PathFinder;
pub use python::PythonEnvironment;
