mod args;
mod commands;
pub mod logging;
pub mod presentation;
pub mod types;

pub use args::Cli;
pub use commands::run;
