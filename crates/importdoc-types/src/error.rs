use std::fmt;

/// Result type for importdoc-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Module name has a segment that is not an identifier (".os", "a/b", "a-b")
    InvalidModuleName(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidModuleName(name) => write!(f, "Invalid module name: '{}'", name),
        }
    }
}

impl std::error::Error for Error {}
