use std::fmt;

/// Result type for importdoc-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Internal errors of the diagnostic engine.
///
/// A failed import or a failed spec lookup is never an `Error`; both are
/// diagnosed and reported. These variants mean the tool itself could not work.
#[derive(Debug)]
pub enum Error {
    /// Exclusion pattern failed to compile
    Pattern { pattern: String, source: regex::Error },

    /// Import system could not perform the import attempt (interpreter missing, crashed on spawn)
    ImportSystem(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pattern { pattern, source } => {
                write!(f, "Invalid exclusion pattern '{}': {}", pattern, source)
            }
            Error::ImportSystem(msg) => write!(f, "Import system error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pattern { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            Error::ImportSystem(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
