use serde::Serialize;

/// Result of attempting to import a module.
///
/// A failed import is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Imported,
    Failed(ImportFailure),
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported)
    }
}

/// Exception raised by an import attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Exception class name (`ModuleNotFoundError`, `ImportError`, ...).
    pub exception: String,
    /// Exception message as printed by the interpreter.
    pub message: String,
    pub kind: FailureKind,
}

impl ImportFailure {
    /// Build a failure from a traceback, using its last non-empty line.
    ///
    /// Falls back to an `Other` failure carrying the raw text when the
    /// traceback does not end in an `Exception: message` line.
    pub fn from_traceback(traceback: &str) -> Self {
        let last_line = traceback
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        categorize_import_error(last_line)
    }
}

impl std::fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.exception)
        } else {
            write!(f, "{}: {}", self.exception, self.message)
        }
    }
}

/// Category of import failure.
///
/// Used to pick the follow-up diagnosis and the hint shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "module", rename_all = "snake_case")]
pub enum FailureKind {
    /// `No module named '<name>'`; the missing name may be a dependency of the target.
    ModuleNotFound(String),
    /// The module was found but a name inside it could not be imported.
    ImportError,
    /// Module source failed to compile.
    SyntaxError,
    /// Any other exception raised while executing module-level code.
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ModuleNotFound(name) => write!(f, "module_not_found ({})", name),
            FailureKind::ImportError => write!(f, "import_error"),
            FailureKind::SyntaxError => write!(f, "syntax_error"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

/// Categorize the final `Exception: message` line of a traceback.
pub fn categorize_import_error(error_line: &str) -> ImportFailure {
    let (exception, message) = match error_line.split_once(": ") {
        Some((exception, message)) if is_exception_name(exception) => {
            (exception.to_string(), message.to_string())
        }
        _ if is_exception_name(error_line) => (error_line.to_string(), String::new()),
        _ => {
            return ImportFailure {
                exception: "UnknownError".to_string(),
                message: error_line.to_string(),
                kind: FailureKind::Other,
            };
        }
    };

    let short_name = exception.rsplit('.').next().unwrap_or(&exception);
    let kind = match short_name {
        "ModuleNotFoundError" => match extract_module_name(&message) {
            Some(name) => FailureKind::ModuleNotFound(name),
            None => FailureKind::ImportError,
        },
        "ImportError" => FailureKind::ImportError,
        "SyntaxError" | "IndentationError" | "TabError" => FailureKind::SyntaxError,
        _ => FailureKind::Other,
    };

    ImportFailure {
        exception,
        message,
        kind,
    }
}

/// `No module named 'foo.bar'` → `foo.bar`
fn extract_module_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("No module named ")?;
    let rest = rest.trim_matches(|c| c == '\'' || c == '"');
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_string())
}

/// Dotted identifier such as `ImportError` or `pkg.errors.ConfigError`.
fn is_exception_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}
