use std::fmt;

/// Errors raised by state canonicalization, selector resolution, and
/// script execution.
#[derive(Debug)]
pub enum UiError {
    /// Selector still unresolved after one dependency-recovery attempt.
    /// Recoverable by the caller (typically surfaced as a script-fix request).
    ElementNotFound { selector: String, context: String },

    /// The execution-scoped action budget ran out. Fatal to the current
    /// script execution, never retried.
    ActionBudgetExceeded { limit: u32 },

    /// Malformed index, match argument, or XPath expression.
    InvalidSelector(String),

    /// Authored script failed to expand or parse. The line number refers to
    /// the original authored script.
    ScriptSyntax { line: usize, message: String },

    /// The observation provider or action dispatcher reported failure.
    Device(String),

    /// JSON parsing failed (observation frame, catalog, match criterion)
    JsonParse { context: String, source: serde_json::Error },

    /// YAML parsing failed (catalog or config file)
    YamlParse { context: String, source: serde_yaml::Error },

    /// Filesystem access failed
    Io { context: String, source: std::io::Error },
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::ElementNotFound { selector, context } => {
                write!(f, "Element '{}' not found: {}", selector, context)
            }
            UiError::ActionBudgetExceeded { limit } => {
                write!(
                    f,
                    "Action count exceeds the maximum limit of {}. The script may be stuck in an infinite loop.",
                    limit
                )
            }
            UiError::InvalidSelector(msg) => {
                write!(f, "Invalid selector: {}", msg)
            }
            UiError::ScriptSyntax { line, message } => {
                write!(f, "Script syntax error at line {}: {}", line + 1, message)
            }
            UiError::Device(msg) => {
                write!(f, "Device error: {}", msg)
            }
            UiError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            UiError::YamlParse { context, source } => {
                write!(f, "YAML parse error ({}): {}", context, source)
            }
            UiError::Io { context, source } => {
                write!(f, "IO error ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::JsonParse { source, .. } => Some(source),
            UiError::YamlParse { source, .. } => Some(source),
            UiError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl UiError {
    /// Budget exhaustion must abort the whole execution; everything else is
    /// at most statement-fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UiError::ActionBudgetExceeded { .. })
    }
}
