//! Unified error handling for templix
//!
//! This module provides a centralized error type so the loader, the
//! compiler adapter, and the executor do not depend on each other for
//! error handling. Errors are reported through a unit's `error` signal,
//! never thrown across an await point.

use std::fmt;
use std::io;

/// Unified error types for the template pipeline
#[derive(Debug)]
pub enum TemplateError {
    /// File metadata or content could not be read
    Io(io::Error),

    /// The template source is malformed
    Compile {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// The compiled body failed during execution
    Runtime(String),

    /// Configuration-related errors
    Configuration(String),
}

impl TemplateError {
    /// Whether this error denotes a missing source file.
    ///
    /// Semantic replacement for the OS errno comparison; the dispatcher
    /// uses it to pick 404 over 500.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }

    /// Shorthand for a compile error without a source location.
    pub fn compile(message: impl Into<String>) -> Self {
        TemplateError::Compile {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Io(err) => write!(f, "I/O error: {err}"),
            TemplateError::Compile {
                message,
                line: Some(line),
                column: Some(column),
            } => write!(f, "Compile error at {line}:{column}: {message}"),
            TemplateError::Compile {
                message,
                line: Some(line),
                ..
            } => write!(f, "Compile error at line {line}: {message}"),
            TemplateError::Compile { message, .. } => write!(f, "Compile error: {message}"),
            TemplateError::Runtime(msg) => write!(f, "Runtime error: {msg}"),
            TemplateError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TemplateError {
    fn from(err: io::Error) -> Self {
        TemplateError::Io(err)
    }
}

/// Result type alias for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Helper trait for adding context to configuration errors
pub trait ErrorContext<T> {
    fn with_context(self, context: &str) -> TemplateResult<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn with_context(self, context: &str) -> TemplateResult<T> {
        self.map_err(|e| TemplateError::Configuration(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let missing: TemplateError = io::Error::new(io::ErrorKind::NotFound, "no such file").into();
        assert!(missing.is_not_found());

        let denied: TemplateError =
            io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!denied.is_not_found());

        assert!(!TemplateError::compile("bad syntax").is_not_found());
    }

    #[test]
    fn test_display_includes_location() {
        let err = TemplateError::Compile {
            message: "unexpected token".to_string(),
            line: Some(3),
            column: Some(14),
        };
        assert_eq!(err.to_string(), "Compile error at 3:14: unexpected token");
    }
}
