//! Error types for droid-preflight
//! 
//! Centralized error handling using thiserror.

use serde::Serialize;
use thiserror::Error;

/// Fatal error raised by any stage of a preflight run
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported target '{0}'")]
    UnsupportedTarget(String),

    #[error("Unsupported mode '{0}' (expected auto, native-in-place or cross-from-host)")]
    UnsupportedMode(String),

    #[error("Missing dependency: {what}. {hint}")]
    MissingDependency { what: String, hint: String },

    #[error("Tool not executable: {0}")]
    ToolNotExecutable(String),

    #[error("Check command `{command}` failed{}", exit_suffix(.code))]
    ExternalCheckFailed { command: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

/// Result type alias for preflight operations
pub type Result<T> = std::result::Result<T, PreflightError>;

/// Closed error classification written into reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    MissingDependency,
    ToolNotExecutable,
    ExternalCheckFailed,
    Io,
}

impl PreflightError {
    /// Classify this error for the report
    pub fn kind(&self) -> ErrorKind {
        match self {
            PreflightError::InvalidArgument(_)
            | PreflightError::UnsupportedTarget(_)
            | PreflightError::UnsupportedMode(_) => ErrorKind::InvalidArgument,
            PreflightError::MissingDependency { .. } => ErrorKind::MissingDependency,
            PreflightError::ToolNotExecutable(_) => ErrorKind::ToolNotExecutable,
            PreflightError::ExternalCheckFailed { .. } => ErrorKind::ExternalCheckFailed,
            PreflightError::Io(_) | PreflightError::Json(_) => ErrorKind::Io,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PreflightError::Io(e) => format!("File operation failed: {}", e),
            PreflightError::Json(e) => format!("Could not serialize report: {}", e),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_argument_errors() {
        assert_eq!(PreflightError::UnsupportedTarget("x".into()).kind(), ErrorKind::InvalidArgument);
        assert_eq!(PreflightError::UnsupportedMode("y".into()).kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            PreflightError::ToolNotExecutable("clang".into()).kind(),
            ErrorKind::ToolNotExecutable
        );
    }

    #[test]
    fn test_check_failure_message() {
        let err = PreflightError::ExternalCheckFailed {
            command: "cargo check".into(),
            code: Some(101),
        };
        assert_eq!(err.user_message(), "Check command `cargo check` failed with exit code 101");

        let killed = PreflightError::ExternalCheckFailed { command: "cargo check".into(), code: None };
        assert!(killed.to_string().ends_with("(terminated by signal)"));
    }
}
