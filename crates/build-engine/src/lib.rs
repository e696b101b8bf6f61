//! Build check and failure diagnosis
//!
//! Runs the optional `cargo check` for an Android target and maps captured
//! failure logs onto known failure classes with remediation steps.

pub mod diagnose;
pub mod runner;

pub use diagnose::{DiagnosisContext, DiagnosticEngine, Rule, RULES, RULE_TABLE_VERSION};
pub use runner::{CheckOutcome, CheckRunner};

use std::path::PathBuf;

use droid_preflight_core::PreflightError;

/// Build check errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Build log not found: {}", .0.display())]
    LogNotFound(PathBuf),
    #[error("Invalid signature in rule '{rule}': {source}")]
    Signature {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BuildError> for PreflightError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::LogNotFound(_) => PreflightError::InvalidArgument(err.to_string()),
            BuildError::Io(e) => PreflightError::Io(e),
            BuildError::Signature { .. } => PreflightError::InvalidArgument(err.to_string()),
        }
    }
}
