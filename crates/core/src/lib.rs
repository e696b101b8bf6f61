//! droid-preflight core - shared types
//! 
//! Error taxonomy, the findings accumulator and invocation options used by
//! every stage of a preflight run.

pub mod config;
pub mod error;
pub mod findings;

pub use config::PreflightOptions;
pub use error::{ErrorKind, PreflightError, Result};
pub use findings::Findings;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
