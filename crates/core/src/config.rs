//! Invocation options
//!
//! Raw, not-yet-validated settings for one preflight run. Target and mode stay
//! strings here; the toolchain crate turns them into closed enumerations.

use std::path::PathBuf;

/// Default target triple
pub const DEFAULT_TARGET: &str = "aarch64-linux-android";

/// Default validation mode
pub const DEFAULT_MODE: &str = "auto";

/// Options for a single preflight run
#[derive(Debug, Clone)]
pub struct PreflightOptions {
    /// Requested target triple
    pub target: String,
    /// Requested validation mode
    pub mode: String,
    /// Run the build-check command after preflight
    pub run_check: bool,
    /// Diagnose an existing log instead of probing the live toolchain
    pub diagnose_log: Option<PathBuf>,
    /// Where to write the JSON report, if anywhere
    pub report_output: Option<PathBuf>,
    /// Project root holding `.cargo/config.toml`
    pub project_dir: PathBuf,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            mode: DEFAULT_MODE.to_string(),
            run_check: false,
            diagnose_log: None,
            report_output: None,
            project_dir: PathBuf::from("."),
        }
    }
}

impl PreflightOptions {
    /// Only a captured log is being diagnosed; live toolchain probes are skipped
    pub fn is_diagnose_only(&self) -> bool {
        self.diagnose_log.is_some()
    }
}
