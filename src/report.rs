//! Run report
//!
//! One JSON record per invocation. Unpopulated fields serialize as `null`,
//! never as empty strings, and the file is written atomically.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use droid_preflight_core::{ErrorKind, Findings, PreflightError, PreflightOptions};
use droid_preflight_toolchain::{EnvironmentClass, LinkerChain, ResolvedMode};

/// Schema tag written into every report
pub const REPORT_SCHEMA: &str = "droid-preflight.report.v1";

/// Overall outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Snapshot of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub schema: &'static str,
    pub tool_version: &'static str,
    /// RFC 3339, UTC
    pub generated_at: String,
    pub status: RunStatus,
    pub exit_code: i32,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Target exactly as requested
    pub target: String,
    /// Canonical requested mode; null when the mode was not recognised
    pub requested_mode: Option<&'static str>,
    pub effective_mode: Option<ResolvedMode>,
    pub environment: Option<EnvironmentClass>,
    pub linker: Option<LinkerChain>,
    pub diagnose_log: Option<PathBuf>,
    pub check_command: Option<String>,
    pub check_exit_code: Option<i32>,
    #[serde(flatten)]
    pub findings: Findings,
}

/// Stage results gathered while a run progresses
#[derive(Debug, Default)]
pub struct RunState {
    pub findings: Findings,
    pub requested_mode: Option<&'static str>,
    pub effective_mode: Option<ResolvedMode>,
    pub environment: Option<EnvironmentClass>,
    pub linker: Option<LinkerChain>,
    pub check_command: Option<String>,
    pub check_exit_code: Option<i32>,
}

impl RunReport {
    /// Build the report at the end of a run
    pub fn from_run(options: &PreflightOptions, state: RunState, error: Option<&PreflightError>) -> Self {
        let (status, exit_code) = match error {
            None => (RunStatus::Ok, 0),
            Some(_) => (RunStatus::Error, 1),
        };

        Self {
            schema: REPORT_SCHEMA,
            tool_version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            status,
            exit_code,
            error: error.map(PreflightError::user_message),
            error_kind: error.map(PreflightError::kind),
            target: options.target.clone(),
            requested_mode: state.requested_mode,
            effective_mode: state.effective_mode,
            environment: state.environment,
            linker: state.linker,
            diagnose_log: options.diagnose_log.clone(),
            check_command: state.check_command,
            check_exit_code: state.check_exit_code,
            findings: state.findings,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Ok
    }

    /// Human-readable summary for the terminal
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "target:      {}", self.target);
        let _ = writeln!(
            out,
            "mode:        {} (requested {})",
            self.effective_mode.map(|m| m.as_str()).unwrap_or("unresolved"),
            self.requested_mode.unwrap_or("invalid")
        );
        if let Some(environment) = self.environment {
            let _ = writeln!(out, "environment: {}", environment.as_str());
        }
        if let Some(ref linker) = self.linker {
            let _ = writeln!(out, "linker:      {}", linker.effective_linker);
        }
        if let Some(ref command) = self.check_command {
            let _ = writeln!(out, "check:       {} -> {:?}", command, self.check_exit_code);
        }

        for warning in self.findings.warnings() {
            let _ = writeln!(out, "[warn] {}", warning);
        }
        for detection in self.findings.detections() {
            let _ = writeln!(out, "[detected] {}", detection);
        }
        if !self.findings.suggestions().is_empty() {
            let _ = writeln!(out, "suggested fix:");
            for suggestion in self.findings.suggestions() {
                let _ = writeln!(out, "  {}", suggestion);
            }
        }

        match self.error {
            Some(ref error) => {
                let _ = writeln!(out, "[error] {}", error);
            }
            None => {
                let _ = writeln!(out, "[ok] preflight passed");
            }
        }
        out
    }
}

/// Serialize and atomically write a report to `path`
pub fn write_report(report: &RunReport, path: &Path) -> Result<(), PreflightError> {
    let json = serde_json::to_string_pretty(report)?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PreflightError::Io(e.error))?;

    debug!("Report bytes: {}", json.len());
    info!("Wrote report to {:?}", path);
    Ok(())
}
