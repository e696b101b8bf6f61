//! Preflight command
//! 
//! Runs the whole pipeline for one invocation: validate options, detect the
//! environment, resolve linker overrides, run preflight checks, then either
//! diagnose a supplied log or optionally run the build check.

use tracing::{error, info};

use droid_preflight_build::{CheckRunner, DiagnosisContext, DiagnosticEngine};
use droid_preflight_core::{PreflightError, PreflightOptions, Result};
use droid_preflight_toolchain::{
    detect_environment, resolve_mode, validate, HostEnv, OverrideResolver, PreflightChecks,
};

use crate::report::{RunReport, RunState};

/// One preflight invocation
pub struct PreflightCommand {
    options: PreflightOptions,
    env: HostEnv,
}

impl PreflightCommand {
    /// Create a command against an environment snapshot
    pub fn new(options: PreflightOptions, env: HostEnv) -> Self {
        Self { options, env }
    }

    pub fn options(&self) -> &PreflightOptions {
        &self.options
    }

    /// Execute the pipeline; failures are captured in the report
    pub async fn execute(&self) -> RunReport {
        let mut state = RunState::default();
        let result = self.run_stages(&mut state).await;

        if let Err(ref e) = result {
            error!("{}", e.user_message());
        }
        RunReport::from_run(&self.options, state, result.as_ref().err())
    }

    async fn run_stages(&self, state: &mut RunState) -> Result<()> {
        let options = &self.options;

        let (target, requested_mode) = validate(&options.target, &options.mode)?;
        state.requested_mode = Some(requested_mode.as_str());

        if options.run_check && options.is_diagnose_only() {
            return Err(PreflightError::InvalidArgument(
                "--run-check and --diagnose-log cannot be combined".into(),
            ));
        }

        let environment = detect_environment(&self.env);
        state.environment = Some(environment);

        let mode = resolve_mode(requested_mode, environment);
        state.effective_mode = Some(mode);
        info!(
            "Target {} in {} mode (requested {}, environment {})",
            target,
            mode,
            requested_mode.as_str(),
            environment.as_str()
        );

        let chain = OverrideResolver::new(target, &self.env).resolve(&options.project_dir);
        state.linker = Some(chain.clone());

        let mut checks = PreflightChecks::new(target, mode, environment, &self.env, &chain, &options.project_dir);
        if options.is_diagnose_only() {
            checks = checks.without_tool_probes();
        }
        checks.check_configuration(&mut state.findings)?;

        let engine = DiagnosticEngine::new()?;
        let ctx = DiagnosisContext {
            target,
            mode,
            env: &self.env,
        };

        if let Some(ref log) = options.diagnose_log {
            engine.diagnose_file(log, &ctx, &mut state.findings)?;
            return Ok(());
        }

        let toolchain = checks.check_toolchain().await?;

        if options.run_check {
            let runner = CheckRunner::new(toolchain.cargo, target, &options.project_dir, &self.env);
            let outcome = runner.run(&engine, &ctx, &mut state.findings).await?;
            state.check_command = Some(outcome.command.clone());
            state.check_exit_code = outcome.exit_code;

            if !outcome.success {
                return Err(PreflightError::ExternalCheckFailed {
                    command: outcome.command,
                    code: outcome.exit_code,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CC_FAILURE: &str =
        "error occurred in cc-rs: failed to find tool \"aarch64-linux-android-clang\": No such file or directory (os error 2)\n";

    fn diagnose_options(project: &std::path::Path, log: PathBuf, mode: &str) -> PreflightOptions {
        PreflightOptions {
            mode: mode.to_string(),
            diagnose_log: Some(log),
            project_dir: project.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unsupported_mode_reports_error() {
        let options = PreflightOptions {
            mode: "sideways".into(),
            ..Default::default()
        };
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;

        assert_eq!(report.exit_code, 1);
        assert!(report.error.as_deref().unwrap().contains("sideways"));
        assert!(report.effective_mode.is_none());
        assert!(report.requested_mode.is_none());
        assert!(report.findings.is_empty());
    }

    #[tokio::test]
    async fn test_diagnose_compiler_lookup_cross() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, CC_FAILURE).unwrap();

        let options = diagnose_options(dir.path(), log, "cross-from-host");
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;

        assert!(report.is_success());
        assert_eq!(report.exit_code, 0);
        assert_eq!(report.findings.detections().len(), 1);
        let suggestions = report.findings.suggestions();
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].contains("CARGO_TARGET_AARCH64_LINUX_ANDROID_LINKER"));
        assert!(suggestions[1].contains("CC_aarch64_linux_android"));
        assert!(suggestions.iter().all(|s| s.contains("aarch64-linux-android21-clang")));
    }

    #[tokio::test]
    async fn test_mode_alias_reported_canonically() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, "").unwrap();

        let options = diagnose_options(dir.path(), log, "ndk-cross");
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;

        assert_eq!(report.exit_code, 0);
        assert_eq!(report.requested_mode, Some("cross-from-host"));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["requested_mode"], "cross-from-host");
    }

    #[tokio::test]
    async fn test_run_check_with_diagnose_log_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, CC_FAILURE).unwrap();

        let mut options = diagnose_options(dir.path(), log, "cross-from-host");
        options.run_check = true;
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;

        assert_eq!(report.exit_code, 1);
        assert_eq!(report.error_kind, Some(droid_preflight_core::ErrorKind::InvalidArgument));
        assert!(report.error.as_deref().unwrap().contains("--run-check"));
        assert!(report.findings.detections().is_empty());
    }

    #[tokio::test]
    async fn test_diagnose_missing_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = diagnose_options(dir.path(), dir.path().join("missing.log"), "auto");
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;

        assert_eq!(report.exit_code, 1);
        assert_eq!(report.error_kind, Some(droid_preflight_core::ErrorKind::InvalidArgument));
        assert!(report.error.as_deref().unwrap().contains("missing.log"));
    }

    #[tokio::test]
    async fn test_auto_mode_never_reported() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, "").unwrap();

        let termux = HostEnv::from_pairs([("PREFIX", "/data/data/com.termux/files/usr")]);
        let options = diagnose_options(dir.path(), log.clone(), "auto");
        let report = PreflightCommand::new(options, termux).execute().await;
        assert_eq!(report.effective_mode, Some(droid_preflight_toolchain::ResolvedMode::NativeInPlace));

        let options = diagnose_options(dir.path(), log, "auto");
        let report = PreflightCommand::new(options, HostEnv::default()).execute().await;
        assert_eq!(report.effective_mode, Some(droid_preflight_toolchain::ResolvedMode::CrossFromHost));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("build.log");
        std::fs::write(&log, format!("{}error[E0463]: can't find crate for `std`\n", CC_FAILURE)).unwrap();
        let command = PreflightCommand::new(diagnose_options(dir.path(), log, "native-in-place"), HostEnv::default());

        let first = command.execute().await;
        let second = command.execute().await;

        assert_eq!(first.findings.detections().len(), 2);
        assert_eq!(first.findings, second.findings);
    }
}
