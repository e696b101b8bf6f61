//! Check Runner
//!
//! Runs `cargo check --target <triple>` with combined output captured to a
//! scratch log, and diagnoses that log when the check fails. The log is a
//! `NamedTempFile`, so it is removed on every exit path.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use droid_preflight_core::Findings;
use droid_preflight_toolchain::{HostEnv, TargetTriple};

use crate::diagnose::{DiagnosisContext, DiagnosticEngine};
use crate::BuildError;

/// Lines of a failed log echoed to the log stream
const TAIL_LINES: usize = 20;

/// Result of one check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Command line that was run
    pub command: String,
    /// Exit code; `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Failure signatures matched in the captured log
    pub matched_rules: usize,
}

/// Runs the build check for one target
pub struct CheckRunner<'a> {
    cargo: PathBuf,
    target: TargetTriple,
    project_dir: PathBuf,
    env: &'a HostEnv,
    log_dir: Option<PathBuf>,
}

impl<'a> CheckRunner<'a> {
    pub fn new(cargo: PathBuf, target: TargetTriple, project_dir: impl Into<PathBuf>, env: &'a HostEnv) -> Self {
        Self {
            cargo,
            target,
            project_dir: project_dir.into(),
            env,
            log_dir: None,
        }
    }

    /// Create the scratch log in `dir` instead of the system temp dir
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    fn args(&self) -> [&'static str; 3] {
        ["check", "--target", self.target.as_str()]
    }

    /// Command line as shown to the operator
    pub fn command_line(&self) -> String {
        format!("cargo {}", self.args().join(" "))
    }

    /// Run the check; on failure, diagnose the captured output into `findings`
    pub async fn run(
        &self,
        engine: &DiagnosticEngine,
        ctx: &DiagnosisContext<'_>,
        findings: &mut Findings,
    ) -> Result<CheckOutcome, BuildError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("droid-preflight-check-").suffix(".log");
        let log = match self.log_dir {
            Some(ref dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let stdout = log.as_file().try_clone()?;
        let stderr = log.as_file().try_clone()?;

        info!("Running: {} (in {:?})", self.command_line(), self.project_dir);

        let status = Command::new(&self.cargo)
            .args(self.args())
            .current_dir(&self.project_dir)
            .env_clear()
            .envs(self.env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await?;

        let mut outcome = CheckOutcome {
            command: self.command_line(),
            exit_code: status.code(),
            success: status.success(),
            matched_rules: 0,
        };

        if outcome.success {
            info!("Check passed for {}", self.target);
            return Ok(outcome);
        }

        warn!("Check failed for {} (exit code {:?})", self.target, outcome.exit_code);
        log_tail(log.path());
        outcome.matched_rules = engine.diagnose_file(log.path(), ctx, findings)?;
        Ok(outcome)
    }
}

fn log_tail(path: &Path) {
    let Ok(bytes) = std::fs::read(path) else {
        return;
    };
    let content = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    for line in &lines[start..] {
        warn!("  | {}", line);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use droid_preflight_toolchain::ResolvedMode;
    use std::os::unix::fs::PermissionsExt;

    fn fake_cargo(dir: &Path, name: &str, script: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    // All spawning stays in one test: writing and exec'ing scripts from
    // parallel tests can hit ETXTBSY.
    #[tokio::test]
    async fn test_check_runs_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let env = HostEnv::from_pairs([("PATH", "/usr/bin:/bin")]);
        let engine = DiagnosticEngine::new().unwrap();
        let ctx = DiagnosisContext {
            target: TargetTriple::Aarch64,
            mode: ResolvedMode::CrossFromHost,
            env: &env,
        };

        // failing check: output is diagnosed, scratch log removed
        let failing = fake_cargo(
            dir.path(),
            "failing-cargo",
            "#!/bin/sh\necho \"error: linker \\`cc\\` not found\" >&2\necho \"checked $3\"\nexit 101\n",
        );
        let runner = CheckRunner::new(failing, TargetTriple::Aarch64, dir.path(), &env).with_log_dir(logs.path());
        assert_eq!(runner.command_line(), "cargo check --target aarch64-linux-android");

        let mut findings = Findings::new();
        let outcome = runner.run(&engine, &ctx, &mut findings).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(101));
        assert_eq!(outcome.matched_rules, 1);
        assert_eq!(findings.detections().len(), 1);
        assert!(is_empty(logs.path()));

        // passing check: no diagnosis even if the output looks like a failure
        let passing = fake_cargo(
            dir.path(),
            "passing-cargo",
            "#!/bin/sh\necho \"error: linker \\`cc\\` not found\"\nexit 0\n",
        );
        let mut findings = Findings::new();
        let outcome = CheckRunner::new(passing, TargetTriple::Aarch64, dir.path(), &env)
            .with_log_dir(logs.path())
            .run(&engine, &ctx, &mut findings)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.matched_rules, 0);
        assert!(findings.is_empty());
        assert!(is_empty(logs.path()));

        // killed by a signal: no exit code, still a failure
        let killed = fake_cargo(dir.path(), "killed-cargo", "#!/bin/sh\necho partial\nkill -9 $$\n");
        let mut findings = Findings::new();
        let outcome = CheckRunner::new(killed, TargetTriple::Aarch64, dir.path(), &env)
            .with_log_dir(logs.path())
            .run(&engine, &ctx, &mut findings)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, None);
        assert_eq!(outcome.matched_rules, 0);
        assert!(is_empty(logs.path()));

        // cargo cannot be spawned: error, scratch log removed
        let mut findings = Findings::new();
        let err = CheckRunner::new(dir.path().join("no-such-cargo"), TargetTriple::Aarch64, dir.path(), &env)
            .with_log_dir(logs.path())
            .run(&engine, &ctx, &mut findings)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Io(_)));
        assert!(findings.is_empty());
        assert!(is_empty(logs.path()));

        // log vanishes before diagnosis: error, nothing left behind
        if cfg!(target_os = "linux") {
            let vanishing = fake_cargo(
                dir.path(),
                "vanishing-cargo",
                "#!/bin/sh\nrm \"$(readlink /proc/$$/fd/1)\"\nexit 1\n",
            );
            let mut findings = Findings::new();
            let err = CheckRunner::new(vanishing, TargetTriple::Aarch64, dir.path(), &env)
                .with_log_dir(logs.path())
                .run(&engine, &ctx, &mut findings)
                .await
                .unwrap_err();

            assert!(matches!(err, BuildError::LogNotFound(_)));
            assert!(is_empty(logs.path()));
        }
    }
}
