//! Command-line surface
//!
//! Every flag can also come from a `DROID_PREFLIGHT_*` variable. A usage
//! error still produces a report: the flags that could be read are
//! recovered from the raw arguments so `--report-output` is honoured.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use droid_preflight_core::config::{DEFAULT_MODE, DEFAULT_TARGET};
use droid_preflight_core::{PreflightError, PreflightOptions};
use droid_preflight_toolchain::HostEnv;

use crate::report::{RunReport, RunState};

/// Preflight and build-failure diagnosis for Rust Android targets
#[derive(Parser, Debug)]
#[command(name = "droid-preflight", version, about)]
pub struct Cli {
    /// Target triple
    #[arg(long, env = "DROID_PREFLIGHT_TARGET", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// auto, native-in-place or cross-from-host
    #[arg(long, env = "DROID_PREFLIGHT_MODE", default_value = DEFAULT_MODE)]
    pub mode: String,

    /// Run `cargo check --target <triple>` and diagnose it if it fails
    #[arg(long, env = "DROID_PREFLIGHT_RUN_CHECK")]
    pub run_check: bool,

    /// Diagnose an existing build log; skips live toolchain probes
    #[arg(long, env = "DROID_PREFLIGHT_DIAGNOSE_LOG", value_name = "PATH")]
    pub diagnose_log: Option<PathBuf>,

    /// Write a JSON report to this path
    #[arg(long, env = "DROID_PREFLIGHT_REPORT", value_name = "PATH")]
    pub report_output: Option<PathBuf>,

    /// Project root containing `.cargo/config.toml`
    #[arg(long, env = "DROID_PREFLIGHT_PROJECT_DIR", value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,
}

impl From<Cli> for PreflightOptions {
    fn from(cli: Cli) -> Self {
        Self {
            target: cli.target,
            mode: cli.mode,
            run_check: cli.run_check,
            diagnose_log: cli.diagnose_log,
            report_output: cli.report_output,
            project_dir: cli.project_dir,
        }
    }
}

/// Best-effort options for an argument list clap rejected
///
/// `args` includes the program name. Flags fall back to their
/// environment variables, then to the defaults.
pub fn recover_options<I, T>(args: I, env: &HostEnv) -> PreflightOptions
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<String> = args
        .into_iter()
        .skip(1)
        .map(|a| a.into().to_string_lossy().into_owned())
        .collect();

    let lookup = |flag: &str, var: &str| {
        flag_value(&args, flag).or_else(|| env.get(var).map(str::to_string))
    };

    let defaults = PreflightOptions::default();
    PreflightOptions {
        target: lookup("--target", "DROID_PREFLIGHT_TARGET").unwrap_or(defaults.target),
        mode: lookup("--mode", "DROID_PREFLIGHT_MODE").unwrap_or(defaults.mode),
        run_check: false,
        diagnose_log: lookup("--diagnose-log", "DROID_PREFLIGHT_DIAGNOSE_LOG").map(PathBuf::from),
        report_output: lookup("--report-output", "DROID_PREFLIGHT_REPORT").map(PathBuf::from),
        project_dir: lookup("--project-dir", "DROID_PREFLIGHT_PROJECT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.project_dir),
    }
}

/// Value of the last `--flag value` or `--flag=value` occurrence
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{}=", flag);
    let mut found = None;
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if let Some(value) = arg.strip_prefix(&prefix) {
            found = Some(value.to_string());
        } else if arg == flag {
            if let Some(next) = iter.next_if(|next| !next.starts_with("--")) {
                found = Some(next.clone());
            }
        }
    }

    found.filter(|v| !v.is_empty())
}

/// Report for a run that never got past argument parsing
pub fn usage_error_report(options: &PreflightOptions, err: &clap::Error) -> RunReport {
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();

    let error = PreflightError::InvalidArgument(message);
    RunReport::from_run(options, RunState::default(), Some(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::write_report;

    #[test]
    fn test_run_check_and_diagnose_log_parse_together() {
        let cli = Cli::try_parse_from(["droid-preflight", "--run-check", "--diagnose-log", "build.log"]).unwrap();
        let options = PreflightOptions::from(cli);

        assert!(options.run_check);
        assert_eq!(options.diagnose_log, Some(PathBuf::from("build.log")));
    }

    #[test]
    fn test_recover_both_flag_forms() {
        let args = [
            "droid-preflight",
            "--target=x86_64-linux-android",
            "--mode",
            "ndk-cross",
            "--report-output",
            "--bogus",
        ];
        let options = recover_options(args, &HostEnv::default());

        assert_eq!(options.target, "x86_64-linux-android");
        assert_eq!(options.mode, "ndk-cross");
        // A following flag is not taken as the value
        assert_eq!(options.report_output, None);
        assert!(!options.run_check);
    }

    #[test]
    fn test_recover_falls_back_to_env() {
        let env = HostEnv::from_pairs([("DROID_PREFLIGHT_REPORT", "/tmp/report.json")]);
        let options = recover_options(["droid-preflight", "--nope"], &env);

        assert_eq!(options.report_output, Some(PathBuf::from("/tmp/report.json")));
        assert_eq!(options.target, DEFAULT_TARGET);
        assert_eq!(options.project_dir, PathBuf::from("."));
    }

    #[test]
    fn test_usage_error_still_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let args = vec![
            "droid-preflight".to_string(),
            "--report-output".to_string(),
            path.display().to_string(),
            "--target".to_string(),
        ];

        let err = Cli::try_parse_from(&args).unwrap_err();
        assert!(err.use_stderr());

        let options = recover_options(&args, &HostEnv::default());
        assert_eq!(options.report_output.as_deref(), Some(path.as_path()));

        let report = usage_error_report(&options, &err);
        write_report(&report, &path).unwrap();

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["status"], "error");
        assert_eq!(written["exit_code"], 1);
        assert_eq!(written["error_kind"], "invalid_argument");
        assert!(written["error"].as_str().unwrap().contains("--target"));
        assert!(written["requested_mode"].is_null());
    }
}
