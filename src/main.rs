//! droid-preflight command-line entry point

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use droid_preflight::cli::{recover_options, usage_error_report, Cli};
use droid_preflight::core::PreflightOptions;
use droid_preflight::toolchain::HostEnv;
use droid_preflight::{write_report, PreflightCommand, RunReport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{:#}", e);
    }

    let env = HostEnv::capture();

    let (options, report) = match Cli::try_parse() {
        Ok(cli) => {
            let command = PreflightCommand::new(PreflightOptions::from(cli), env);
            let report = command.execute().await;
            (command.options().clone(), report)
        }
        // --help and --version are not failures
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            let options = recover_options(std::env::args_os(), &env);
            let report = usage_error_report(&options, &e);
            (options, report)
        }
    };

    print!("{}", report.summary());

    let mut exit_code = report.exit_code;
    if let Err(e) = emit_report(&report, &options) {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        exit_code = 1;
    }

    ExitCode::from(exit_code.clamp(0, 255) as u8)
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn emit_report(report: &RunReport, options: &PreflightOptions) -> Result<()> {
    let Some(ref path) = options.report_output else {
        return Ok(());
    };
    write_report(report, path).with_context(|| format!("Failed to write report to {}", path.display()))
}
