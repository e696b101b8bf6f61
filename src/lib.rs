//! droid-preflight - Android cross-compilation preflight
//! 
//! Checks that a Rust toolchain configuration is consistent for an Android
//! target, either building natively inside Termux or cross-compiling from a
//! desktop host through the NDK, and explains failed builds.
//! 
//! ## Architecture
//! 
//! - `droid-preflight-core`: error taxonomy, findings, options
//! - `droid-preflight-toolchain`: target/mode validation, environment
//!   detection, linker overrides and preflight checks
//! - `droid-preflight-build`: failure-log diagnosis and the check runner
//! - this crate: the command line, the pipeline and the JSON report

#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod report;

// Re-export main components for library usage
pub use droid_preflight_core as core;
pub use droid_preflight_toolchain as toolchain;
pub use droid_preflight_build as build;

pub use commands::PreflightCommand;
pub use report::{write_report, RunReport, RunStatus, REPORT_SCHEMA};
