//! Preflight checks
//! 
//! Judges a resolved linker chain against the expectations of the resolved
//! mode, verifies the effective linker can be executed, and confirms the
//! base Rust toolchain plus the target's standard library are installed.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use droid_preflight_core::{Findings, PreflightError, Result};

use crate::detector::{EnvironmentClass, ToolLocator};
use crate::env::{shell_export, shell_unset, HostEnv};
use crate::ndk;
use crate::overrides::LinkerChain;
use crate::target::{ResolvedMode, TargetTriple, DEFAULT_WRAPPER_API, FALLBACK_COMPILER};

/// Toolchain manager command
pub const RUSTUP: &str = "rustup";

/// Build driver command
pub const CARGO: &str = "cargo";

/// Located base toolchain
#[derive(Debug, Clone)]
pub struct ToolchainStatus {
    pub rustup: PathBuf,
    pub cargo: PathBuf,
}

/// Checks for one resolved target/mode pair
pub struct PreflightChecks<'a> {
    target: TargetTriple,
    mode: ResolvedMode,
    class: EnvironmentClass,
    env: &'a HostEnv,
    chain: &'a LinkerChain,
    locator: ToolLocator<'a>,
    probe_tools: bool,
}

impl<'a> PreflightChecks<'a> {
    pub fn new(
        target: TargetTriple,
        mode: ResolvedMode,
        class: EnvironmentClass,
        env: &'a HostEnv,
        chain: &'a LinkerChain,
        project_dir: &Path,
    ) -> Self {
        Self {
            target,
            mode,
            class,
            env,
            chain,
            locator: ToolLocator::new(env, project_dir),
            probe_tools: true,
        }
    }

    /// Skip executable lookups (diagnosing a log captured elsewhere)
    pub fn without_tool_probes(mut self) -> Self {
        self.probe_tools = false;
        self
    }

    /// Missing tools are fatal only when building natively inside Termux
    fn is_strict(&self) -> bool {
        self.mode == ResolvedMode::NativeInPlace && self.class.is_constrained()
    }

    /// Mode expectations plus effective linker reachability
    pub fn check_configuration(&self, findings: &mut Findings) -> Result<()> {
        match self.mode {
            ResolvedMode::NativeInPlace => self.check_native(findings)?,
            ResolvedMode::CrossFromHost => self.check_cross(findings),
        }

        // Native runs with the plain compiler already checked it above
        let already_checked =
            self.mode == ResolvedMode::NativeInPlace && self.chain.effective_linker == FALLBACK_COMPILER;
        if self.probe_tools && !already_checked {
            self.check_effective_linker(findings)?;
        }
        Ok(())
    }

    fn check_native(&self, findings: &mut Findings) -> Result<()> {
        let overrides = [
            (self.target.linker_env_var(), self.chain.cargo_linker_env.as_deref()),
            (self.target.cc_env_var(), self.chain.cc_env.as_deref()),
        ];
        for (var, value) in overrides {
            if let Some(value) = value.filter(|v| *v != FALLBACK_COMPILER) {
                findings.warn(format!(
                    "{} is set to '{}'; native-in-place builds expect it unset or '{}'",
                    var, value, FALLBACK_COMPILER
                ));
                findings.suggest(shell_unset(&var));
            }
        }

        if let Some(linker) = self.chain.configured_linker.as_deref().filter(|v| *v != FALLBACK_COMPILER) {
            findings.warn(format!(
                "[target.{}] linker = '{}' in the project config; native-in-place builds expect '{}'",
                self.target, linker, FALLBACK_COMPILER
            ));
        }

        if self.probe_tools && self.locator.find(FALLBACK_COMPILER).is_none() {
            let message = format!("`{}` was not found on PATH", FALLBACK_COMPILER);
            if self.is_strict() {
                return Err(PreflightError::ToolNotExecutable(format!(
                    "{}; {}",
                    message,
                    ndk::install_compiler_hint()
                )));
            }
            findings.warn(format!(
                "{} (expected outside Termux; native builds need it on the device)",
                message
            ));
        }
        Ok(())
    }

    fn check_cross(&self, findings: &mut Findings) {
        let linker_var = self.target.linker_env_var();
        let cc_var = self.target.cc_env_var();

        match self.chain.cargo_linker_env {
            None => {
                findings.warn(format!(
                    "{} is not set; cross-from-host builds should point it at the NDK wrapper `{}`",
                    linker_var,
                    self.target.wrapper_filename(DEFAULT_WRAPPER_API)
                ));
                findings.suggest_all(ndk::linker_remediation(self.target, self.mode, self.env));
            }
            Some(ref linker) if self.chain.cc_env.is_none() => {
                findings.warn(format!(
                    "{} is set but {} is not; native-library build scripts may pick a different compiler than the linker",
                    linker_var, cc_var
                ));
                findings.suggest(shell_export(&cc_var, linker));
            }
            Some(_) => {}
        }
    }

    fn check_effective_linker(&self, findings: &mut Findings) -> Result<()> {
        let linker = &self.chain.effective_linker;
        match self.locator.resolve(linker) {
            Some(path) => debug!("Effective linker resolves to {:?}", path),
            None => {
                let message = format!("effective linker '{}' is not an executable on this host", linker);
                if self.is_strict() {
                    return Err(PreflightError::ToolNotExecutable(message));
                }
                findings.warn(message);
            }
        }
        Ok(())
    }

    /// Locate rustup and cargo, and confirm the target's std is installed
    pub async fn check_toolchain(&self) -> Result<ToolchainStatus> {
        let rustup = self.require(RUSTUP, "Install rustup from https://rustup.rs")?;
        let cargo = self.require(CARGO, "Install a Rust toolchain with `rustup default stable`")?;

        let installed = installed_targets(&rustup, self.env).await?;
        if !installed.iter().any(|t| t == self.target.as_str()) {
            return Err(PreflightError::MissingDependency {
                what: format!("Rust standard library for {}", self.target),
                hint: format!("Run `{}`", ndk::install_target_command(self.target)),
            });
        }

        info!("Toolchain ready for {}", self.target);
        Ok(ToolchainStatus { rustup, cargo })
    }

    fn require(&self, command: &str, hint: &str) -> Result<PathBuf> {
        self.locator.find(command).ok_or_else(|| PreflightError::MissingDependency {
            what: format!("`{}` not found on PATH", command),
            hint: hint.to_string(),
        })
    }
}

/// Targets reported by `rustup target list --installed`
pub async fn installed_targets(rustup: &Path, env: &HostEnv) -> Result<Vec<String>> {
    let output = Command::new(rustup)
        .args(["target", "list", "--installed"])
        .env_clear()
        .envs(env.vars())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PreflightError::MissingDependency {
            what: "installed Rust targets could not be listed".into(),
            hint: format!("`rustup target list --installed` failed: {}", stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}
