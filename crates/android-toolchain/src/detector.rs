//! Environment detection
//! 
//! Classifies the host as the constrained Termux userland or a general
//! desktop/CI host, resolves `auto` mode, and locates executables on the
//! snapshot's `PATH`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::env::HostEnv;
use crate::target::{ResolvedMode, ValidationMode};

/// Path fragment of the Termux prefix
const TERMUX_PREFIX_MARKER: &str = "/com.termux/files/usr";

/// Execution environment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentClass {
    /// Termux on an Android device
    Termux,
    /// Anything else
    Host,
}

impl EnvironmentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentClass::Termux => "termux",
            EnvironmentClass::Host => "host",
        }
    }

    pub fn is_constrained(&self) -> bool {
        matches!(self, EnvironmentClass::Termux)
    }
}

/// Classify the environment from its markers
pub fn detect_environment(env: &HostEnv) -> EnvironmentClass {
    let version_marker = env.get("TERMUX_VERSION").is_some();
    let prefix_marker = env
        .get("PREFIX")
        .map(|prefix| prefix.contains(TERMUX_PREFIX_MARKER))
        .unwrap_or(false);

    let class = if version_marker || prefix_marker {
        EnvironmentClass::Termux
    } else {
        EnvironmentClass::Host
    };
    debug!("Detected environment: {}", class.as_str());
    class
}

/// Resolve the requested mode; explicit choices always win
pub fn resolve_mode(requested: ValidationMode, class: EnvironmentClass) -> ResolvedMode {
    match requested {
        ValidationMode::Resolved(mode) => mode,
        ValidationMode::Auto => match class {
            EnvironmentClass::Termux => ResolvedMode::NativeInPlace,
            EnvironmentClass::Host => ResolvedMode::CrossFromHost,
        },
    }
}

/// Executable lookup against a `HostEnv`
pub struct ToolLocator<'a> {
    env: &'a HostEnv,
    cwd: PathBuf,
}

impl<'a> ToolLocator<'a> {
    pub fn new(env: &'a HostEnv, cwd: impl Into<PathBuf>) -> Self {
        Self { env, cwd: cwd.into() }
    }

    /// Find a bare command name on `PATH`
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let found = which::which_in(name, self.env.search_path(), &self.cwd).ok();
        debug!("Lookup {} -> {:?}", name, found);
        found
    }

    /// Resolve a linker value: path-like values must be executable files,
    /// bare names must be on `PATH`
    pub fn resolve(&self, program: &str) -> Option<PathBuf> {
        if is_path_like(program) {
            let path = PathBuf::from(program);
            let path = if path.is_relative() { self.cwd.join(path) } else { path };
            is_executable(&path).then_some(path)
        } else {
            self.find(program)
        }
    }
}

/// Whether a program value names a path rather than a command
pub fn is_path_like(program: &str) -> bool {
    program.contains('/') || program.contains(std::path::MAIN_SEPARATOR)
}

/// Regular file with an execute bit (any file on Windows)
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
