//! NDK wrapper naming and linker remediation
//! 
//! Builds the vendor wrapper path for a target and the shell commands that
//! put a target's linker overrides into the shape a mode expects.

use std::path::PathBuf;

use crate::env::{shell_export, shell_unset, HostEnv};
use crate::target::{ResolvedMode, TargetTriple, DEFAULT_WRAPPER_API, FALLBACK_COMPILER};

/// Placeholder used when `ANDROID_NDK_HOME` is not set
const NDK_HOME_PLACEHOLDER: &str = "$ANDROID_NDK_HOME";

/// Termux package providing the plain compiler
const TERMUX_CLANG_INSTALL: &str = "pkg install -y clang";

/// Detect the host platform tag of NDK prebuilts
pub fn host_tag() -> &'static str {
    if cfg!(windows) {
        "windows-x86_64"
    } else if cfg!(target_os = "macos") {
        "darwin-x86_64"
    } else {
        "linux-x86_64"
    }
}

/// NDK root from the environment, if set
pub fn ndk_home(env: &HostEnv) -> Option<PathBuf> {
    env.get("ANDROID_NDK_HOME")
        .or_else(|| env.get("NDK_HOME"))
        .map(PathBuf::from)
}

/// Full path of the vendor wrapper, rendered for display in shell commands
pub fn wrapper_path(target: TargetTriple, env: &HostEnv) -> String {
    let root = ndk_home(env)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| NDK_HOME_PLACEHOLDER.to_string());

    format!(
        "{}/toolchains/llvm/prebuilt/{}/bin/{}",
        root.trim_end_matches('/'),
        host_tag(),
        target.wrapper_filename(DEFAULT_WRAPPER_API)
    )
}

/// Commands that make the override variables match `mode`
pub fn linker_remediation(target: TargetTriple, mode: ResolvedMode, env: &HostEnv) -> Vec<String> {
    match mode {
        ResolvedMode::NativeInPlace => vec![
            shell_unset(&target.linker_env_var()),
            shell_unset(&target.cc_env_var()),
            TERMUX_CLANG_INSTALL.to_string(),
        ],
        ResolvedMode::CrossFromHost => {
            let wrapper = wrapper_path(target, env);
            vec![
                shell_export(&target.linker_env_var(), &wrapper),
                shell_export(&target.cc_env_var(), &wrapper),
            ]
        }
    }
}

/// Command installing the target's standard library
pub fn install_target_command(target: TargetTriple) -> String {
    format!("rustup target add {}", target)
}

/// Hint for a missing plain compiler
pub fn install_compiler_hint() -> String {
    format!("install `{}` ({})", FALLBACK_COMPILER, TERMUX_CLANG_INSTALL)
}
