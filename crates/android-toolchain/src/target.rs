//! Target and mode validation
//!
//! Closed enumerations of supported Android triples and validation modes,
//! plus the per-triple name derivations every other stage relies on.

use std::fmt;

use serde::Serialize;

use droid_preflight_core::PreflightError;

/// Plain compiler expected on-device and used when nothing else is configured
pub const FALLBACK_COMPILER: &str = "clang";

/// API level baked into vendor wrapper filenames
pub const DEFAULT_WRAPPER_API: u32 = 21;

/// Supported Android target triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum TargetTriple {
    Aarch64,
    Armv7,
    X86_64,
    I686,
}

impl TargetTriple {
    /// Rust target triple
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetTriple::Aarch64 => "aarch64-linux-android",
            TargetTriple::Armv7 => "armv7-linux-androideabi",
            TargetTriple::X86_64 => "x86_64-linux-android",
            TargetTriple::I686 => "i686-linux-android",
        }
    }

    /// Triple prefix the NDK uses for its clang wrappers
    pub fn ndk_triple(&self) -> &'static str {
        match self {
            TargetTriple::Aarch64 => "aarch64-linux-android",
            TargetTriple::Armv7 => "armv7a-linux-androideabi",
            TargetTriple::X86_64 => "x86_64-linux-android",
            TargetTriple::I686 => "i686-linux-android",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == s)
    }

    /// Get all supported triples
    pub fn all() -> &'static [TargetTriple] {
        &[
            TargetTriple::Aarch64,
            TargetTriple::Armv7,
            TargetTriple::X86_64,
            TargetTriple::I686,
        ]
    }

    /// `CARGO_TARGET_<TRIPLE>_LINKER`, read by cargo
    pub fn linker_env_var(&self) -> String {
        let target_upper = self.as_str().to_uppercase().replace('-', "_");
        format!("CARGO_TARGET_{}_LINKER", target_upper)
    }

    /// `CC_<triple>`, read by the `cc` build helper
    pub fn cc_env_var(&self) -> String {
        format!("CC_{}", self.as_str().replace('-', "_"))
    }

    /// Compiler name the `cc` helper searches for when nothing is configured
    pub fn compiler_tool(&self) -> String {
        format!("{}-{}", self.ndk_triple(), FALLBACK_COMPILER)
    }

    /// Conventional NDK wrapper filename, e.g. `aarch64-linux-android21-clang`
    pub fn wrapper_filename(&self, api_level: u32) -> String {
        let exe_suffix = if cfg!(windows) { ".cmd" } else { "" };
        format!("{}{}-{}{}", self.ndk_triple(), api_level, FALLBACK_COMPILER, exe_suffix)
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TargetTriple> for &'static str {
    fn from(target: TargetTriple) -> Self {
        target.as_str()
    }
}

/// Requested validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Infer from the environment
    Auto,
    Resolved(ResolvedMode),
}

/// Concrete mode; `Auto` never survives resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedMode {
    /// Build on the device class the binary targets, with a plain compiler
    NativeInPlace,
    /// Build on another host through the vendor NDK wrapper
    CrossFromHost,
}

impl ValidationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(ValidationMode::Auto),
            "native-in-place" | "termux-native" => Some(ValidationMode::Resolved(ResolvedMode::NativeInPlace)),
            "cross-from-host" | "ndk-cross" => Some(ValidationMode::Resolved(ResolvedMode::CrossFromHost)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Auto => "auto",
            ValidationMode::Resolved(mode) => mode.as_str(),
        }
    }
}

impl ResolvedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedMode::NativeInPlace => "native-in-place",
            ResolvedMode::CrossFromHost => "cross-from-host",
        }
    }
}

impl fmt::Display for ResolvedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate the requested target and mode against the supported sets
pub fn validate(target: &str, mode: &str) -> Result<(TargetTriple, ValidationMode), PreflightError> {
    let triple = TargetTriple::parse(target)
        .ok_or_else(|| PreflightError::UnsupportedTarget(target.to_string()))?;
    let mode = ValidationMode::parse(mode)
        .ok_or_else(|| PreflightError::UnsupportedMode(mode.to_string()))?;
    Ok((triple, mode))
}
