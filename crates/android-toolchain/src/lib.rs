//! Android Toolchain Preflight
//! 
//! Handles everything that inspects the build environment:
//! - Target triple and validation mode parsing
//! - Termux vs. host detection and `auto` mode resolution
//! - Linker override resolution from cargo config and environment
//! - Mode-specific preflight checks

pub mod cargo_config;
pub mod detector;
pub mod env;
pub mod ndk;
pub mod overrides;
pub mod preflight;
pub mod target;

pub use detector::{detect_environment, resolve_mode, EnvironmentClass, ToolLocator};
pub use env::HostEnv;
pub use overrides::{LinkerChain, OverrideResolver};
pub use preflight::{PreflightChecks, ToolchainStatus};
pub use target::{validate, ResolvedMode, TargetTriple, ValidationMode, FALLBACK_COMPILER};
