//! Linker override resolution
//! 
//! Combines the project's configured linker with the two per-target
//! environment overrides into a single effective linker:
//! environment override, then configured linker, then the plain compiler.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cargo_config;
use crate::env::HostEnv;
use crate::target::{TargetTriple, FALLBACK_COMPILER};

/// Every place a linker for the target can come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkerChain {
    /// `[target.<triple>] linker` from the project config
    pub configured_linker: Option<String>,
    /// `CARGO_TARGET_<TRIPLE>_LINKER`
    pub cargo_linker_env: Option<String>,
    /// `CC_<triple>`
    pub cc_env: Option<String>,
    /// The linker cargo will actually invoke; never empty
    pub effective_linker: String,
}

impl LinkerChain {
    /// Apply the override precedence
    pub fn new(
        configured_linker: Option<String>,
        cargo_linker_env: Option<String>,
        cc_env: Option<String>,
    ) -> Self {
        let effective_linker = cargo_linker_env
            .clone()
            .or_else(|| configured_linker.clone())
            .unwrap_or_else(|| FALLBACK_COMPILER.to_string());

        Self {
            configured_linker,
            cargo_linker_env,
            cc_env,
            effective_linker,
        }
    }

    /// Effective linker falls back to the plain compiler
    pub fn is_fallback(&self) -> bool {
        self.cargo_linker_env.is_none() && self.configured_linker.is_none()
    }
}

/// Reads overrides for one target
pub struct OverrideResolver<'a> {
    target: TargetTriple,
    env: &'a HostEnv,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(target: TargetTriple, env: &'a HostEnv) -> Self {
        Self { target, env }
    }

    /// Resolve the chain for a project directory
    pub fn resolve(&self, project_dir: &Path) -> LinkerChain {
        let configured = cargo_config::configured_linker(project_dir, self.target);
        let chain = self.resolve_with(configured);
        debug!("Linker chain for {}: {:?}", self.target, chain);
        chain
    }

    /// Resolve the chain given an already-read configured linker
    pub fn resolve_with(&self, configured_linker: Option<String>) -> LinkerChain {
        let cargo_linker_env = self.env.get(&self.target.linker_env_var()).map(str::to_string);
        let cc_env = self.env.get(&self.target.cc_env_var()).map(str::to_string);
        LinkerChain::new(configured_linker, cargo_linker_env, cc_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let chain = LinkerChain::new(Some("cfg-linker".into()), Some("env-linker".into()), None);
        assert_eq!(chain.effective_linker, "env-linker");

        let chain = LinkerChain::new(Some("cfg-linker".into()), None, Some("cc".into()));
        assert_eq!(chain.effective_linker, "cfg-linker");

        let chain = LinkerChain::new(None, None, None);
        assert_eq!(chain.effective_linker, "clang");
        assert!(chain.is_fallback());
    }

    #[test]
    fn test_env_override_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cargo_dir = dir.path().join(".cargo");
        std::fs::create_dir_all(&cargo_dir).unwrap();
        std::fs::write(
            cargo_dir.join("config.toml"),
            "[target.aarch64-linux-android]\nlinker = \"from-config\"\n",
        )
        .unwrap();

        let env = HostEnv::from_pairs([
            ("CARGO_TARGET_AARCH64_LINUX_ANDROID_LINKER", "/ndk/aarch64-linux-android21-clang"),
            ("CC_aarch64_linux_android", "/ndk/aarch64-linux-android21-clang"),
        ]);
        let chain = OverrideResolver::new(TargetTriple::Aarch64, &env).resolve(dir.path());

        assert_eq!(chain.configured_linker.as_deref(), Some("from-config"));
        assert_eq!(chain.effective_linker, "/ndk/aarch64-linux-android21-clang");
        assert_eq!(chain.cc_env.as_deref(), Some("/ndk/aarch64-linux-android21-clang"));
    }

    #[test]
    fn test_overrides_scoped_to_target() {
        let env = HostEnv::from_pairs([("CARGO_TARGET_AARCH64_LINUX_ANDROID_LINKER", "aarch64-cc")]);
        let chain = OverrideResolver::new(TargetTriple::Armv7, &env).resolve_with(None);
        assert_eq!(chain.cargo_linker_env, None);
        assert_eq!(chain.effective_linker, "clang");
    }
}
