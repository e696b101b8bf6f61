//! Environment snapshot
//! 
//! Captures the process environment once per run. Every stage reads variables
//! and `PATH` from the snapshot so a run can be replayed against a fixed
//! environment.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// Immutable view of the environment variables a run sees
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    vars: BTreeMap<String, String>,
}

impl HostEnv {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Value of a variable; empty values count as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// `PATH` as handed to executable lookup
    pub fn search_path(&self) -> Option<OsString> {
        self.vars
            .get("PATH")
            .or_else(|| self.vars.get("Path"))
            .map(OsString::from)
    }

    /// All variables, for handing to a child process
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Shell line exporting `key` (for suggestions shown to the operator)
pub fn shell_export(key: &str, value: &str) -> String {
    if cfg!(windows) {
        format!("set {}={}", key, value)
    } else {
        format!("export {}=\"{}\"", key, value)
    }
}

/// Shell line clearing `key`
pub fn shell_unset(key: &str) -> String {
    if cfg!(windows) {
        format!("set {}=", key)
    } else {
        format!("unset {}", key)
    }
}
