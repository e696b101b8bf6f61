//! Build failure diagnosis
//!
//! Matches a captured build log against a fixed table of failure signatures.
//! Every rule is evaluated against every log; each match contributes its own
//! detection and remediation steps.

use std::path::Path;

use regex::RegexSet;
use tracing::{debug, info};

use droid_preflight_core::Findings;
use droid_preflight_toolchain::{ndk, HostEnv, ResolvedMode, TargetTriple};

use crate::BuildError;

/// Bumped whenever a rule is added or its signatures change
pub const RULE_TABLE_VERSION: u32 = 1;

/// Inputs a rule may use to phrase its findings
pub struct DiagnosisContext<'a> {
    pub target: TargetTriple,
    pub mode: ResolvedMode,
    pub env: &'a HostEnv,
}

/// One known failure class
pub struct Rule {
    pub id: &'static str,
    /// Alternatives; any match triggers the rule
    pub signatures: &'static [&'static str],
    pub detection: fn(&DiagnosisContext) -> String,
    pub remedy: fn(&DiagnosisContext) -> Vec<String>,
}

/// The rule table, in reporting order
pub const RULES: &[Rule] = &[
    Rule {
        id: "compiler-lookup",
        signatures: &[
            r#"failed to find tool \\?"[A-Za-z0-9_.]+-linux-android(?:eabi)?[0-9]*-clang(?:\+\+)?\\?""#,
            r"Is `[A-Za-z0-9_.]+-linux-android(?:eabi)?[0-9]*-clang(?:\+\+)?` installed\?",
        ],
        detection: |ctx| {
            format!(
                "C compiler lookup failed: build scripts could not find `{}` for {}",
                ctx.target.compiler_tool(),
                ctx.target
            )
        },
        remedy: |ctx| ndk::linker_remediation(ctx.target, ctx.mode, ctx.env),
    },
    Rule {
        id: "linker-not-found",
        signatures: &[
            r"linker `[^`]+` not found",
            r"(?i)could not find (?:the )?linker",
            r"(?i)unable to find (?:a )?linker",
            r"(?i)error: linker '[^']+' not found",
        ],
        detection: |ctx| format!("Linker for {} was not found", ctx.target),
        remedy: |ctx| ndk::linker_remediation(ctx.target, ctx.mode, ctx.env),
    },
    Rule {
        id: "missing-target-std",
        signatures: &[
            r"can't find crate for `std`",
            r"can't find crate for `core`",
            r"target may not be installed",
        ],
        detection: |ctx| format!("Rust standard library for {} is not installed", ctx.target),
        remedy: |ctx| vec![ndk::install_target_command(ctx.target)],
    },
    Rule {
        id: "missing-executable",
        signatures: &[
            r"could not execute process `[^`]+`",
            r"Os \{ code: 2, kind: NotFound",
            r"(?m)^\s*(?:Caused by:\s*)?No such file or directory \(os error 2\)\s*$",
        ],
        detection: |ctx| {
            format!(
                "An executable in the build chain is missing; check that {} and {} point at real files",
                ctx.target.linker_env_var(),
                ctx.target.cc_env_var()
            )
        },
        remedy: |_| Vec::new(),
    },
];

struct CompiledRule {
    rule: &'static Rule,
    matcher: RegexSet,
}

/// Compiled rule table
pub struct DiagnosticEngine {
    rules: Vec<CompiledRule>,
}

impl DiagnosticEngine {
    /// Compile the rule table
    pub fn new() -> Result<Self, BuildError> {
        let rules = RULES
            .iter()
            .map(|rule| {
                RegexSet::new(rule.signatures)
                    .map(|matcher| CompiledRule { rule, matcher })
                    .map_err(|e| BuildError::Signature { rule: rule.id, source: e })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Ids of every rule matching `log`, in table order
    pub fn matching_rules(&self, log: &str) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|compiled| compiled.matcher.is_match(log))
            .map(|compiled| compiled.rule.id)
            .collect()
    }

    /// Record detections and suggestions for `log`; returns the number of matches
    pub fn diagnose(&self, log: &str, ctx: &DiagnosisContext, findings: &mut Findings) -> usize {
        let mut matched = 0;
        for compiled in &self.rules {
            if !compiled.matcher.is_match(log) {
                continue;
            }
            debug!("Rule {} matched", compiled.rule.id);
            matched += 1;
            findings.detect((compiled.rule.detection)(ctx));
            findings.suggest_all((compiled.rule.remedy)(ctx));
        }
        matched
    }

    /// Diagnose a log file; the file must exist
    pub fn diagnose_file(&self, path: &Path, ctx: &DiagnosisContext, findings: &mut Findings) -> Result<usize, BuildError> {
        if !path.is_file() {
            return Err(BuildError::LogNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let log = String::from_utf8_lossy(&bytes);
        let matched = self.diagnose(&log, ctx, findings);

        if matched == 0 {
            info!("No known failure signature in {:?}", path);
        } else {
            info!("{} failure signature(s) matched in {:?}", matched, path);
        }
        Ok(matched)
    }
}
