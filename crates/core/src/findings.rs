//! Findings accumulated during one run
//!
//! Warnings, detections and suggestions are append-only, ordered sequences
//! owned by the run context and passed by `&mut` to each stage.

use serde::Serialize;
use tracing::info;

/// Ordered findings of a single preflight run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Findings {
    warnings: Vec<String>,
    detections: Vec<String>,
    suggestions: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal configuration warning
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("warning: {}", message);
        self.warnings.push(message);
    }

    /// Record a matched failure signature
    pub fn detect(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("detected: {}", message);
        self.detections.push(message);
    }

    /// Record a remediation step. Repeated steps keep their first position.
    pub fn suggest(&mut self, command: impl Into<String>) {
        let command = command.into();
        if self.suggestions.contains(&command) {
            return;
        }
        info!("suggest: {}", command);
        self.suggestions.push(command);
    }

    pub fn suggest_all<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for command in commands {
            self.suggest(command);
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn detections(&self) -> &[String] {
        &self.detections
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.detections.is_empty() && self.suggestions.is_empty()
    }
}
