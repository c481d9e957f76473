//! Configuration validation
//!
//! Semantic checks on a deserialized [`GameConfig`]. Validation collects
//! every issue instead of stopping at the first one so `simon validate`
//! can report them all at once.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::schema::GameConfig;
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &GameConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_palette(&config.palette);
        self.validate_levels(config);
        self.validate_pacing(config);
        self.validate_feedback(config);
        self.validate_idle(config);
        self.validate_scores(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_palette(&mut self, palette: &[String]) {
        if palette.is_empty() {
            self.add_error("palette", "palette must contain at least one signal");
            return;
        }
        if palette.len() == 1 {
            self.add_warning("palette", "a single-signal palette makes every round trivial");
        }

        let mut seen = HashSet::new();
        for (i, name) in palette.iter().enumerate() {
            let path = format!("palette[{i}]");
            if name.trim().is_empty() {
                self.add_error(&path, "signal name cannot be empty");
            } else if !seen.insert(name.to_ascii_lowercase()) {
                self.add_error(&path, &format!("duplicate signal name '{name}'"));
            }
        }
    }

    fn validate_levels(&mut self, config: &GameConfig) {
        if config.max_level < config.starting_level {
            self.add_error(
                "max_level",
                &format!(
                    "max_level ({}) is below starting_level ({})",
                    config.max_level, config.starting_level
                ),
            );
        }
    }

    fn validate_pacing(&mut self, config: &GameConfig) {
        let pacing = &config.pacing;
        if pacing.default_interval.is_zero() {
            self.add_error("pacing.default_interval", "interval must be greater than zero");
        }

        let mut seen = HashSet::new();
        for (i, tier) in pacing.tiers.iter().enumerate() {
            let path = format!("pacing.tiers[{i}]");
            if tier.interval.is_zero() {
                self.add_error(&path, "interval must be greater than zero");
            }
            if !seen.insert(tier.min_level) {
                self.add_error(
                    &path,
                    &format!("duplicate tier for min_level {}", tier.min_level),
                );
            }
        }

        let descending = pacing
            .tiers
            .windows(2)
            .all(|pair| pair[0].min_level > pair[1].min_level);
        if !descending {
            self.add_warning(
                "pacing.tiers",
                "tiers are not listed from the highest min_level down; they will be sorted",
            );
        }
    }

    fn validate_feedback(&mut self, config: &GameConfig) {
        let long = Duration::from_secs(10);
        if config.feedback.correct_delay > long {
            self.add_warning("feedback.correct_delay", "delay is unusually long (> 10s)");
        }
        if config.feedback.incorrect_delay > long {
            self.add_warning("feedback.incorrect_delay", "delay is unusually long (> 10s)");
        }
    }

    fn validate_idle(&mut self, config: &GameConfig) {
        let idle = &config.idle;
        if !idle.enabled {
            return;
        }
        if idle.delay.is_zero() {
            self.add_error("idle.delay", "delay must be greater than zero");
        }
        if idle.cadence.is_zero() {
            self.add_error("idle.cadence", "cadence must be greater than zero");
        }
        if idle.regular_script.is_empty() {
            self.add_error("idle.regular_script", "script cannot be empty while idle is enabled");
        }
        if idle.snarky_script.is_empty() {
            self.add_error("idle.snarky_script", "script cannot be empty while idle is enabled");
        }
    }

    fn validate_scores(&mut self, config: &GameConfig) {
        if config.scores.max_entries == 0 {
            self.add_error("scores.max_entries", "leaderboard must keep at least one entry");
        }
        if config.scores.nickname_max_chars == 0 {
            self.add_error(
                "scores.nickname_max_chars",
                "nickname limit must allow at least one character",
            );
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
