//! Error types for `simon`
//!
//! The engine itself never surfaces errors to the player: out-of-phase input
//! is ignored and persistence failures degrade to an empty leaderboard. The
//! types here cover the fallible edges around it: configuration loading,
//! score persistence, runtime wiring, and the CLI exit code mapping.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for the `simon` binary.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Score store error (unreadable or unwritable leaderboard)
    pub const SCORE_ERROR: i32 = 4;

    /// Engine error (no runtime available for timers)
    pub const ENGINE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `simon` operations.
#[derive(Debug, Error)]
pub enum SimonError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Leaderboard persistence error
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Engine wiring error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Invalid command-line usage detected after parsing
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimonError {
    /// Returns the exit code the binary should terminate with.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Score(_) | Self::Json(_) => ExitCode::SCORE_ERROR,
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path (or label) of the configuration that failed
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "pacing.tiers[1]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Score Store Errors
// ============================================================================

/// Leaderboard persistence errors.
///
/// The engine logs these and carries on with an empty or unchanged
/// leaderboard; they only reach the user through the `scores` command.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// I/O error reading or writing the score file
    #[error("score store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The score file is not a JSON array
    #[error("score store is corrupt: {0}")]
    Corrupt(String),

    /// JSON serialization error while saving
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Errors raised while wiring up a `GameEngine`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine schedules its timers on a tokio runtime
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),

    /// The palette has no signals to draw from
    #[error("palette is empty")]
    EmptyPalette,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `simon` operations.
pub type Result<T> = std::result::Result<T, SimonError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::SCORE_ERROR, 4);
        assert_eq!(ExitCode::ENGINE_ERROR, 5);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
    }

    #[test]
    fn test_every_error_maps_to_a_specific_exit_code() {
        let errors: Vec<SimonError> = vec![
            ConfigError::MissingFile {
                path: PathBuf::from("/test"),
            }
            .into(),
            serde_yaml::from_str::<u32>("[").unwrap_err().into(),
            ScoreError::Corrupt("x".to_string()).into(),
            serde_json::from_str::<u32>("{").unwrap_err().into(),
            EngineError::EmptyPalette.into(),
            SimonError::Usage("bad".to_string()),
            std::io::Error::other("boom").into(),
        ];
        for err in &errors {
            let code = err.exit_code();
            assert_ne!(code, ExitCode::SUCCESS, "{err}");
            assert_ne!(code, 1, "{err} fell back to a generic code");
        }
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: SimonError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_score_error_exit_code() {
        let err: SimonError = ScoreError::Corrupt("not an array".to_string()).into();
        assert_eq!(err.exit_code(), ExitCode::SCORE_ERROR);
    }

    #[test]
    fn test_engine_error_exit_code() {
        let err: SimonError = EngineError::EmptyPalette.into();
        assert_eq!(err.exit_code(), ExitCode::ENGINE_ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = SimonError::Usage("bad".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: SimonError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "palette".to_string(),
            message: "palette is empty".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(issue.to_string(), "error: palette is empty at palette");
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "pacing.tiers".to_string(),
            message: "tiers are not sorted".to_string(),
            severity: Severity::Warning,
        };
        assert_eq!(
            issue.to_string(),
            "warning: tiers are not sorted at pacing.tiers"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("simon.yaml"),
            line: Some(3),
            message: "unexpected token".to_string(),
        };
        assert!(err.to_string().contains("simon.yaml"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_config_error_env_var_display() {
        let err = ConfigError::EnvVarNotSet {
            var: "SIMON_MAX_LEVEL".to_string(),
            location: "line 2".to_string(),
        };
        assert!(err.to_string().contains("SIMON_MAX_LEVEL"));
        assert!(err.to_string().contains("line 2"));
    }
}
