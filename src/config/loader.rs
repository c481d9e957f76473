//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and read (UTF-8 BOM tolerated)
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing into [`GameConfig`]
//! 4. Validation
//! 5. Pacing tiers sorted from the highest `min_level` down
//! 6. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::GameConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Environment variable naming a default configuration file.
pub const CONFIG_ENV_VAR: &str = "SIMON_CONFIG";

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("SIMON_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<GameConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, if an
    /// environment reference marked `${VAR:?msg}` is unset, if YAML
    /// parsing fails, or if validation reports errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw, path)
    }

    /// Loads a configuration from YAML text. `origin` is only used in
    /// error messages.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file checks.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new(origin);
        let substituted = env_sub.substitute(raw)?;
        let mut warnings = env_sub.warnings;

        let mut config: GameConfig = if substituted.trim().is_empty() {
            warnings.push(LoadWarning {
                message: "configuration is empty, using defaults".to_string(),
                location: Some(origin.display().to_string()),
            });
            GameConfig::default()
        } else {
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        config
            .pacing
            .tiers
            .sort_by(|a, b| b.min_level.cmp(&a.min_level));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

/// Resolves the configuration path from an explicit argument or
/// [`CONFIG_ENV_VAR`].
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Supports `${VAR}`, `${VAR:-default}`, `${VAR:?message}` and `$$`.
struct EnvSubstitution<'a> {
    origin: &'a Path,
    warnings: Vec<LoadWarning>,
}

impl<'a> EnvSubstitution<'a> {
    const fn new(origin: &'a Path) -> Self {
        Self {
            origin,
            warnings: Vec::new(),
        }
    }

    fn substitute(&mut self, raw: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = self.read_spec(&mut chars)?;
                    self.expand(&spec, &mut result)?;
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn read_spec(
        &self,
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    ) -> Result<String, ConfigError> {
        let mut spec = String::new();
        for c in chars.by_ref() {
            if c == '}' {
                return Ok(spec);
            }
            spec.push(c);
        }
        Err(ConfigError::ParseError {
            path: self.origin.to_path_buf(),
            line: None,
            message: format!("unclosed environment variable reference: ${{{spec}"),
        })
    }

    fn expand(&mut self, spec: &str, out: &mut String) -> Result<(), ConfigError> {
        let (name, fallback) = match spec.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (spec, None),
        };

        if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
            return Ok(());
        }

        match fallback {
            Some(rest) if rest.starts_with('-') => {
                out.push_str(&rest[1..]);
                Ok(())
            }
            Some(rest) if rest.starts_with('?') => Err(ConfigError::EnvVarNotSet {
                var: name.to_string(),
                location: rest[1..].to_string(),
            }),
            _ => {
                self.warnings.push(LoadWarning {
                    message: format!(
                        "environment variable '{name}' is not set, using empty string"
                    ),
                    location: Some(self.origin.display().to_string()),
                });
                Ok(())
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
