//! `validate` command: check configuration files without playing.

use std::path::Path;

use crate::cli::args::ValidateArgs;
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{ConfigError, Severity, SimonError, ValidationIssue};

/// Validates every file named on the command line.
///
/// # Errors
///
/// Returns the first file's configuration error, or a validation error
/// for warnings when `--strict` is set.
pub fn run(args: &ValidateArgs) -> Result<(), SimonError> {
    let loader = ConfigLoader::with_defaults();
    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let result = loader.load(path)?;
        check_warnings(path, &result, args.strict)?;
        println!("{}: ok", path.display());
    }
    Ok(())
}

/// Logs load warnings; under `strict` any warning fails validation.
fn check_warnings(path: &Path, result: &LoadResult, strict: bool) -> Result<(), ConfigError> {
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    if strict && !result.warnings.is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors: result
                .warnings
                .iter()
                .map(|w| ValidationIssue {
                    path: w.location.clone().unwrap_or_default(),
                    message: w.message.clone(),
                    severity: Severity::Warning,
                })
                .collect(),
        });
    }
    Ok(())
}
