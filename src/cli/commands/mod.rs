//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod config;
pub mod play;
pub mod scores;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::config::loader::resolve_config_path;
use crate::config::{ConfigLoader, GameConfig};
use crate::error::SimonError;
use crate::scores::DEFAULT_SCORES_FILE;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), SimonError> {
    match cli.command {
        Commands::Play(args) => play::run(&args).await,
        Commands::Scores(args) => scores::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Config => config::run(),
    }
}

/// Loads the configuration named by `explicit` or `SIMON_CONFIG`, or the
/// defaults when neither is given. Load warnings are logged.
///
/// # Errors
///
/// Returns a configuration error if the file cannot be loaded.
pub fn load_config(explicit: Option<&Path>) -> Result<Arc<GameConfig>, SimonError> {
    let Some(path) = resolve_config_path(explicit) else {
        tracing::debug!("no configuration file given; using defaults");
        return Ok(Arc::new(GameConfig::default()));
    };

    tracing::info!(file = %path.display(), "loading configuration");
    let result = ConfigLoader::with_defaults().load(&path)?;
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(result.config)
}

/// Score file path: the explicit one, else [`DEFAULT_SCORES_FILE`].
#[must_use]
pub fn scores_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_SCORES_FILE), Path::to_path_buf)
}
