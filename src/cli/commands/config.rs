//! `config` command: print the default configuration.

use crate::config::GameConfig;
use crate::error::SimonError;

/// Renders the default configuration as YAML.
///
/// # Errors
///
/// Returns a YAML error if serialization fails.
pub fn render_default() -> Result<String, SimonError> {
    Ok(serde_yaml::to_string(&GameConfig::default())?)
}

/// Prints the default configuration to stdout.
///
/// # Errors
///
/// Returns a YAML error if serialization fails.
pub fn run() -> Result<(), SimonError> {
    print!("{}", render_default()?);
    Ok(())
}
