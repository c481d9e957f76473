//! `scores` command: print the leaderboard.

use std::sync::Arc;

use crate::cli::args::{OutputFormat, ScoresArgs};
use crate::cli::terminal::format_leaderboard;
use crate::error::SimonError;
use crate::ports::PersistencePort;
use crate::scores::{JsonFileStore, ScoreRecord, ScoreStore};

use super::{load_config, scores_path};

/// Prints the leaderboard from the score file.
///
/// Unlike the engine, this command reports an unreadable score file
/// instead of showing an empty leaderboard.
///
/// # Errors
///
/// Returns a score error if the file exists but cannot be read, or a
/// configuration error if the given config fails to load.
pub fn run(args: &ScoresArgs) -> Result<(), SimonError> {
    let config = load_config(args.config.as_deref())?;
    let file = JsonFileStore::new(scores_path(args.scores.as_deref()));
    let raw = file.load_scores()?;
    let board = ScoreStore::new(Arc::new(file), config.scores).normalize(raw);
    println!("{}", render(&board, args.format)?);
    Ok(())
}

/// Renders a leaderboard in the requested format.
///
/// # Errors
///
/// Returns a JSON error if serialization fails.
pub fn render(board: &[ScoreRecord], format: OutputFormat) -> Result<String, SimonError> {
    match format {
        OutputFormat::Human => Ok(format_leaderboard(board).join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(board)?),
    }
}
