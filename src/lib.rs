//! `simon` - sequence-memory game engine
//!
//! The machine plays a growing sequence of signals and the player must
//! reproduce it; one wrong signal ends the game. The [`engine`] owns the
//! game state, timed playback and the idle background script, and talks
//! to its host only through the traits in [`ports`].

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod observability;
pub mod ports;
pub mod scores;
