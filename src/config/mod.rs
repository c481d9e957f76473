//! Configuration module
//!
//! Loading and validation of the game configuration: palette, level
//! bounds, pacing table, feedback and idle delays, repeat policy and
//! leaderboard limits.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{CONFIG_ENV_VAR, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
