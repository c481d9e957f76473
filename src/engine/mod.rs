//! Game engine
//!
//! Sequence generation, playback pacing, timer lanes, round evaluation,
//! the state machine, and the idle background script.

pub mod generator;
pub mod idle;
pub mod machine;
pub mod pacing;
pub mod round;
pub mod scheduler;
pub mod signal;
pub mod state;

pub use generator::{RandomSource, ScriptedSource, SequenceGenerator, SignalSource};
pub use machine::{GameEngine, GameEngineBuilder, StartOutcome};
pub use pacing::{PacingTable, PlaybackPlan, PlaybackStep};
pub use round::{IgnoreReason, Verdict};
pub use scheduler::{Lane, Scheduler, Ticket};
pub use signal::{Palette, Signal};
pub use state::{EasterEgg, GameState, GameSummary, Phase};
