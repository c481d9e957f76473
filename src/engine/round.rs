//! Round controller
//!
//! Evaluates one player submission against the live sequence. The
//! function is synchronous and timer-free; the state machine turns the
//! returned [`Verdict`] into feedback, level advance or game over.

use serde::Serialize;

use super::signal::Signal;
use super::state::{GameState, Phase};

/// Why a submission was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "phase")]
pub enum IgnoreReason {
    /// Input arrived outside [`Phase::AwaitingInput`].
    WrongPhase(Phase),
    /// The round was already fully reproduced.
    RoundSatisfied,
    /// The signal is not part of the palette.
    UnknownSignal,
}

/// Result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    /// Nothing was evaluated and nothing changed.
    Ignored(IgnoreReason),
    /// Correct so far; more signals are needed.
    Progress {
        /// Signals reproduced this round.
        matched: usize,
        /// Signals still to enter.
        remaining: usize,
    },
    /// The round is complete and the next level follows.
    RoundComplete,
    /// The round at the maximum level is complete.
    Won,
    /// Wrong signal; the game ends after the feedback delay.
    Mismatch {
        /// The signal that was due.
        expected: Signal,
    },
}

impl Verdict {
    /// Whether the submission was compared against the sequence.
    #[must_use]
    pub const fn was_evaluated(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Compares `signal` with the next expected signal.
///
/// On a match the cursor advances; a completed round below `max_level`
/// and a mismatch both move the state into [`Phase::Feedback`]. A
/// completed round at or above `max_level` is [`Verdict::Won`] and leaves
/// the phase for the caller to finish.
pub fn evaluate(state: &mut GameState, signal: Signal, max_level: u32) -> Verdict {
    if state.phase() != Phase::AwaitingInput {
        return Verdict::Ignored(IgnoreReason::WrongPhase(state.phase()));
    }
    let Some(expected) = state.expected() else {
        return Verdict::Ignored(IgnoreReason::RoundSatisfied);
    };

    if signal != expected {
        state.enter_feedback();
        return Verdict::Mismatch { expected };
    }

    let matched = state.accept_input();
    let remaining = state.sequence().len() - matched;
    if remaining > 0 {
        return Verdict::Progress { matched, remaining };
    }

    if state.level() >= max_level {
        Verdict::Won
    } else {
        state.enter_feedback();
        Verdict::RoundComplete
    }
}
