//! Game state
//!
//! [`GameState`] is the single value the engine mutates. Its fields are
//! private; transitions go through the methods below so the sequence and
//! cursor invariants cannot be broken from outside the engine.

use serde::Serialize;

use super::signal::Signal;

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No game in progress.
    #[default]
    Idle,
    /// The sequence is being played back; input is ignored.
    Displaying,
    /// Waiting for the player to reproduce the sequence.
    AwaitingInput,
    /// Showing the verdict of the last evaluation.
    Feedback,
    /// Terminal until reset.
    GameOver,
}

impl Phase {
    /// Name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Displaying => "displaying",
            Self::AwaitingInput => "awaiting_input",
            Self::Feedback => "feedback",
            Self::GameOver => "game_over",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idle background-script bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EasterEgg {
    /// The inactivity timer is pending.
    pub armed: bool,
    /// The script has fired this game; it never re-arms afterwards.
    pub triggered: bool,
    /// Script lines are currently being emitted.
    pub active: bool,
    /// Selects the snarky script. Survives resets, flipped each time.
    pub toggle_flag: bool,
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Whether the player reproduced the sequence at the maximum level.
    pub won: bool,
    /// Level reached; this is the score.
    pub level: u32,
    /// Whether the idle script fired during the game.
    pub idle_script_triggered: bool,
}

/// State of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    level: u32,
    sequence: Vec<Signal>,
    input_cursor: usize,
    phase: Phase,
    repeat_used: bool,
    easter_egg: EasterEgg,
    outcome: Option<GameSummary>,
}

impl GameState {
    /// Fresh state with the given idle-script toggle.
    #[must_use]
    pub fn new(toggle_flag: bool) -> Self {
        Self {
            level: 0,
            sequence: Vec::new(),
            input_cursor: 0,
            phase: Phase::Idle,
            repeat_used: false,
            easter_egg: EasterEgg {
                toggle_flag,
                ..EasterEgg::default()
            },
            outcome: None,
        }
    }

    /// The state installed by a reset: fresh, with the toggle flipped.
    #[must_use]
    pub fn next_after_reset(&self) -> Self {
        Self::new(!self.easter_egg.toggle_flag)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current level; also the score.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// The sequence generated so far.
    #[must_use]
    pub fn sequence(&self) -> &[Signal] {
        &self.sequence
    }

    /// Signals correctly reproduced this round.
    #[must_use]
    pub const fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the replay allowance has been spent.
    #[must_use]
    pub const fn repeat_used(&self) -> bool {
        self.repeat_used
    }

    /// Idle-script bookkeeping.
    #[must_use]
    pub const fn easter_egg(&self) -> EasterEgg {
        self.easter_egg
    }

    /// Summary of the finished game, once in [`Phase::GameOver`].
    #[must_use]
    pub const fn outcome(&self) -> Option<GameSummary> {
        self.outcome
    }

    /// Idle with nothing generated; a reset here changes nothing.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.phase == Phase::Idle && self.sequence.is_empty()
    }

    /// Whether a game is under way (anything between start and game over).
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        matches!(
            self.phase,
            Phase::Displaying | Phase::AwaitingInput | Phase::Feedback
        )
    }

    /// The signal the player must enter next, if a round is open.
    #[must_use]
    pub fn expected(&self) -> Option<Signal> {
        self.sequence.get(self.input_cursor).copied()
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Starts a game at `starting_level` with `first` as the sequence.
    pub fn begin_game(&mut self, starting_level: u32, first: Signal) {
        self.level = starting_level;
        self.sequence.clear();
        self.sequence.push(first);
        self.input_cursor = 0;
        self.repeat_used = false;
        self.outcome = None;
        self.phase = Phase::Displaying;
    }

    /// Moves to the next level, growing the sequence by exactly one.
    pub fn advance_level(&mut self, next: Signal) {
        self.level = self.level.saturating_add(1);
        self.sequence.push(next);
        self.input_cursor = 0;
        self.phase = Phase::Displaying;
    }

    /// Enters playback of the current sequence without growing it.
    pub fn begin_playback(&mut self) {
        self.input_cursor = 0;
        self.phase = Phase::Displaying;
    }

    /// Opens the round for input.
    pub fn await_input(&mut self) {
        self.input_cursor = 0;
        self.phase = Phase::AwaitingInput;
    }

    /// Records one correctly reproduced signal. Returns the new cursor.
    pub(crate) fn accept_input(&mut self) -> usize {
        self.input_cursor = (self.input_cursor + 1).min(self.sequence.len());
        self.input_cursor
    }

    /// Shows the verdict of an evaluation.
    pub fn enter_feedback(&mut self) {
        self.phase = Phase::Feedback;
    }

    /// Enters [`Phase::GameOver`]. Returns the summary the first time,
    /// `None` if the game was already over.
    pub fn finish(&mut self, won: bool) -> Option<GameSummary> {
        if self.phase == Phase::GameOver {
            return None;
        }
        let summary = GameSummary {
            won,
            level: self.level,
            idle_script_triggered: self.easter_egg.triggered,
        };
        self.phase = Phase::GameOver;
        self.outcome = Some(summary);
        self.easter_egg.armed = false;
        self.easter_egg.active = false;
        Some(summary)
    }

    /// Spends the replay allowance.
    pub fn mark_repeat_used(&mut self) {
        self.repeat_used = true;
    }

    /// Restores the replay allowance.
    pub fn clear_repeat_used(&mut self) {
        self.repeat_used = false;
    }

    /// Marks the inactivity timer as pending.
    pub fn arm_idle(&mut self) {
        self.easter_egg.armed = true;
    }

    /// Clears a pending inactivity timer. Returns whether one was armed.
    pub fn disarm_idle(&mut self) -> bool {
        std::mem::replace(&mut self.easter_egg.armed, false)
    }

    /// The inactivity timer fired: the script starts and can never re-arm.
    pub fn trigger_idle(&mut self) {
        self.easter_egg.armed = false;
        self.easter_egg.triggered = true;
        self.easter_egg.active = true;
    }

    /// Stops script emission. Returns whether it was running.
    pub fn silence_idle(&mut self) -> bool {
        std::mem::replace(&mut self.easter_egg.active, false)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(false)
    }
}
