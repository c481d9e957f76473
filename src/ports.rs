//! Collaborator ports
//!
//! The engine never draws, plays sound, prompts or touches storage
//! itself. It talks to its host through these traits. All of them are
//! called while the engine holds its state lock, so an implementation
//! must not call back into the engine synchronously.

use std::sync::Arc;

use serde::Serialize;

use crate::engine::signal::Signal;
use crate::engine::state::GameSummary;
use crate::error::ScoreError;
use crate::scores::ScoreRecord;

/// Visual presentation of signals.
pub trait RendererPort: Send + Sync {
    /// Lights up `signal`.
    fn highlight(&self, signal: Signal);
    /// Turns `signal` back off.
    fn clear_highlight(&self, signal: Signal);
    /// Enables or disables player controls ("busy" while `false`).
    fn set_interactive(&self, interactive: bool);
}

/// Sound for signals.
pub trait AudioPort: Send + Sync {
    /// Plays the sound associated with `signal`.
    fn play(&self, signal: Signal);
}

/// Category of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Neutral status ("Running...", "Your turn!").
    Info,
    /// A round was reproduced.
    Correct,
    /// A wrong signal was entered.
    Incorrect,
    /// A line of the idle background script.
    Idle,
}

/// Status line shown to the player.
pub trait MessagePort: Send + Sync {
    /// Replaces the status line.
    fn show(&self, text: &str, kind: MessageKind);
    /// Clears the status line.
    fn clear(&self);
}

/// End-of-game overlay.
pub trait OverlayPort: Send + Sync {
    /// Shows the outcome of a finished game.
    fn show_game_end(&self, summary: &GameSummary);
    /// Hides the overlay.
    fn hide(&self);
}

/// Session nickname holder.
pub trait IdentityPort: Send + Sync {
    /// The current nickname, if one has been set.
    fn nickname(&self) -> Option<String>;
    /// Sets the nickname. Returns the stored, normalised value or `None`
    /// if `raw` was rejected.
    fn set_nickname(&self, raw: &str) -> Option<String>;
}

/// Durable storage for the leaderboard.
pub trait PersistencePort: Send + Sync {
    /// Loads every stored record. Absent storage is an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`ScoreError`] when storage exists but cannot be read.
    fn load_scores(&self) -> Result<Vec<ScoreRecord>, ScoreError>;

    /// Replaces the stored records.
    ///
    /// # Errors
    ///
    /// Returns a [`ScoreError`] when storage cannot be written.
    fn save_scores(&self, records: &[ScoreRecord]) -> Result<(), ScoreError>;
}

/// The output and identity ports one engine talks to.
#[derive(Clone)]
pub struct Ports {
    /// Signal display.
    pub renderer: Arc<dyn RendererPort>,
    /// Signal sound.
    pub audio: Arc<dyn AudioPort>,
    /// Status line.
    pub message: Arc<dyn MessagePort>,
    /// End-of-game overlay.
    pub overlay: Arc<dyn OverlayPort>,
    /// Nickname holder.
    pub identity: Arc<dyn IdentityPort>,
}

impl Ports {
    /// Bundles individual ports.
    #[must_use]
    pub fn new(
        renderer: Arc<dyn RendererPort>,
        audio: Arc<dyn AudioPort>,
        message: Arc<dyn MessagePort>,
        overlay: Arc<dyn OverlayPort>,
        identity: Arc<dyn IdentityPort>,
    ) -> Self {
        Self {
            renderer,
            audio,
            message,
            overlay,
            identity,
        }
    }

    /// Uses one value for every output port, with a separate identity.
    #[must_use]
    pub fn from_shared<T>(output: Arc<T>, identity: Arc<dyn IdentityPort>) -> Self
    where
        T: RendererPort + AudioPort + MessagePort + OverlayPort + 'static,
    {
        Self {
            renderer: output.clone(),
            audio: output.clone(),
            message: output.clone(),
            overlay: output,
            identity,
        }
    }

    /// Ports that discard every call and report a fixed nickname.
    #[must_use]
    pub fn silent() -> Self {
        Self::from_shared(Arc::new(Silent), Arc::new(Silent))
    }
}

impl std::fmt::Debug for Ports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

/// No-op implementation of every output port.
///
/// As an identity it always answers `"player"`, so a headless engine can
/// start games without prompting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl RendererPort for Silent {
    fn highlight(&self, _signal: Signal) {}
    fn clear_highlight(&self, _signal: Signal) {}
    fn set_interactive(&self, _interactive: bool) {}
}

impl AudioPort for Silent {
    fn play(&self, _signal: Signal) {}
}

impl MessagePort for Silent {
    fn show(&self, _text: &str, _kind: MessageKind) {}
    fn clear(&self) {}
}

impl OverlayPort for Silent {
    fn show_game_end(&self, _summary: &GameSummary) {}
    fn hide(&self) {}
}

impl IdentityPort for Silent {
    fn nickname(&self) -> Option<String> {
        Some("player".to_string())
    }

    fn set_nickname(&self, _raw: &str) -> Option<String> {
        self.nickname()
    }
}
