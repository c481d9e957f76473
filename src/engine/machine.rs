//! Game state machine
//!
//! `GameEngine` owns the [`GameState`], the sequence generator and the
//! timer lanes, and drives the ports through every transition:
//!
//! ```text
//! Idle --start--> Displaying --playback complete--> AwaitingInput
//! AwaitingInput --full match, level < max--> Feedback --correct delay--> Displaying
//! AwaitingInput --full match, level >= max--> GameOver(win)
//! AwaitingInput --mismatch--> Feedback --incorrect delay--> GameOver(loss)
//! AwaitingInput --repeat--> Displaying (same sequence)
//! any --reset--> Idle
//! ```
//!
//! All mutation happens under one `std::sync::Mutex` which is never held
//! across an `.await`. Timer tasks hold only a `Weak` reference to the
//! engine and a [`Ticket`]; they re-check the ticket under the lock
//! before touching anything, so a superseded timer never acts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{GameConfig, RepeatPolicy};
use crate::error::EngineError;
use crate::identity::normalize_nickname;
use crate::observability::metrics;
use crate::observability::{EventEmitter, GameEvent};
use crate::ports::{MessageKind, PersistencePort, Ports};
use crate::scores::{MemoryStore, ScoreRecord, ScoreStore};

use super::generator::{RandomSource, SequenceGenerator, SignalSource};
use super::pacing::{PacingTable, PlaybackPlan};
use super::round::{self, IgnoreReason, Verdict};
use super::scheduler::{Lane, Scheduler, Ticket};
use super::signal::{Palette, Signal};
use super::state::{GameState, GameSummary, Phase};

const RUNNING_MESSAGE: &str = "Running...";
const YOUR_TURN_MESSAGE: &str = "Your turn!";
const CORRECT_MESSAGE: &str = "Correct!";
const INCORRECT_MESSAGE: &str = "Incorrect!";

/// Result of [`GameEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new game is playing its first sequence.
    Started,
    /// No nickname is set; nothing changed.
    NicknameRequired,
    /// A game is already under way; nothing changed.
    AlreadyRunning,
    /// The last game is over and must be reset first; nothing changed.
    ResetRequired,
}

// ============================================================================
// Shared engine core
// ============================================================================

pub(super) struct Inner {
    pub(super) state: GameState,
    pub(super) scheduler: Scheduler,
    generator: SequenceGenerator,
}

pub(super) struct Shared {
    pub(super) config: Arc<GameConfig>,
    palette: Palette,
    pacing: PacingTable,
    pub(super) ports: Ports,
    scores: ScoreStore,
    pub(super) events: Arc<EventEmitter>,
    inner: Mutex<Inner>,
}

impl Shared {
    pub(super) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts (or restarts) playback of the current sequence.
    ///
    /// Renewing the playback lane cancels whatever playback or feedback
    /// timer was outstanding.
    fn schedule_playback(self: &Arc<Self>, inner: &mut Inner) {
        let level = inner.state.level();
        let interval = self.pacing.interval_for(level);
        let plan = PlaybackPlan::new(
            inner.state.sequence(),
            interval,
            self.config.feedback.settle_delay,
        );
        inner.state.begin_playback();

        self.ports.renderer.set_interactive(false);
        self.ports.message.show(RUNNING_MESSAGE, MessageKind::Info);

        let ticket = inner.scheduler.renew(Lane::Playback);
        debug!(
            level,
            steps = plan.steps().len(),
            interval_ms = interval.as_millis(),
            "playback scheduled"
        );
        inner
            .scheduler
            .spawn(run_playback(Arc::downgrade(self), ticket, plan));
    }

    /// Playback finished: open the round for input.
    fn complete_playback(self: &Arc<Self>, inner: &mut Inner) {
        inner.state.await_input();
        self.ports.message.clear();
        self.ports.renderer.set_interactive(true);
        self.ports
            .message
            .show(YOUR_TURN_MESSAGE, MessageKind::Info);
        self.arm_idle(inner);
    }

    /// Flashes a submitted signal until the current interval elapses.
    fn flash(self: &Arc<Self>, inner: &Inner, signal: Signal) {
        self.ports.audio.play(signal);
        self.ports.renderer.highlight(signal);

        let ticket = inner.scheduler.ticket(Lane::Flash);
        let duration = self.pacing.interval_for(inner.state.level());
        let weak = Arc::downgrade(self);
        inner.scheduler.spawn(async move {
            if !ticket.sleep(duration).await {
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let inner = shared.lock();
            if inner.scheduler.is_current(&ticket) {
                shared.ports.renderer.clear_highlight(signal);
            }
        });
    }

    /// Schedules the transition that follows a verdict's feedback delay.
    fn schedule_feedback(self: &Arc<Self>, inner: &mut Inner, won_round: bool) {
        let delay = if won_round {
            self.config.feedback.correct_delay
        } else {
            self.config.feedback.incorrect_delay
        };
        let ticket = inner.scheduler.renew(Lane::Playback);
        let weak = Arc::downgrade(self);
        inner.scheduler.spawn(async move {
            if !ticket.sleep(delay).await {
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut inner = shared.lock();
            if !inner.scheduler.is_current(&ticket) || inner.state.phase() != Phase::Feedback {
                return;
            }
            if won_round {
                shared.advance_level(&mut inner);
            } else {
                shared.finish_game(&mut inner, false);
            }
        });
    }

    /// Grows the sequence by one and plays the next round.
    fn advance_level(self: &Arc<Self>, inner: &mut Inner) {
        self.ports.message.clear();

        let next = inner.generator.next_signal();
        inner.state.advance_level(next);
        if self.config.repeat_policy == RepeatPolicy::PerRound {
            inner.state.clear_repeat_used();
        }

        let level = inner.state.level();
        info!(level, "level advanced");
        self.emit_round_started(&inner.state);
        self.schedule_playback(inner);
    }

    /// Enters game over. Cancels every timer before touching state, so
    /// nothing from the finished game can fire afterwards.
    pub(super) fn finish_game(&self, inner: &mut Inner, won: bool) -> Option<GameSummary> {
        inner.scheduler.cancel_all();
        let summary = inner.state.finish(won)?;

        for signal in self.palette.signals() {
            self.ports.renderer.clear_highlight(signal);
        }
        self.ports.renderer.set_interactive(false);
        self.ports.message.clear();
        self.ports.overlay.show_game_end(&summary);

        info!(
            won = summary.won,
            level = summary.level,
            idle_script = summary.idle_script_triggered,
            "game over"
        );
        metrics::record_game_ended(summary.won, summary.level);
        self.events.emit(GameEvent::GameEnded {
            timestamp: Utc::now(),
            won: summary.won,
            level: summary.level,
            idle_script_triggered: summary.idle_script_triggered,
        });

        self.record_score(summary.level);
        Some(summary)
    }

    fn record_score(&self, level: u32) {
        let limits = self.scores.limits();
        let Some(nickname) = self
            .ports
            .identity
            .nickname()
            .and_then(|raw| normalize_nickname(&raw, limits.nickname_max_chars))
        else {
            warn!(level, "no nickname set; score not recorded");
            return;
        };

        let entry = ScoreRecord::now(level, nickname.clone());
        let board = self.scores.record(entry.clone());
        let rank = board.iter().position(|r| *r == entry).map(|i| i + 1);
        debug!(level, ?rank, "score recorded");
        self.events.emit(GameEvent::ScoreRecorded {
            timestamp: entry.timestamp,
            nickname,
            level,
            rank,
        });
    }

    fn emit_round_started(&self, state: &GameState) {
        let interval = self.pacing.interval_for(state.level());
        self.events.emit(GameEvent::RoundStarted {
            timestamp: Utc::now(),
            level: state.level(),
            sequence_len: state.sequence().len(),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        });
    }
}

/// Runs one playback: highlight and sound per step, then completion.
async fn run_playback(weak: Weak<Shared>, ticket: Ticket, plan: PlaybackPlan) {
    let start = Instant::now();

    for step in plan.steps() {
        if !ticket.sleep_until(start + step.at).await {
            return;
        }
        {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let inner = shared.lock();
            if !inner.scheduler.is_current(&ticket) {
                return;
            }
            shared.ports.renderer.highlight(step.signal);
            shared.ports.audio.play(step.signal);
        }

        if !ticket.sleep_until(start + step.at + plan.interval()).await {
            return;
        }
        {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let inner = shared.lock();
            if !inner.scheduler.is_current(&ticket) {
                return;
            }
            shared.ports.renderer.clear_highlight(step.signal);
        }
    }

    if !ticket.sleep_until(start + plan.complete_at()).await {
        return;
    }
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.lock();
    if inner.scheduler.is_current(&ticket) && inner.state.phase() == Phase::Displaying {
        shared.complete_playback(&mut inner);
    }
}

// ============================================================================
// Public engine
// ============================================================================

/// A sequence-memory game.
///
/// Operations are synchronous and never fail; timed behavior runs on the
/// tokio runtime the engine was built on. Dropping the engine cancels
/// every outstanding timer.
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &self.shared.lock().state)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Starts building an engine for `config`.
    #[must_use]
    pub fn builder(config: impl Into<Arc<GameConfig>>) -> GameEngineBuilder {
        GameEngineBuilder::new(config.into())
    }

    /// Starts a new game: draws the first signal and plays it.
    ///
    /// Requires a nickname from the identity port and an idle engine.
    pub fn start(&self) -> StartOutcome {
        let shared = &self.shared;
        let mut inner = shared.lock();
        shared.note_interaction(&mut inner);

        match inner.state.phase() {
            Phase::Idle => {}
            Phase::GameOver => return StartOutcome::ResetRequired,
            _ => return StartOutcome::AlreadyRunning,
        }
        let max_chars = shared.scores.limits().nickname_max_chars;
        let Some(nickname) = shared
            .ports
            .identity
            .nickname()
            .and_then(|raw| normalize_nickname(&raw, max_chars))
        else {
            debug!("start requested without a usable nickname");
            return StartOutcome::NicknameRequired;
        };

        let first = inner.generator.next_signal();
        inner.state.begin_game(shared.config.starting_level, first);
        shared.ports.overlay.hide();

        let level = inner.state.level();
        info!(%nickname, level, "game started");
        metrics::record_game_started();
        shared.events.emit(GameEvent::GameStarted {
            timestamp: Utc::now(),
            nickname,
            level,
        });
        shared.emit_round_started(&inner.state);
        shared.schedule_playback(&mut inner);
        StartOutcome::Started
    }

    /// Evaluates one player submission.
    ///
    /// Input outside [`Phase::AwaitingInput`] is ignored. Every evaluated
    /// submission plays and flashes the signal.
    pub fn submit(&self, signal: Signal) -> Verdict {
        let shared = &self.shared;
        let mut inner = shared.lock();
        shared.note_interaction(&mut inner);

        if !shared.palette.contains(signal) {
            debug!(%signal, "ignoring signal outside the palette");
            return Verdict::Ignored(IgnoreReason::UnknownSignal);
        }

        let verdict = round::evaluate(&mut inner.state, signal, shared.config.max_level);
        if let Verdict::Ignored(reason) = verdict {
            debug!(%signal, ?reason, "input ignored");
            return verdict;
        }
        shared.flash(&inner, signal);

        match verdict {
            Verdict::RoundComplete => {
                metrics::record_round_completed();
                shared.ports.renderer.set_interactive(false);
                shared
                    .ports
                    .message
                    .show(CORRECT_MESSAGE, MessageKind::Correct);
                shared.schedule_feedback(&mut inner, true);
            }
            Verdict::Won => {
                metrics::record_round_completed();
                shared.finish_game(&mut inner, true);
            }
            Verdict::Mismatch { expected } => {
                debug!(%signal, %expected, "mismatch");
                shared.ports.renderer.set_interactive(false);
                shared
                    .ports
                    .message
                    .show(INCORRECT_MESSAGE, MessageKind::Incorrect);
                shared.schedule_feedback(&mut inner, false);
            }
            Verdict::Progress { .. } | Verdict::Ignored(_) => {}
        }
        verdict
    }

    /// Replays the current sequence without growing it.
    ///
    /// Returns `false`, changing nothing, unless input is awaited and the
    /// replay allowance is unspent.
    pub fn repeat_sequence(&self) -> bool {
        let shared = &self.shared;
        let mut inner = shared.lock();
        shared.note_interaction(&mut inner);

        let state = &inner.state;
        if state.phase() != Phase::AwaitingInput || state.repeat_used() || state.sequence().is_empty()
        {
            debug!(
                phase = %state.phase(),
                repeat_used = state.repeat_used(),
                "repeat rejected"
            );
            return false;
        }

        inner.state.mark_repeat_used();
        let level = inner.state.level();
        info!(level, "repeat granted");
        metrics::record_repeat();
        shared.events.emit(GameEvent::RepeatRequested {
            timestamp: Utc::now(),
            level,
        });
        shared.schedule_playback(&mut inner);
        true
    }

    /// Cancels every timer and installs a fresh state with the idle-script
    /// toggle flipped. A no-op (returning `false`) when nothing has been
    /// played since the last reset.
    pub fn reset(&self) -> bool {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if inner.state.is_pristine() {
            debug!("reset ignored; nothing to reset");
            return false;
        }

        inner.scheduler.cancel_all();
        let from = inner.state.phase();
        inner.state = inner.state.next_after_reset();

        shared.ports.overlay.hide();
        shared.ports.message.clear();
        for signal in shared.palette.signals() {
            shared.ports.renderer.clear_highlight(signal);
        }
        shared.ports.renderer.set_interactive(false);

        info!(from = %from, "game reset");
        shared.events.emit(GameEvent::GameReset {
            timestamp: Utc::now(),
            from_phase: from.to_string(),
        });
        true
    }

    /// Resets and immediately starts a new game.
    pub fn restart(&self) -> StartOutcome {
        self.reset();
        self.start()
    }

    /// Ends the game in flight as a loss. Returns `None` when no game is
    /// in progress.
    pub fn force_game_over(&self) -> Option<GameSummary> {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if !inner.state.in_progress() {
            return None;
        }
        shared.finish_game(&mut inner, false)
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.shared.lock().state.clone()
    }

    /// Current leaderboard.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<ScoreRecord> {
        self.shared.scores.load()
    }

    /// Where a game ending at `level` would place on the leaderboard.
    #[must_use]
    pub fn rank_of(&self, level: u32) -> Option<usize> {
        self.shared.scores.rank_of(level)
    }

    /// The palette signals are drawn from.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.shared.palette
    }

    /// The configuration the engine runs with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    /// The ports the engine drives.
    #[must_use]
    pub fn ports(&self) -> &Ports {
        &self.shared.ports
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        self.shared.lock().scheduler.cancel_all();
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`GameEngine`].
///
/// Defaults: silent ports, in-memory scores, OS-seeded randomness, no
/// event stream, and the runtime of the calling context.
pub struct GameEngineBuilder {
    config: Arc<GameConfig>,
    ports: Ports,
    persistence: Option<Arc<dyn PersistencePort>>,
    source: Option<Box<dyn SignalSource>>,
    events: Arc<EventEmitter>,
    runtime: Option<Handle>,
}

impl std::fmt::Debug for GameEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngineBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GameEngineBuilder {
    fn new(config: Arc<GameConfig>) -> Self {
        Self {
            config,
            ports: Ports::silent(),
            persistence: None,
            source: None,
            events: Arc::new(EventEmitter::noop()),
            runtime: None,
        }
    }

    /// Ports the engine drives.
    #[must_use]
    pub fn ports(mut self, ports: Ports) -> Self {
        self.ports = ports;
        self
    }

    /// Leaderboard storage.
    #[must_use]
    pub fn persistence(mut self, persistence: Arc<dyn PersistencePort>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Source of sequence signals.
    #[must_use]
    pub fn source(mut self, source: impl SignalSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Structured event sink.
    #[must_use]
    pub fn events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// Runtime timers are spawned on.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPalette`] for an empty palette and
    /// [`EngineError::NoRuntime`] when no runtime was given and none is
    /// current.
    pub fn build(self) -> Result<GameEngine, EngineError> {
        let palette = Palette::new(self.config.palette.clone())?;
        let scheduler = match self.runtime {
            Some(handle) => Scheduler::new(handle),
            None => Scheduler::from_current()?,
        };
        let source = self
            .source
            .unwrap_or_else(|| Box::new(RandomSource::from_os_rng()));
        let persistence = self
            .persistence
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        let shared = Shared {
            pacing: PacingTable::from_config(&self.config.pacing),
            scores: ScoreStore::new(persistence, self.config.scores),
            palette: palette.clone(),
            ports: self.ports,
            events: self.events,
            inner: Mutex::new(Inner {
                state: GameState::default(),
                scheduler,
                generator: SequenceGenerator::new(palette, source),
            }),
            config: self.config,
        };
        Ok(GameEngine {
            shared: Arc::new(shared),
        })
    }
}
