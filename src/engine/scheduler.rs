//! Timer lanes and cancellation
//!
//! Every timer the engine starts belongs to a [`Lane`]. A lane owns a
//! `CancellationToken` and a generation counter; a timer captures a
//! [`Ticket`] for the lane's current generation when it is scheduled.
//!
//! Cancelling a lane cancels its token (waking every sleeping timer so
//! the task exits) and bumps the generation. Timer callbacks re-check
//! [`Scheduler::is_current`] under the engine lock before acting, so a
//! timer that was already past its sleep when the lane was cancelled
//! still cannot touch state that belongs to a newer generation.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::EngineError;

/// Independently cancellable timer groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Sequence playback and the feedback delays that follow evaluation.
    Playback,
    /// Inactivity arm timer and background script emission.
    Idle,
    /// Dimming of the highlight flashed for a player submission.
    Flash,
}

/// Proof that a timer was scheduled under a lane's generation.
#[derive(Debug, Clone)]
pub struct Ticket {
    lane: Lane,
    generation: u64,
    token: CancellationToken,
}

impl Ticket {
    /// Lane the ticket was issued on.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Generation the ticket was issued under.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the lane has been cancelled since the ticket was issued.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleeps until `deadline`. Returns `false` if the lane was cancelled
    /// first.
    pub async fn sleep_until(&self, deadline: Instant) -> bool {
        tokio::select! {
            biased;
            () = self.token.cancelled() => false,
            () = tokio::time::sleep_until(deadline) => true,
        }
    }

    /// Sleeps for `duration`. Returns `false` if the lane was cancelled
    /// first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration).await
    }
}

#[derive(Debug)]
struct LaneState {
    generation: u64,
    token: CancellationToken,
}

impl LaneState {
    fn new() -> Self {
        Self {
            generation: 0,
            token: CancellationToken::new(),
        }
    }

    fn cancel(&mut self) {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Owns the timer lanes of one engine and the runtime its timers run on.
#[derive(Debug)]
pub struct Scheduler {
    playback: LaneState,
    idle: LaneState,
    flash: LaneState,
    runtime: Handle,
}

impl Scheduler {
    /// Creates a scheduler spawning timers on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            playback: LaneState::new(),
            idle: LaneState::new(),
            flash: LaneState::new(),
            runtime,
        }
    }

    /// Creates a scheduler on the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] outside a tokio runtime.
    pub fn from_current() -> Result<Self, EngineError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| EngineError::NoRuntime(e.to_string()))
    }

    fn lane(&self, lane: Lane) -> &LaneState {
        match lane {
            Lane::Playback => &self.playback,
            Lane::Idle => &self.idle,
            Lane::Flash => &self.flash,
        }
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut LaneState {
        match lane {
            Lane::Playback => &mut self.playback,
            Lane::Idle => &mut self.idle,
            Lane::Flash => &mut self.flash,
        }
    }

    /// Issues a ticket for the lane's current generation without
    /// disturbing timers already outstanding on it.
    #[must_use]
    pub fn ticket(&self, lane: Lane) -> Ticket {
        let state = self.lane(lane);
        Ticket {
            lane,
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    /// Cancels everything outstanding on `lane` and issues a ticket for
    /// the fresh generation.
    pub fn renew(&mut self, lane: Lane) -> Ticket {
        self.cancel(lane);
        self.ticket(lane)
    }

    /// Cancels everything outstanding on `lane`.
    pub fn cancel(&mut self, lane: Lane) {
        let state = self.lane_mut(lane);
        state.cancel();
        trace!(?lane, generation = state.generation, "lane cancelled");
    }

    /// Cancels every lane.
    pub fn cancel_all(&mut self) {
        self.cancel(Lane::Playback);
        self.cancel(Lane::Idle);
        self.cancel(Lane::Flash);
    }

    /// Whether `ticket` still belongs to its lane's live generation.
    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let state = self.lane(ticket.lane());
        let current = state.generation == ticket.generation() && !ticket.is_cancelled();
        if !current {
            trace!(
                lane = ?ticket.lane(),
                generation = ticket.generation(),
                live = state.generation,
                "stale timer skipped"
            );
        }
        current
    }

    /// Spawns a timer task on the scheduler's runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.runtime.spawn(task));
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
