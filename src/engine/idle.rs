//! Idle background script
//!
//! When a round opens for input and the script has not fired yet this
//! game, one inactivity timer is armed. If it fires, the script starts:
//! line `k` is shown at `(k + 1) × cadence`. Any interaction disarms a
//! pending timer or silences a running script, and the script never
//! re-arms within the same game.

use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::IdleConfig;
use crate::observability::GameEvent;
use crate::observability::metrics;
use crate::ports::MessageKind;

use super::machine::{Inner, Shared};
use super::scheduler::{Lane, Ticket};

/// Placeholder replaced by the current level in script lines.
pub const LEVEL_PLACEHOLDER: &str = "{level}";

/// Script for a game: the snarky one when the toggle is set.
#[must_use]
pub fn select_script(config: &IdleConfig, toggle_flag: bool) -> &[String] {
    if toggle_flag {
        &config.snarky_script
    } else {
        &config.regular_script
    }
}

/// Substitutes the current level into a script line.
#[must_use]
pub fn render_line(line: &str, level: u32) -> String {
    line.replace(LEVEL_PLACEHOLDER, &level.to_string())
}

impl Shared {
    /// Arms the inactivity timer unless the feature is off or the script
    /// already fired this game.
    pub(super) fn arm_idle(self: &Arc<Self>, inner: &mut Inner) {
        if !self.config.idle.enabled || inner.state.easter_egg().triggered {
            return;
        }
        inner.state.arm_idle();
        let ticket = inner.scheduler.renew(Lane::Idle);
        inner
            .scheduler
            .spawn(run_idle(Arc::downgrade(self), ticket, self.config.idle.delay));
    }

    /// Records player activity: disarms a pending timer and silences a
    /// running script.
    pub(super) fn note_interaction(&self, inner: &mut Inner) {
        let disarmed = inner.state.disarm_idle();
        let silenced = inner.state.silence_idle();
        if disarmed || silenced {
            debug!(disarmed, silenced, "idle script interrupted");
            inner.scheduler.cancel(Lane::Idle);
        }
    }
}

async fn run_idle(weak: Weak<Shared>, ticket: Ticket, delay: std::time::Duration) {
    if !ticket.sleep(delay).await {
        return;
    }

    let (script, cadence) = {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        if !inner.scheduler.is_current(&ticket) || !inner.state.easter_egg().armed {
            return;
        }
        inner.state.trigger_idle();

        let toggle = inner.state.easter_egg().toggle_flag;
        let level = inner.state.level();
        info!(level, snarky = toggle, "idle script started");
        metrics::record_idle_script();
        shared.events.emit(GameEvent::IdleScriptStarted {
            timestamp: Utc::now(),
            level,
            snarky: toggle,
        });
        (
            select_script(&shared.config.idle, toggle).to_vec(),
            shared.config.idle.cadence,
        )
    };

    let fired_at = Instant::now();
    let last = script.len().saturating_sub(1);
    for (k, line) in script.iter().enumerate() {
        let offset = cadence.saturating_mul(u32::try_from(k + 1).unwrap_or(u32::MAX));
        if !ticket.sleep_until(fired_at + offset).await {
            return;
        }
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        if !inner.scheduler.is_current(&ticket) || !inner.state.easter_egg().active {
            return;
        }
        let text = render_line(line, inner.state.level());
        shared.ports.message.show(&text, MessageKind::Idle);
        if k == last {
            inner.state.silence_idle();
            debug!("idle script finished");
        }
    }
}
