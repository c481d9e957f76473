//! Playback pacing
//!
//! The pacing table is the single source of truth for how fast a
//! sequence is shown; the initial playback of a round and a manual
//! replay both build their [`PlaybackPlan`] from it.

use std::time::Duration;

use crate::config::schema::{PacingConfig, PacingTier};

use super::signal::Signal;

/// Level → step interval lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingTable {
    /// Sorted by `min_level`, highest first.
    tiers: Vec<PacingTier>,
    default_interval: Duration,
}

impl PacingTable {
    /// Builds a table, sorting tiers from the highest threshold down.
    #[must_use]
    pub fn from_config(config: &PacingConfig) -> Self {
        let mut tiers = config.tiers.clone();
        tiers.sort_by(|a, b| b.min_level.cmp(&a.min_level));
        Self {
            tiers,
            default_interval: config.default_interval,
        }
    }

    /// Step interval at `level`: the first tier (highest threshold first)
    /// with `min_level <= level`, else the default.
    #[must_use]
    pub fn interval_for(&self, level: u32) -> Duration {
        self.tiers
            .iter()
            .find(|tier| level >= tier.min_level)
            .map_or(self.default_interval, |tier| tier.interval)
    }
}

/// One highlight in a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Offset from playback start at which the signal lights up.
    pub at: Duration,
    /// Signal to show.
    pub signal: Signal,
}

/// Precomputed timeline of one playback.
///
/// Step `i` lights at `i × interval × 2` and goes dark `interval` later;
/// completion fires at `len × interval × 2 + settle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackPlan {
    steps: Vec<PlaybackStep>,
    interval: Duration,
    complete_at: Duration,
}

impl PlaybackPlan {
    /// Lays out `sequence` at `interval` per step.
    #[must_use]
    pub fn new(sequence: &[Signal], interval: Duration, settle: Duration) -> Self {
        let steps = sequence
            .iter()
            .enumerate()
            .map(|(i, &signal)| PlaybackStep {
                at: double_steps(interval, i),
                signal,
            })
            .collect();
        Self {
            steps,
            interval,
            complete_at: double_steps(interval, sequence.len()).saturating_add(settle),
        }
    }

    /// Steps in firing order.
    #[must_use]
    pub fn steps(&self) -> &[PlaybackStep] {
        &self.steps
    }

    /// How long each highlight stays lit.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Offset of the completion event.
    #[must_use]
    pub const fn complete_at(&self) -> Duration {
        self.complete_at
    }
}

fn double_steps(interval: Duration, count: usize) -> Duration {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    interval.saturating_mul(2).saturating_mul(count)
}
