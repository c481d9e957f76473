//! Metrics collection for `simon`.
//!
//! Prometheus-compatible counters and gauges with typed convenience
//! functions. The `metrics` macros no-op until a recorder is installed,
//! so the engine records unconditionally.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SimonError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Highest level reported so far, backing `simon_highest_level`.
static HIGHEST_LEVEL: AtomicU32 = AtomicU32::new(0);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `SimonError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SimonError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SimonError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("simon_games_started_total", "Total number of games started");
    describe_counter!(
        "simon_rounds_completed_total",
        "Total number of rounds fully reproduced"
    );
    describe_counter!(
        "simon_games_ended_total",
        "Total number of finished games by outcome"
    );
    describe_counter!("simon_repeats_total", "Total number of granted replays");
    describe_counter!(
        "simon_idle_scripts_total",
        "Total number of idle scripts started"
    );
    describe_gauge!("simon_highest_level", "Highest level reached this process");
}

/// Label value for a game outcome.
#[must_use]
pub const fn outcome_label(won: bool) -> &'static str {
    if won { "won" } else { "lost" }
}

/// Records a game start.
pub fn record_game_started() {
    counter!("simon_games_started_total").increment(1);
}

/// Records a fully reproduced round.
pub fn record_round_completed() {
    counter!("simon_rounds_completed_total").increment(1);
}

/// Records a finished game and raises the highest-level gauge.
pub fn record_game_ended(won: bool, level: u32) {
    counter!("simon_games_ended_total", "outcome" => outcome_label(won)).increment(1);
    let highest = HIGHEST_LEVEL.fetch_max(level, Ordering::Relaxed).max(level);
    gauge!("simon_highest_level").set(f64::from(highest));
}

/// Records a granted replay.
pub fn record_repeat() {
    counter!("simon_repeats_total").increment(1);
}

/// Records the idle script starting.
pub fn record_idle_script() {
    counter!("simon_idle_scripts_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome_label(true), "won");
        assert_eq!(outcome_label(false), "lost");
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_game_started();
        record_round_completed();
        record_game_ended(false, 7);
        record_repeat();
        record_idle_script();
    }
}
