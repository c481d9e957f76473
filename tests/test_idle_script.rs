//! Idle background script: arming, firing, interruption and selection.

mod common;

use common::{Harness, ms, quiet_config, s, sleep_ms};
use simon::config::{GameConfig, IdleConfig};
use simon::engine::Phase;
use simon::ports::MessageKind;

fn idle_config() -> GameConfig {
    GameConfig {
        idle: IdleConfig {
            enabled: true,
            delay: ms(1_000),
            cadence: ms(1_000),
            regular_script: vec!["one".into(), "two".into()],
            snarky_script: vec!["still at {level}?".into(), "bye".into()],
        },
        ..quiet_config()
    }
}

#[tokio::test(start_paused = true)]
async fn test_script_fires_after_inactivity() {
    let h = Harness::new(idle_config(), vec![0]);
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;
    assert!(h.engine.snapshot().easter_egg().armed);

    sleep_ms(1_200).await;
    let egg = h.engine.snapshot().easter_egg();
    assert!(egg.triggered);
    assert!(egg.active);
    assert!(!egg.armed);
    assert!(h.recorder.messages(MessageKind::Idle).is_empty());

    sleep_ms(1_000).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one"]);

    sleep_ms(1_000).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one", "two"]);
    assert!(!h.engine.snapshot().easter_egg().active);

    let summary = h.engine.force_game_over().unwrap();
    assert!(summary.idle_script_triggered);
}

#[tokio::test(start_paused = true)]
async fn test_interaction_silences_running_script() {
    let h = Harness::new(idle_config(), vec![0]);
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;
    sleep_ms(2_200).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one"]);

    h.reproduce();
    let egg = h.engine.snapshot().easter_egg();
    assert!(egg.triggered);
    assert!(!egg.active);

    // Never re-armed in the same game.
    h.until_phase(Phase::AwaitingInput).await;
    assert!(!h.engine.snapshot().easter_egg().armed);
    sleep_ms(10_000).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one"]);

    h.engine.submit(s(3));
    h.until_phase(Phase::GameOver).await;
    assert!(h.engine.snapshot().outcome().unwrap().idle_script_triggered);
}

#[tokio::test(start_paused = true)]
async fn test_interaction_before_delay_disarms() {
    let h = Harness::new(idle_config(), vec![0]);
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;
    sleep_ms(500).await;

    // Rejected operations still count as activity.
    h.engine.start();
    assert!(!h.engine.snapshot().easter_egg().armed);

    sleep_ms(5_000).await;
    assert!(h.recorder.messages(MessageKind::Idle).is_empty());
    assert!(!h.engine.snapshot().easter_egg().triggered);

    // The next round arms again.
    h.reproduce();
    h.until_phase(Phase::AwaitingInput).await;
    assert!(h.engine.snapshot().easter_egg().armed);
    sleep_ms(2_500).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one"]);
}

#[tokio::test(start_paused = true)]
async fn test_snarky_script_after_reset_substitutes_level() {
    let config = GameConfig {
        starting_level: 3,
        ..idle_config()
    };
    let h = Harness::new(config, vec![0]);
    h.engine.start();
    h.engine.reset();
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;

    sleep_ms(2_200).await;
    assert_eq!(
        h.recorder.messages(MessageKind::Idle),
        vec!["still at 3?"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_running_script() {
    let h = Harness::new(idle_config(), vec![0]);
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;
    sleep_ms(2_200).await;

    h.engine.reset();
    sleep_ms(5_000).await;
    assert_eq!(h.recorder.messages(MessageKind::Idle), vec!["one"]);
    assert!(!h.engine.snapshot().easter_egg().triggered);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_script_never_arms() {
    let h = Harness::new(quiet_config(), vec![0]);
    h.engine.start();
    h.until_phase(Phase::AwaitingInput).await;
    assert!(!h.engine.snapshot().easter_egg().armed);

    sleep_ms(120_000).await;
    assert!(h.recorder.messages(MessageKind::Idle).is_empty());
    assert!(!h.engine.snapshot().easter_egg().triggered);
}
