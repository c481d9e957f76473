//! Shared integration-test harness: recording port fakes and helpers for
//! driving a `GameEngine` under paused tokio time.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use simon::config::GameConfig;
use simon::engine::{GameEngine, Phase, ScriptedSource, Signal};
use simon::engine::state::GameSummary;
use simon::identity::SessionIdentity;
use simon::ports::{AudioPort, MessageKind, MessagePort, OverlayPort, Ports, RendererPort};
use simon::scores::MemoryStore;

/// One call the engine made on an output port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Highlight(Signal),
    ClearHighlight(Signal),
    Interactive(bool),
    Play(Signal),
    Message(String, MessageKind),
    ClearMessage,
    GameEnd(GameSummary),
    HideOverlay,
}

/// Records every output-port call in order.
#[derive(Debug, Default)]
pub struct Recorder {
    effects: Mutex<Vec<Effect>>,
}

impl Recorder {
    fn push(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.effects.lock().unwrap().len()
    }

    pub fn since(&self, mark: usize) -> Vec<Effect> {
        self.effects.lock().unwrap()[mark..].to_vec()
    }

    pub fn highlights(&self) -> Vec<Signal> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Highlight(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self, kind: MessageKind) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Message(text, k) if k == kind => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, effect: &Effect) -> usize {
        self.effects().iter().filter(|e| *e == effect).count()
    }

    pub fn game_ends(&self) -> Vec<GameSummary> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::GameEnd(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }
}

impl RendererPort for Recorder {
    fn highlight(&self, signal: Signal) {
        self.push(Effect::Highlight(signal));
    }

    fn clear_highlight(&self, signal: Signal) {
        self.push(Effect::ClearHighlight(signal));
    }

    fn set_interactive(&self, interactive: bool) {
        self.push(Effect::Interactive(interactive));
    }
}

impl AudioPort for Recorder {
    fn play(&self, signal: Signal) {
        self.push(Effect::Play(signal));
    }
}

impl MessagePort for Recorder {
    fn show(&self, text: &str, kind: MessageKind) {
        self.push(Effect::Message(text.to_string(), kind));
    }

    fn clear(&self) {
        self.push(Effect::ClearMessage);
    }
}

impl OverlayPort for Recorder {
    fn show_game_end(&self, summary: &GameSummary) {
        self.push(Effect::GameEnd(*summary));
    }

    fn hide(&self) {
        self.push(Effect::HideOverlay);
    }
}

/// An engine wired to recording fakes.
pub struct Harness {
    pub engine: GameEngine,
    pub recorder: Arc<Recorder>,
    pub identity: Arc<SessionIdentity>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    /// Builds an engine with a scripted signal source and nickname "tester".
    pub fn new(config: GameConfig, script: Vec<usize>) -> Self {
        Self::with_identity(config, script, SessionIdentity::with_nickname("tester", 10))
    }

    pub fn with_identity(config: GameConfig, script: Vec<usize>, identity: SessionIdentity) -> Self {
        let recorder = Arc::new(Recorder::default());
        let identity = Arc::new(identity);
        let store = Arc::new(MemoryStore::new());
        let engine = GameEngine::builder(config)
            .ports(Ports::from_shared(recorder.clone(), identity.clone()))
            .persistence(store.clone())
            .source(ScriptedSource::new(script))
            .build()
            .unwrap();
        Self {
            engine,
            recorder,
            identity,
            store,
        }
    }

    /// Waits (in paused time) until the engine reaches `phase`.
    pub async fn until_phase(&self, phase: Phase) {
        for _ in 0..100_000 {
            if self.engine.snapshot().phase() == phase {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "engine never reached {phase}; stuck in {}",
            self.engine.snapshot().phase()
        );
    }

    /// Enters the whole current sequence.
    pub fn reproduce(&self) {
        for signal in self.engine.snapshot().sequence().to_vec() {
            self.engine.submit(signal);
        }
    }
}

/// Default configuration with the idle script switched off.
pub fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.idle.enabled = false;
    config
}

/// Four-signal palette `A..D` with the given level cap.
pub fn abcd_config(max_level: u32) -> GameConfig {
    GameConfig {
        palette: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        max_level,
        ..quiet_config()
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub async fn sleep_ms(n: u64) {
    tokio::time::sleep(ms(n)).await;
}

pub fn s(i: usize) -> Signal {
    Signal::new(i)
}
