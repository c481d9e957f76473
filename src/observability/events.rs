//! Structured game event stream.
//!
//! Discrete, typed events emitted as the engine moves through a game.
//! Events are serialized as newline-delimited JSON (JSONL) and carry a
//! monotonically increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a game.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A new game has started.
    GameStarted {
        /// When the game started.
        timestamp: DateTime<Utc>,
        /// Player nickname.
        nickname: String,
        /// Level the game starts at.
        level: u32,
    },

    /// A round's playback has been scheduled.
    RoundStarted {
        /// When playback was scheduled.
        timestamp: DateTime<Utc>,
        /// Level of the round.
        level: u32,
        /// Length of the sequence being played.
        sequence_len: usize,
        /// Step interval in milliseconds.
        interval_ms: u64,
    },

    /// The player asked for a replay and it was granted.
    RepeatRequested {
        /// When the replay was granted.
        timestamp: DateTime<Utc>,
        /// Level at which the replay was used.
        level: u32,
    },

    /// The game reached its terminal phase.
    GameEnded {
        /// When the game ended.
        timestamp: DateTime<Utc>,
        /// Whether the player won.
        won: bool,
        /// Final level.
        level: u32,
        /// Whether the idle script fired during the game.
        idle_script_triggered: bool,
    },

    /// A score was written to the leaderboard.
    ScoreRecorded {
        /// When the score was written.
        timestamp: DateTime<Utc>,
        /// Nickname the score was recorded under.
        nickname: String,
        /// Recorded level.
        level: u32,
        /// 1-based leaderboard position, if the score made the cut.
        rank: Option<usize>,
    },

    /// The idle background script started.
    IdleScriptStarted {
        /// When the script started.
        timestamp: DateTime<Utc>,
        /// Level at which the player went idle.
        level: u32,
        /// Whether the snarky script was selected.
        snarky: bool,
    },

    /// The game was reset to a fresh state.
    GameReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Phase the game was in before the reset.
        from_phase: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps a [`GameEvent`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: GameEvent,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are dropped; a broken
/// event sink never interrupts a game.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: GameEvent) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> GameEvent {
        GameEvent::GameStarted {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            nickname: "ada".to_owned(),
            level: 1,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "GameStarted");
        assert_eq!(parsed["nickname"], "ada");
    }

    #[test]
    fn emitter_writes_valid_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());

        let output = tw.contents();
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["type"], "GameStarted");
        assert_eq!(parsed["level"], 1);
        assert_eq!(parsed["sequence"], 0);
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(GameEvent::GameReset {
            timestamp: Utc::now(),
            from_phase: "game_over".to_owned(),
        });

        assert_eq!(emitter.event_count(), 2);

        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["from_phase"], "game_over");
    }

    #[test]
    fn all_event_variants_serialize_to_valid_json() {
        let now = Utc::now();
        let variants: Vec<GameEvent> = vec![
            sample_event(),
            GameEvent::RoundStarted {
                timestamp: now,
                level: 3,
                sequence_len: 3,
                interval_ms: 250,
            },
            GameEvent::RepeatRequested {
                timestamp: now,
                level: 2,
            },
            GameEvent::GameEnded {
                timestamp: now,
                won: false,
                level: 4,
                idle_script_triggered: true,
            },
            GameEvent::ScoreRecorded {
                timestamp: now,
                nickname: "ada".to_owned(),
                level: 4,
                rank: Some(1),
            },
            GameEvent::IdleScriptStarted {
                timestamp: now,
                level: 2,
                snarky: false,
            },
            GameEvent::GameReset {
                timestamp: now,
                from_phase: "feedback".to_owned(),
            },
        ];

        for variant in &variants {
            let json = serde_json::to_string(variant).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert!(parsed.get("type").is_some(), "missing type tag: {json}");
        }
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "GameStarted");
        assert_eq!(parsed["nickname"], "ada");
        assert!(parsed.get("event").is_none());
    }
}
