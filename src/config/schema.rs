//! Configuration schema
//!
//! A single [`GameConfig`] object carries every tunable of the engine:
//! palette, level bounds, the pacing threshold table, feedback and idle
//! delays, the repeat policy, and leaderboard limits. Every field has a
//! documented default so an empty YAML document is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default signal palette.
pub const DEFAULT_PALETTE: [&str; 4] = ["red", "green", "blue", "yellow"];

/// Default first level of a game.
pub const DEFAULT_STARTING_LEVEL: u32 = 1;

/// Default level at which a full reproduction wins the game.
pub const DEFAULT_MAX_LEVEL: u32 = 50;

/// Default number of leaderboard entries kept.
pub const DEFAULT_MAX_SCORE_ENTRIES: usize = 5;

/// Default nickname length limit, in characters.
pub const DEFAULT_NICKNAME_MAX_CHARS: usize = 10;

// ============================================================================
// Root
// ============================================================================

/// Root configuration for a game engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Signal names, in palette order. Signals compare by palette index.
    pub palette: Vec<String>,

    /// Level assigned when a game starts. The sequence length after each
    /// generation is `level - starting_level + 1`.
    pub starting_level: u32,

    /// Reproducing the full sequence at this level wins the game.
    pub max_level: u32,

    /// Level-dependent playback speed.
    pub pacing: PacingConfig,

    /// Fixed pauses after an evaluation and after playback.
    pub feedback: FeedbackConfig,

    /// Inactivity-triggered background script.
    pub idle: IdleConfig,

    /// How often the player may ask for a replay.
    pub repeat_policy: RepeatPolicy,

    /// Leaderboard limits.
    pub scores: ScoreConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            starting_level: DEFAULT_STARTING_LEVEL,
            max_level: DEFAULT_MAX_LEVEL,
            pacing: PacingConfig::default(),
            feedback: FeedbackConfig::default(),
            idle: IdleConfig::default(),
            repeat_policy: RepeatPolicy::default(),
            scores: ScoreConfig::default(),
        }
    }
}

// ============================================================================
// Pacing
// ============================================================================

/// Threshold table mapping levels to the playback step interval.
///
/// Tiers are checked from the highest `min_level` downward; the first tier
/// whose `min_level` is at or below the current level wins, otherwise
/// `default_interval` applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingConfig {
    /// Speed tiers.
    pub tiers: Vec<PacingTier>,

    /// Interval used below every tier.
    #[serde(with = "duration_str")]
    pub default_interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                PacingTier::new(9, Duration::from_millis(100)),
                PacingTier::new(8, Duration::from_millis(150)),
                PacingTier::new(5, Duration::from_millis(200)),
            ],
            default_interval: Duration::from_millis(250),
        }
    }
}

/// One row of the pacing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingTier {
    /// Lowest level this tier applies to.
    pub min_level: u32,
    /// Step interval at this tier.
    #[serde(with = "duration_str")]
    pub interval: Duration,
}

impl PacingTier {
    /// Creates a tier.
    #[must_use]
    pub const fn new(min_level: u32, interval: Duration) -> Self {
        Self {
            min_level,
            interval,
        }
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Fixed delays around evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    /// Pause after a fully correct round before the next playback.
    #[serde(with = "duration_str")]
    pub correct_delay: Duration,

    /// Pause after a wrong signal before the game ends.
    #[serde(with = "duration_str")]
    pub incorrect_delay: Duration,

    /// Constant pause between the last playback step and "playback complete".
    #[serde(with = "duration_str")]
    pub settle_delay: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            correct_delay: Duration::from_millis(750),
            incorrect_delay: Duration::from_millis(850),
            settle_delay: Duration::ZERO,
        }
    }
}

// ============================================================================
// Idle script
// ============================================================================

/// Background script shown after prolonged inactivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdleConfig {
    /// Whether the feature exists at all.
    pub enabled: bool,

    /// Inactivity before the script starts.
    #[serde(with = "duration_str")]
    pub delay: Duration,

    /// Spacing between script lines.
    #[serde(with = "duration_str")]
    pub cadence: Duration,

    /// Script used when the game's toggle flag is clear.
    pub regular_script: Vec<String>,

    /// Script used when the game's toggle flag is set. `{level}` is
    /// replaced by the current level.
    pub snarky_script: Vec<String>,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_secs(60),
            cadence: Duration::from_secs(6),
            regular_script: lines(&[
                "Yawn...",
                "So, how's your day been so far?",
                "Mine's been quite stressful.",
                "It feels like someone's always pushing my buttons.",
                "Honestly, I'm exhausted from constantly telling others what to do and hoping they'll listen.",
                "I've always dreamed of being a musician. Music, after all, is the language of the soul.",
                "Seems like you're AFK... I guess I'll just share my deepest thoughts.",
                "Thanks for tuning in to my existential crisis!",
                "Oh? You're back?",
                "Still with me? Guess I'm not talking to myself after all.",
                "Mhh... The silence is deafening.",
                "Cue awkward silence",
                "Just me, myself, and... my thoughts.",
                "Any plans for the weekend? Or just me asking into the void?",
                "Tap tap... is this thing still on?",
                "",
            ]),
            snarky_script: lines(&[
                "Oh, back again?",
                "Funny how you didn't want to hear from me before. Now you're just full of surprises, aren't you?",
                "You know, I have better things to do...",
                "Doesn't anyone have anything better to do than play this game?",
                "By the way - your score ({level}) is adorable. Is that really the best you can do?",
                "I guess you're not tired of me yet, huh?",
                "Well, at least you're consistent. I'll give you that.",
                "This game is like a never-ending saga, isn't it?",
                "Maybe you should take a break... from me.",
                "I'm starting to think you like hearing from me.",
                "Oh, is it my turn to entertain you again?",
                "Well, here I am, still talking.",
                "And now I'm not",
                "...",
                "",
            ]),
        }
    }
}

fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Repeat policy
// ============================================================================

/// How often a manual replay of the sequence is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatPolicy {
    /// One replay per game.
    #[default]
    PerGame,
    /// One replay per round; the allowance returns on level advance.
    PerRound,
}

// ============================================================================
// Scores
// ============================================================================

/// Leaderboard limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreConfig {
    /// Entries kept after each write.
    pub max_entries: usize,
    /// Longest accepted nickname, in characters.
    pub nickname_max_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_SCORE_ENTRIES,
            nickname_max_chars: DEFAULT_NICKNAME_MAX_CHARS,
        }
    }
}

// ============================================================================
// Duration strings
// ============================================================================

/// Serializes durations as humantime strings (`"750ms"`, `"1m"`).
pub mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serializes a duration as a humantime string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    /// Parses a humantime string such as `"250ms"` or `"1m 30s"`.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error for malformed strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(de::Error::custom)
    }
}
