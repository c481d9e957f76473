//! Leaderboard records.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished game on the leaderboard.
///
/// Persisted as `{ "level": int, "nickname": string, "timestamp": ISO-8601 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Level reached.
    pub level: u32,
    /// Player nickname.
    pub nickname: String,
    /// When the game ended.
    pub timestamp: DateTime<Utc>,
}

impl ScoreRecord {
    /// Creates a record stamped now.
    #[must_use]
    pub fn now(level: u32, nickname: impl Into<String>) -> Self {
        Self {
            level,
            nickname: nickname.into(),
            timestamp: Utc::now(),
        }
    }

    /// Parses one persisted entry, returning `None` for anything
    /// malformed: missing or mistyped fields, a negative level, or an
    /// unparseable timestamp.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether the record fits the leaderboard's nickname limit.
    #[must_use]
    pub fn is_valid(&self, nickname_max_chars: usize) -> bool {
        let len = self.nickname.chars().count();
        !self.nickname.trim().is_empty() && len <= nickname_max_chars
    }

    /// Leaderboard order: higher level first, then the more recent game.
    #[must_use]
    pub fn leaderboard_cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .cmp(&self.level)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_from_value_accepts_well_formed() {
        let value = json!({"level": 7, "nickname": "ada", "timestamp": "2024-05-01T12:00:00Z"});
        let record = ScoreRecord::from_value(&value).unwrap();
        assert_eq!(record.level, 7);
        assert_eq!(record.nickname, "ada");
        assert_eq!(record.timestamp, at("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_from_value_rejects_malformed() {
        let bad = [
            json!({"level": -1, "nickname": "ada", "timestamp": "2024-05-01T12:00:00Z"}),
            json!({"level": "7", "nickname": "ada", "timestamp": "2024-05-01T12:00:00Z"}),
            json!({"nickname": "ada", "timestamp": "2024-05-01T12:00:00Z"}),
            json!({"level": 3, "nickname": 5, "timestamp": "2024-05-01T12:00:00Z"}),
            json!({"level": 3, "nickname": "ada", "timestamp": "yesterday"}),
            json!("ada"),
            json!(null),
        ];
        for value in &bad {
            assert!(ScoreRecord::from_value(value).is_none(), "accepted {value}");
        }
    }

    #[test]
    fn test_is_valid_nickname_bounds() {
        let mut record = ScoreRecord::now(3, "abcdefghij");
        assert!(record.is_valid(10));
        record.nickname.push('k');
        assert!(!record.is_valid(10));
        record.nickname = "  ".into();
        assert!(!record.is_valid(10));
    }

    #[test]
    fn test_leaderboard_order() {
        let older = ScoreRecord {
            level: 5,
            nickname: "a".into(),
            timestamp: at("2024-01-01T00:00:00Z"),
        };
        let newer = ScoreRecord {
            level: 5,
            nickname: "b".into(),
            timestamp: at("2024-06-01T00:00:00Z"),
        };
        let higher = ScoreRecord {
            level: 9,
            nickname: "c".into(),
            timestamp: at("2023-01-01T00:00:00Z"),
        };
        let mut records = vec![older.clone(), higher.clone(), newer.clone()];
        records.sort_by(ScoreRecord::leaderboard_cmp);
        assert_eq!(records, vec![higher, newer, older]);
    }
}
