//! Session identity
//!
//! Nicknames are trimmed and capped at a configured number of characters;
//! a blank nickname counts as no nickname at all.

use std::sync::Mutex;
use std::sync::PoisonError;

use crate::config::DEFAULT_NICKNAME_MAX_CHARS;
use crate::ports::IdentityPort;

/// Normalises a raw nickname: trims surrounding whitespace and truncates
/// to `max_chars` characters. Returns `None` when nothing remains.
#[must_use]
pub fn normalize_nickname(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || max_chars == 0 {
        return None;
    }
    let capped: String = trimmed.chars().take(max_chars).collect();
    Some(capped.trim_end().to_string())
}

/// In-memory nickname holder for one process.
#[derive(Debug)]
pub struct SessionIdentity {
    nickname: Mutex<Option<String>>,
    max_chars: usize,
}

impl SessionIdentity {
    /// Creates an identity with no nickname.
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self {
            nickname: Mutex::new(None),
            max_chars,
        }
    }

    /// Creates an identity pre-populated from `raw`, if it normalises.
    #[must_use]
    pub fn with_nickname(raw: &str, max_chars: usize) -> Self {
        Self {
            nickname: Mutex::new(normalize_nickname(raw, max_chars)),
            max_chars,
        }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_NICKNAME_MAX_CHARS)
    }
}

impl IdentityPort for SessionIdentity {
    fn nickname(&self) -> Option<String> {
        self.nickname
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_nickname(&self, raw: &str) -> Option<String> {
        let normalized = normalize_nickname(raw, self.max_chars)?;
        *self.nickname.lock().unwrap_or_else(PoisonError::into_inner) = Some(normalized.clone());
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_truncates() {
        assert_eq!(normalize_nickname("  ada  ", 10), Some("ada".into()));
        assert_eq!(
            normalize_nickname("abcdefghijklmnop", 10),
            Some("abcdefghij".into())
        );
        assert_eq!(normalize_nickname("   ", 10), None);
        assert_eq!(normalize_nickname("", 10), None);
    }

    #[test]
    fn test_normalize_counts_characters_not_bytes() {
        assert_eq!(normalize_nickname("ééééé", 3), Some("ééé".into()));
    }

    #[test]
    fn test_truncation_drops_trailing_space() {
        assert_eq!(normalize_nickname("ada lovelace", 4), Some("ada".into()));
    }

    #[test]
    fn test_rejected_nickname_keeps_previous() {
        let identity = SessionIdentity::default();
        assert_eq!(identity.nickname(), None);
        assert_eq!(identity.set_nickname("grace"), Some("grace".into()));
        assert_eq!(identity.set_nickname("  "), None);
        assert_eq!(identity.nickname(), Some("grace".into()));
    }

    #[test]
    fn test_with_nickname() {
        let identity = SessionIdentity::with_nickname(" linus ", 10);
        assert_eq!(identity.nickname(), Some("linus".into()));
        assert_eq!(SessionIdentity::with_nickname("", 10).nickname(), None);
    }
}
