//! Score store
//!
//! A bounded, sorted leaderboard over a [`PersistencePort`]. Storage
//! failures never reach the player: they are logged and the store
//! degrades to an empty or unchanged leaderboard.

pub mod file;
pub mod memory;
pub mod record;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ScoreConfig;
use crate::ports::PersistencePort;

pub use file::{DEFAULT_SCORES_FILE, JsonFileStore};
pub use memory::MemoryStore;
pub use record::ScoreRecord;

/// Leaderboard logic over a persistence backend.
#[derive(Clone)]
pub struct ScoreStore {
    persistence: Arc<dyn PersistencePort>,
    limits: ScoreConfig,
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl ScoreStore {
    /// Creates a store with the given limits.
    #[must_use]
    pub fn new(persistence: Arc<dyn PersistencePort>, limits: ScoreConfig) -> Self {
        Self {
            persistence,
            limits,
        }
    }

    /// Store backed by a fresh [`MemoryStore`].
    #[cfg(test)]
    #[must_use]
    pub fn in_memory(limits: ScoreConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), limits)
    }

    /// Limits applied on every read and write.
    #[must_use]
    pub const fn limits(&self) -> ScoreConfig {
        self.limits
    }

    /// Drops invalid records, sorts, and truncates to `max_entries`.
    #[must_use]
    pub fn normalize(&self, mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
        let before = records.len();
        records.retain(|r| r.is_valid(self.limits.nickname_max_chars));
        if records.len() < before {
            debug!(dropped = before - records.len(), "dropped invalid score records");
        }
        records.sort_by(ScoreRecord::leaderboard_cmp);
        records.truncate(self.limits.max_entries);
        records
    }

    /// Current leaderboard. Empty when storage is absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Vec<ScoreRecord> {
        match self.persistence.load_scores() {
            Ok(records) => self.normalize(records),
            Err(e) => {
                warn!(error = %e, "failed to load scores; using an empty leaderboard");
                Vec::new()
            }
        }
    }

    /// Adds `entry`, persists the trimmed leaderboard, and returns it.
    ///
    /// If the write fails the previous leaderboard is returned unchanged.
    pub fn record(&self, entry: ScoreRecord) -> Vec<ScoreRecord> {
        let previous = self.load();
        let mut next = previous.clone();
        next.push(entry);
        let next = self.normalize(next);

        if let Err(e) = self.persistence.save_scores(&next) {
            warn!(error = %e, "failed to save scores; leaderboard unchanged");
            return previous;
        }
        next
    }

    /// 1-based position a game ending at `level` now would take, or
    /// `None` if it would not make the leaderboard.
    #[must_use]
    pub fn rank_of(&self, level: u32) -> Option<usize> {
        let ahead = self.load().iter().filter(|r| r.level > level).count();
        (ahead < self.limits.max_entries).then_some(ahead + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    struct Broken;

    impl PersistencePort for Broken {
        fn load_scores(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
            Err(ScoreError::Corrupt("broken".into()))
        }

        fn save_scores(&self, _records: &[ScoreRecord]) -> Result<(), ScoreError> {
            Err(ScoreError::Io(std::io::Error::other("read-only")))
        }
    }

    fn limits(max_entries: usize) -> ScoreConfig {
        ScoreConfig {
            max_entries,
            nickname_max_chars: 10,
        }
    }

    #[test]
    fn test_record_sorts_and_truncates() {
        let store = ScoreStore::in_memory(limits(3));
        for level in [2, 9, 4, 7, 1] {
            store.record(ScoreRecord::now(level, "p"));
        }
        let levels: Vec<u32> = store.load().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![9, 7, 4]);
    }

    #[test]
    fn test_ties_prefer_most_recent() {
        let store = ScoreStore::in_memory(limits(5));
        let now = Utc::now();
        store.record(ScoreRecord {
            level: 5,
            nickname: "old".into(),
            timestamp: now - Duration::hours(1),
        });
        store.record(ScoreRecord {
            level: 5,
            nickname: "new".into(),
            timestamp: now,
        });
        assert_eq!(store.load()[0].nickname, "new");
    }

    #[test]
    fn test_invalid_records_dropped() {
        let memory = Arc::new(MemoryStore::with_records(vec![
            ScoreRecord::now(3, ""),
            ScoreRecord::now(4, "waytoolongname"),
            ScoreRecord::now(2, "ok"),
        ]));
        let store = ScoreStore::new(memory, limits(5));
        let board = store.load();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].nickname, "ok");
    }

    #[test]
    fn test_broken_storage_degrades() {
        let store = ScoreStore::new(Arc::new(Broken), limits(5));
        assert!(store.load().is_empty());
        assert!(store.record(ScoreRecord::now(3, "ada")).is_empty());
        assert_eq!(store.rank_of(3), Some(1));
    }

    #[test]
    fn test_rank_of() {
        let store = ScoreStore::in_memory(limits(2));
        assert_eq!(store.rank_of(1), Some(1));
        store.record(ScoreRecord::now(5, "a"));
        store.record(ScoreRecord::now(3, "b"));
        assert_eq!(store.rank_of(6), Some(1));
        assert_eq!(store.rank_of(5), Some(1));
        assert_eq!(store.rank_of(4), Some(2));
        assert_eq!(store.rank_of(3), Some(2));
        assert_eq!(store.rank_of(2), None);
    }

    proptest! {
        #[test]
        fn prop_leaderboard_bounded_and_sorted(
            levels in prop::collection::vec(0u32..100, 0..30),
            max_entries in 1usize..8,
        ) {
            let store = ScoreStore::in_memory(limits(max_entries));
            for level in &levels {
                store.record(ScoreRecord::now(*level, "p"));
            }
            let board = store.load();
            prop_assert!(board.len() <= max_entries);
            prop_assert_eq!(board.len(), levels.len().min(max_entries));
            for pair in board.windows(2) {
                prop_assert!(pair[0].level >= pair[1].level);
            }
            let mut sorted = levels.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            let top: Vec<u32> = board.iter().map(|r| r.level).collect();
            prop_assert_eq!(top, sorted.into_iter().take(max_entries).collect::<Vec<_>>());
        }
    }
}
