//! In-memory persistence.

use std::sync::{Mutex, PoisonError};

use crate::error::ScoreError;
use crate::ports::PersistencePort;

use super::record::ScoreRecord;

/// Keeps the leaderboard for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `records`, stored as given.
    #[must_use]
    pub const fn with_records(records: Vec<ScoreRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Returns a copy of what is currently stored.
    #[must_use]
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PersistencePort for MemoryStore {
    fn load_scores(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
        Ok(self.records())
    }

    fn save_scores(&self, records: &[ScoreRecord]) -> Result<(), ScoreError> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        Ok(())
    }
}
