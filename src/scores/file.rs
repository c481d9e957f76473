//! JSON-file persistence.
//!
//! The leaderboard is one JSON array. Writes go to a sibling temporary
//! file which is then renamed over the target, so a crash mid-write
//! leaves the previous leaderboard intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScoreError;
use crate::ports::PersistencePort;

use super::record::ScoreRecord;

/// Default score file name.
pub const DEFAULT_SCORES_FILE: &str = "simon-scores.json";

/// Leaderboard stored as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistencePort for JsonFileStore {
    /// Loads the array, keeping entries as raw records; malformed
    /// entries are dropped. A missing file is an empty leaderboard.
    fn load_scores(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "score file absent");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| ScoreError::Corrupt(e.to_string()))?;
        let serde_json::Value::Array(entries) = value else {
            return Err(ScoreError::Corrupt("expected a JSON array".to_string()));
        };

        let total = entries.len();
        let records: Vec<ScoreRecord> = entries.iter().filter_map(ScoreRecord::from_value).collect();
        if records.len() < total {
            debug!(
                dropped = total - records.len(),
                "dropped malformed score entries"
            );
        }
        Ok(records)
    }

    fn save_scores(&self, records: &[ScoreRecord]) -> Result<(), ScoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(records)?;
        let temp = self.temp_path();
        {
            let mut file = std::fs::File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
