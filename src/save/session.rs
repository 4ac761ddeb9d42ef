//! Session state persistence
//!
//! Stores each game's RewardAccrualState as a small JSON file so the CLI can
//! resume a session. The engine itself never touches storage.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rewards::RewardAccrualState;

/// Session file version for compatibility checking
const SESSION_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid game id {0:?}")]
    InvalidGameId(String),

    #[error("Session version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// On-disk session record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    version: u32,
    game_id: String,
    state: RewardAccrualState,
}

/// Directory of per-game session files
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, or `./sessions` when none can be resolved
    pub fn default_location() -> Self {
        use directories::ProjectDirs;

        let dir = match ProjectDirs::from("com", "goalrush", "Goalrush") {
            Some(proj_dirs) => proj_dirs.data_local_dir().join("sessions"),
            None => PathBuf::from("./sessions"),
        };
        Self::new(dir)
    }

    /// Path of a game's session file
    pub fn path_for(&self, game_id: &str) -> Result<PathBuf, SessionStoreError> {
        let valid = !game_id.is_empty()
            && game_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SessionStoreError::InvalidGameId(game_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", game_id)))
    }

    /// Load a stored state; `None` when the game has no session yet
    pub fn load(&self, game_id: &str) -> Result<Option<RewardAccrualState>, SessionStoreError> {
        let path = self.path_for(game_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let record: SessionRecord = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if record.version != SESSION_VERSION {
            return Err(SessionStoreError::VersionMismatch {
                expected: SESSION_VERSION,
                found: record.version,
            });
        }
        log::debug!("Session for {} loaded from {:?}", game_id, path);
        Ok(Some(record.state))
    }

    pub fn save(&self, game_id: &str, state: &RewardAccrualState) -> Result<(), SessionStoreError> {
        let path = self.path_for(game_id)?;
        fs::create_dir_all(&self.dir)?;

        let record = SessionRecord {
            version: SESSION_VERSION,
            game_id: game_id.to_string(),
            state: *state,
        };
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;

        log::info!("Session for {} saved to {:?}", game_id, path);
        Ok(())
    }

    /// Discard a session; returns whether one existed
    pub fn delete(&self, game_id: &str) -> Result<bool, SessionStoreError> {
        let path = self.path_for(game_id)?;
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("Deleted session for {}", game_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
