//! Board and config persistence over a key-value [`Storage`].
//!
//! The board is saved synchronously after every committed mutation. Zoom
//! bursts go through a [`Debouncer`] so only the last step of a burst is
//! written.

use crate::camera::Camera;
use crate::config::Config;
use crate::debounce::{Debouncer, ZOOM_SAVE_DELAY};
use crate::legacy::strip_assignment;
use crate::literal::{self, LiteralError};
use crate::storage::{Storage, StorageError, StorageResult};
use crate::store::Board;
use crate::Instant;
use std::sync::Arc;
use thiserror::Error;

/// Storage key for the board.
pub const BOARD_KEY: &str = "canvas-hub-autosave";
/// Storage key for user configuration.
pub const CONFIG_KEY: &str = "canvas-hub-config";
/// Assignment that wraps an exported board.
pub const ARTIFACT_PREFIX: &str = "window.RDT_DATA = ";

/// Errors reading an exported data file.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Data file is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Data file is not a valid literal: {0}")]
    Syntax(#[from] LiteralError),
    #[error("Data file does not describe a board: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Saves and restores the board and config.
pub struct Persistence<S: Storage> {
    storage: Arc<S>,
    zoom_save: Debouncer,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            zoom_save: Debouncer::new(ZOOM_SAVE_DELAY),
        }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Write the board immediately. A pending debounced save is superseded.
    pub fn save(&mut self, board: &Board) -> StorageResult<()> {
        let json = board
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(BOARD_KEY, json.as_bytes())?;
        self.zoom_save.cancel();
        log::debug!("Saved board with {} envelopes", board.len());
        Ok(())
    }

    /// Restore the saved board. Missing or unreadable data yields `None`.
    pub fn load(&self) -> Option<Board> {
        let bytes = match self.storage.get(BOARD_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read saved board: {}", e);
                return None;
            }
        };
        match serde_json::from_slice::<Board>(&bytes) {
            Ok(board) => {
                log::info!("Loaded board with {} envelopes", board.len());
                Some(board)
            }
            Err(e) => {
                log::warn!("Discarding unreadable saved board: {}", e);
                None
            }
        }
    }

    /// Restore the saved board or start from the welcome board.
    pub fn load_or_default(&self, viewport_width: f64) -> Board {
        self.load().unwrap_or_else(|| Board::with_welcome(viewport_width))
    }

    /// Request a save that is written once no further request arrives for a while.
    pub fn schedule_save(&mut self, now: Instant) {
        self.zoom_save.trigger(now);
    }

    /// Whether a debounced save is waiting.
    pub fn save_pending(&self) -> bool {
        self.zoom_save.is_pending()
    }

    /// Write the board if a debounced save has come due. Returns whether it wrote.
    pub fn poll(&mut self, now: Instant, board: &Board) -> StorageResult<bool> {
        if !self.zoom_save.fire_due(now) {
            return Ok(false);
        }
        self.save(board)?;
        Ok(true)
    }

    /// Read the config, filling missing or unreadable values with defaults.
    pub fn read_config(&self) -> Config {
        match self.storage.get(CONFIG_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable config: {}", e);
                Config::default()
            }),
            Ok(None) => Config::default(),
            Err(e) => {
                log::warn!("Failed to read config: {}", e);
                Config::default()
            }
        }
    }

    pub fn write_config(&self, config: &Config) -> StorageResult<()> {
        let json = serde_json::to_vec(config).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(CONFIG_KEY, &json)
    }

    /// Delete the saved board so the next start is fresh.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(BOARD_KEY)
    }
}

/// Serialize the board as a standalone data script.
pub fn export_artifact(board: &Board) -> Result<Vec<u8>, serde_json::Error> {
    let json = board.to_json_pretty()?;
    Ok(format!("{ARTIFACT_PREFIX}{json};").into_bytes())
}

/// Read a board back from a data script produced by [`export_artifact`].
///
/// Plain JSON without the assignment is accepted as well. A file without a
/// camera keeps `camera`.
pub fn load_artifact(bytes: &[u8], camera: Camera) -> Result<Board, ArtifactError> {
    let text = std::str::from_utf8(bytes)?;
    let value = literal::parse(strip_assignment(text))?;
    let has_camera = value.get("cam").is_some();
    let mut board: Board = serde_json::from_value(value)?;
    if !has_camera {
        board.camera = camera;
    }
    Ok(board)
}
