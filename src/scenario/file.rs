//! JSON map files.
//!
//! A map file is a serialized [`GameState`]: `factions`, `headquarters`,
//! `tiles`, `units` and an optional `turn`. Loading runs the full board
//! validation, so a file that parses is a playable game.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::game::GameState;

/// Failure to read or write a map file.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// Filesystem error.
    #[error("cannot access map file {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid game state.
    #[error("invalid map file {}: {source}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Underlying error, including board validation failures.
        source: serde_json::Error,
    },
}

/// Load and validate a map file.
pub fn load_map(path: &Path) -> Result<GameState, MapFileError> {
    let text = fs::read_to_string(path).map_err(|source| MapFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_map(&text).map_err(|source| MapFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a map from JSON text.
pub fn parse_map(text: &str) -> Result<GameState, serde_json::Error> {
    serde_json::from_str(text)
}

/// Write `state` as a pretty-printed map file.
pub fn save_map(path: &Path, state: &GameState) -> Result<(), MapFileError> {
    let text = serde_json::to_string_pretty(state).map_err(|source| MapFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| MapFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
