//! Starting positions.
//!
//! Three sources of initial [`GameState`]s:
//! - the hand-drawn Harford County battlefield,
//! - seeded random battlefields,
//! - JSON map files.

mod file;
mod harford;
mod mapgen;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::error::BoardError;
use crate::game::GameState;

pub use file::{MapFileError, load_map, parse_map, save_map};
pub use harford::{BAY_BIRDS, BLUE_CRABS, harford_county};
pub use mapgen::{MIN_EDGE, MapGenConfig, MapGenError, generate_map};

/// Starting hit points of a standard unit.
pub const DEFAULT_UNIT_HP: i32 = 10;

/// Attack power of a standard unit.
pub const DEFAULT_UNIT_ATTACK: i32 = 5;

/// Failure to build a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The built-in map failed validation.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// Map generation failed.
    #[error(transparent)]
    MapGen(#[from] MapGenError),
    /// A map file could not be loaded.
    #[error(transparent)]
    File(#[from] MapFileError),
}

/// Where the initial state comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// The Harford County battlefield.
    Harford,
    /// A battlefield generated from the game seed.
    Generated,
    /// A JSON map file.
    File(PathBuf),
}

impl Scenario {
    /// Build the initial state. `seed` and `config` only matter for
    /// [`Scenario::Generated`].
    pub fn build(&self, seed: u64, config: &MapGenConfig) -> Result<GameState, ScenarioError> {
        Ok(match self {
            Scenario::Harford => harford_county()?,
            Scenario::Generated => generate_map(seed, config)?,
            Scenario::File(path) => load_map(path)?,
        })
    }
}

impl FromStr for Scenario {
    type Err = String;

    /// `harford`, `generated`, or a path to a map file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("empty map name".to_string()),
            "harford" => Ok(Scenario::Harford),
            "generated" | "random" => Ok(Scenario::Generated),
            path => Ok(Scenario::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Harford => f.write_str("harford"),
            Scenario::Generated => f.write_str("generated"),
            Scenario::File(path) => write!(f, "{}", path.display()),
        }
    }
}
