//! Game recording and replay.
//!
//! Oracles are not deterministic (an LLM never answers the same way twice),
//! so a recording stores what actually happened: the initial state and, per
//! turn, the validated orders, the resolution events and a snapshot of every
//! unit. Replaying never re-runs the engine.
//!
//! # Time Travel
//!
//! - **Forward / backward**: swap in the neighbouring snapshot
//! - **Jump to turn N**: swap in snapshot N (turn 0 is the initial state)

mod render;
mod text;

pub use render::{render_ascii, render_fogged};
pub use text::{describe_event, render_events, render_text, render_unit_table};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::game::invariants::check_invariants;
use crate::game::{FactionId, GameState};
use crate::referee::{GameResult, TurnObserver, TurnReport};

/// Current recording format version.
pub const FORMAT_VERSION: u32 = 1;

/// A complete game, as played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Format version.
    pub version: u32,
    /// Seed the game was configured with.
    pub seed: u64,
    /// Turn cap in effect.
    pub max_turns: u32,
    /// Oracle display name per faction.
    pub oracles: BTreeMap<FactionId, String>,
    /// State before turn 1.
    pub initial: GameState,
    /// One report per resolved turn.
    pub turns: Vec<TurnReport>,
    /// Final result, absent if the game was aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
}

impl Recording {
    /// Start an empty recording of a game beginning at `initial`.
    #[must_use]
    pub fn new(
        initial: GameState,
        seed: u64,
        max_turns: u32,
        oracles: BTreeMap<FactionId, String>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            seed,
            max_turns,
            oracles,
            initial,
            turns: Vec::new(),
            result: None,
        }
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Last reachable turn number.
    #[must_use]
    pub fn last_turn(&self) -> u32 {
        u32::try_from(self.turns.len()).unwrap_or(u32::MAX)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ReplayError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), turns = self.turns.len(), "recording saved");
        Ok(())
    }

    /// Load a recording saved by [`Recording::save`].
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let recording: Self =
            serde_json::from_str(&text).map_err(|source| ReplayError::Format {
                path: path.to_path_buf(),
                source,
            })?;
        if recording.version != FORMAT_VERSION {
            return Err(ReplayError::Version {
                found: recording.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(recording)
    }
}

/// Observer that builds a [`Recording`] while a game runs.
#[derive(Debug, Clone)]
pub struct Recorder {
    recording: Recording,
}

impl Recorder {
    /// Start recording a game.
    #[must_use]
    pub fn new(recording: Recording) -> Self {
        Self { recording }
    }

    /// The recording so far.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Finish and take the recording.
    #[must_use]
    pub fn into_recording(self) -> Recording {
        self.recording
    }
}

impl TurnObserver for Recorder {
    fn on_turn(&mut self, _state: &GameState, report: &TurnReport) {
        self.recording.turns.push(report.clone());
    }

    fn on_game_end(&mut self, _state: &GameState, result: &GameResult) {
        self.recording.result = Some(result.clone());
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Filesystem error.
    #[error("cannot access recording {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid recording.
    #[error("invalid recording {}: {source}", path.display())]
    Format {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The recording was written by an incompatible version.
    #[error("unsupported recording version {found} (expected {expected})")]
    Version {
        /// Version in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
    /// Turn number out of bounds.
    #[error("turn {requested} out of bounds (last recorded turn: {max_turn})")]
    TurnOutOfBounds {
        /// Requested turn.
        requested: u32,
        /// Last reachable turn.
        max_turn: u32,
    },
    /// A snapshot violates the board rules.
    #[error("snapshot for turn {turn} is inconsistent: {reason}")]
    Corrupt {
        /// Offending turn.
        turn: u32,
        /// First violation found.
        reason: String,
    },
}

/// Steps through a [`Recording`].
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    recording: Recording,
    state: GameState,
    current_turn: u32,
}

impl ReplayEngine {
    /// Create a replay engine at turn 0.
    pub fn new(recording: Recording) -> Result<Self, ReplayError> {
        Self::new_at_turn(recording, 0)
    }

    /// Create a replay engine positioned at `target_turn`.
    pub fn new_at_turn(recording: Recording, target_turn: u32) -> Result<Self, ReplayError> {
        let state = recording.initial.clone();
        let mut engine = Self {
            recording,
            state,
            current_turn: 0,
        };
        engine.goto_turn(target_turn)?;
        Ok(engine)
    }

    /// The recording being replayed.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Current turn number; 0 is the initial position.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.current_turn
    }

    /// State after the current turn.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Report of the current turn; `None` at turn 0.
    #[must_use]
    pub fn report(&self) -> Option<&TurnReport> {
        let idx = usize::try_from(self.current_turn).ok()?.checked_sub(1)?;
        self.recording.turns.get(idx)
    }

    /// Whether the current turn is the last one recorded.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.current_turn >= self.recording.last_turn()
    }

    /// Step forward one turn.
    pub fn step_forward(&mut self) -> Result<(), ReplayError> {
        self.goto_turn(self.current_turn.saturating_add(1))
    }

    /// Step backward one turn.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        let Some(target) = self.current_turn.checked_sub(1) else {
            return Err(ReplayError::TurnOutOfBounds {
                requested: 0,
                max_turn: self.recording.last_turn(),
            });
        };
        self.goto_turn(target)
    }

    /// Jump to a specific turn.
    pub fn goto_turn(&mut self, target_turn: u32) -> Result<(), ReplayError> {
        let max_turn = self.recording.last_turn();
        if target_turn > max_turn {
            return Err(ReplayError::TurnOutOfBounds {
                requested: target_turn,
                max_turn,
            });
        }

        let state = match target_turn.checked_sub(1) {
            None => self.recording.initial.clone(),
            Some(idx) => {
                let report = usize::try_from(idx)
                    .ok()
                    .and_then(|i| self.recording.turns.get(i))
                    .ok_or(ReplayError::TurnOutOfBounds {
                        requested: target_turn,
                        max_turn,
                    })?;
                self.recording.initial.with_snapshot(&report.units, target_turn)
            }
        };

        if let Some(violation) = check_invariants(&state).into_iter().next() {
            return Err(ReplayError::Corrupt {
                turn: target_turn,
                reason: violation.to_string(),
            });
        }

        self.state = state;
        self.current_turn = target_turn;
        Ok(())
    }

    /// Render the current position for a terminal.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        render_ascii(&self.state, self.recording.max_turns)
    }

    /// Render the current position as `faction` saw it.
    #[must_use]
    pub fn render_fogged(&self, faction: &FactionId, radius: u16) -> String {
        render_fogged(&self.state, faction, radius)
    }

    /// Render the current position as structured text.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = render_text(&self.state, self.recording.max_turns);
        if let Some(report) = self.report() {
            out.push('\n');
            out.push_str(&render_events(report));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::oracle::{Oracle, PassOracle, ScriptedOracle};
    use crate::referee::{Referee, RefereeConfig};
    use crate::scenario::harford_county;

    fn recorded_game() -> Recording {
        let state = harford_county().unwrap();
        let mover = ScriptedOracle::new(
            "BlueCrabs".into(),
            vec![
                Ok(json!({"BC-1": {"action": "move", "direction": "W"}})),
                Ok(json!({"BC-1": {"action": "move", "direction": "N"}})),
            ],
        );
        let agents: Vec<Box<dyn Oracle>> =
            vec![Box::new(mover), Box::new(PassOracle::new("BayBirds".into()))];
        let config = RefereeConfig {
            max_turns: 3,
            ..RefereeConfig::default()
        };
        let oracles = agents
            .iter()
            .map(|a| (a.faction().clone(), a.name().to_string()))
            .collect();
        let mut recorder = Recorder::new(Recording::new(state.clone(), 0, 3, oracles));
        let mut referee = Referee::new(state, agents, config).unwrap();
        referee.run(&mut recorder).unwrap();
        recorder.into_recording()
    }

    #[test]
    fn test_recorder_captures_every_turn() {
        let recording = recorded_game();
        assert_eq!(recording.len(), 3);
        assert!(recording.result.is_some());
        assert_eq!(recording.oracles.len(), 2);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let recording = recorded_game();
        let file = tempfile::NamedTempFile::new().unwrap();
        recording.save(file.path()).unwrap();
        let loaded = Recording::load(file.path()).unwrap();
        assert_eq!(loaded.turns, recording.turns);
        assert_eq!(loaded.result, recording.result);
        assert_eq!(loaded.initial.board().tiles(), recording.initial.board().tiles());
    }

    #[test]
    fn test_version_mismatch() {
        let mut recording = recorded_game();
        recording.version = 99;
        let file = tempfile::NamedTempFile::new().unwrap();
        recording.save(file.path()).unwrap();
        assert!(matches!(
            Recording::load(file.path()),
            Err(ReplayError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn test_step_forward_and_back() {
        let mut engine = ReplayEngine::new(recorded_game()).unwrap();
        assert_eq!(engine.turn(), 0);
        assert!(engine.report().is_none());
        assert_eq!(engine.state().unit("BC-1").unwrap().coord.x, 1);

        engine.step_forward().unwrap();
        assert_eq!(engine.state().unit("BC-1").unwrap().coord.x, 0);
        engine.step_forward().unwrap();
        assert_eq!(engine.state().unit("BC-1").unwrap().coord.y, 4);
        assert_eq!(engine.state().turn(), 2);

        engine.step_backward().unwrap();
        assert_eq!(engine.turn(), 1);
        assert_eq!(engine.state().unit("BC-1").unwrap().coord.y, 5);
    }

    #[test]
    fn test_bounds() {
        let mut engine = ReplayEngine::new(recorded_game()).unwrap();
        assert!(matches!(
            engine.step_backward(),
            Err(ReplayError::TurnOutOfBounds { .. })
        ));
        engine.goto_turn(3).unwrap();
        assert!(engine.is_game_over());
        assert!(engine.step_forward().is_err());
        assert!(ReplayEngine::new_at_turn(engine.recording().clone(), 9).is_err());
    }

    #[test]
    fn test_corrupt_snapshot_rejected() {
        let mut recording = recorded_game();
        let idx = recording.turns[0]
            .units
            .iter()
            .position(|u| u.id.as_str() == "BB-1")
            .unwrap();
        recording.turns[0].units[idx].coord = crate::game::Coord::new(9, 0);
        let mut engine = ReplayEngine::new(recording).unwrap();
        assert!(matches!(
            engine.goto_turn(1),
            Err(ReplayError::Corrupt { turn: 1, .. })
        ));
    }

    #[test]
    fn test_replay_error_display() {
        let err = ReplayError::TurnOutOfBounds {
            requested: 15,
            max_turn: 10,
        };
        assert!(err.to_string().contains("15"));
        assert!(err.to_string().contains("10"));
    }
}
