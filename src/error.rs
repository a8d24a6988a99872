//! Error types for board construction and turn resolution.
//!
//! Both kinds are fatal: a `BoardError` stops a game before its first turn,
//! and a `ResolutionError` means the engine itself is broken and the run
//! must not continue.

use thiserror::Error;

use crate::game::{Coord, FactionId, UnitId};

/// Failure to build a board or an initial game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// No tiles were supplied.
    #[error("board has no tiles")]
    EmptyBoard,
    /// Two tiles share a coordinate.
    #[error("duplicate tile at {0}")]
    DuplicateTile(Coord),
    /// Tile coordinates do not cover a full rectangle.
    #[error("tiles do not form a {width}x{height} rectangle ({tiles} tiles supplied)")]
    NotRectangular {
        /// Width implied by the largest x coordinate.
        width: u16,
        /// Height implied by the largest y coordinate.
        height: u16,
        /// Number of tiles actually supplied.
        tiles: usize,
    },
    /// Board dimensions overflow the coordinate type.
    #[error("board dimensions exceed coordinate range")]
    TooLarge,
    /// The game needs exactly two factions.
    #[error("expected exactly 2 factions, got {0}")]
    FactionCount(usize),
    /// Both factions share a name.
    #[error("faction '{0}' listed twice")]
    DuplicateFaction(FactionId),
    /// A faction has no headquarters entry.
    #[error("faction '{0}' has no headquarters")]
    MissingHeadquarters(FactionId),
    /// A headquarters lies outside the board.
    #[error("headquarters of '{faction}' at {coord} is out of bounds")]
    HeadquartersOutOfBounds {
        /// Owning faction.
        faction: FactionId,
        /// Offending coordinate.
        coord: Coord,
    },
    /// A unit id appears twice.
    #[error("duplicate unit id '{0}'")]
    DuplicateUnit(UnitId),
    /// A unit belongs to a faction that is not playing.
    #[error("unit '{unit}' belongs to unknown faction '{faction}'")]
    UnknownFaction {
        /// Unit id.
        unit: UnitId,
        /// Faction named by the unit.
        faction: FactionId,
    },
    /// A unit starts outside the board.
    #[error("unit '{unit}' at {coord} is out of bounds")]
    UnitOutOfBounds {
        /// Unit id.
        unit: UnitId,
        /// Offending coordinate.
        coord: Coord,
    },
    /// A unit starts on an impassable tile.
    #[error("unit '{unit}' starts on impassable tile {coord}")]
    UnitOnImpassable {
        /// Unit id.
        unit: UnitId,
        /// Offending coordinate.
        coord: Coord,
    },
    /// A unit starts with no hit points.
    #[error("unit '{unit}' starts with non-positive hit points ({hp})")]
    NonPositiveHp {
        /// Unit id.
        unit: UnitId,
        /// Starting hit points.
        hp: i32,
    },
    /// A unit would heal whatever it attacks.
    #[error("unit '{unit}' has negative attack ({attack})")]
    NegativeAttack {
        /// Unit id.
        unit: UnitId,
        /// Attack power.
        attack: i32,
    },
    /// Two units start on the same tile.
    #[error("units '{first}' and '{second}' both start at {coord}")]
    StackedUnits {
        /// First unit on the tile.
        first: UnitId,
        /// Second unit on the tile.
        second: UnitId,
        /// Shared coordinate.
        coord: Coord,
    },
}

/// Internal defect detected while applying a merged action map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The action map names a unit that does not exist.
    #[error("action submitted for unknown unit '{0}'")]
    UnknownUnit(UnitId),
    /// The action map names a unit that is already destroyed.
    #[error("action submitted for destroyed unit '{0}'")]
    DeadUnit(UnitId),
    /// Both factions submitted an action for the same unit.
    #[error("unit '{0}' appears in more than one faction's orders")]
    DuplicateOrder(UnitId),
    /// State invariants failed after applying the turn.
    #[error("state invariants violated after resolution:\n  - {}", .0.join("\n  - "))]
    Invariant(Vec<String>),
}
