// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Harford Clash: a two-faction simultaneous-turn grid war-game.
//!
//! Each faction is commanded by a decision oracle (a deterministic bot, a
//! seeded random bot or a language model). The referee hands every oracle a
//! fog-of-war view, validates the untrusted orders it returns, resolves both
//! factions' actions simultaneously and decides when the game ends.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Tournament Runner / Replay        │
//! ├─────────────────────────────────────┤
//! │   Referee  ◄──►  Oracles            │
//! ├─────────────────────────────────────┤
//! │   Game Rules (board, fog, resolve)  │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod oracle;
pub mod referee;
pub mod replay;
pub mod rng;
pub mod scenario;
pub mod tournament;

pub use error::{BoardError, ResolutionError};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, ActionEvent, Board, Coord, FactionId, FactionView, GameState, Tile, TerrainKind, Unit,
    UnitId,
};
pub use oracle::{Oracle, OracleError, OracleKind};
pub use referee::{
    EndReason, GameOutcome, GameResult, Referee, RefereeConfig, RefereeError, TurnObserver,
    TurnReport,
};
