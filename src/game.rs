//! Game layer for Harford Clash.
//!
//! Implements the rules of a two-faction simultaneous-turn war-game:
//! - Board of named tiles with terrain and traversability
//! - Units with hit points and attack, kept in a stable arena
//! - Fog-of-war views handed to each faction's decision oracle
//! - Validation of untrusted orders
//! - Order-independent resolution of moves and attacks

mod action;
mod fog;
pub mod invariants;
mod map;
mod resolve;
mod state;
mod unit;
mod validate;

pub use action::{Action, ActionKind, ActionMap, action_map_to_json};
pub use fog::{DEFAULT_VISIBILITY_RADIUS, FactionView, project_view};
pub use map::{Board, Coord, Direction, TerrainKind, Tile};
pub use resolve::{ActionEvent, ActionFailure, TurnEvents, resolve_turn};
pub use state::GameState;
pub use unit::{FactionId, Unit, UnitId};
pub use validate::{NON_MAPPING_ROOT, RejectReason, Rejection, ValidatedOrders, validate_orders};
