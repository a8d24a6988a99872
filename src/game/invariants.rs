//! Game invariants - sanity checks that detect engine bugs.
//!
//! These should never trigger for a state produced by `GameState::new`
//! followed by any sequence of resolved turns. If they do, the resolution
//! engine is broken.

use std::collections::HashMap;

use thiserror::Error;

use crate::game::{Coord, GameState, UnitId};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = state.board();
    let mut occupied: HashMap<Coord, &UnitId> = HashMap::new();

    for unit in state.units() {
        if state.unit(unit.id.as_str()).map(|u| &u.id) != Some(&unit.id) {
            violations.push(InvariantViolation::new(format!(
                "Unit '{}' is not retrievable by its own id",
                unit.id
            )));
        }

        if !state.factions().contains(&unit.faction) {
            violations.push(InvariantViolation::new(format!(
                "Unit '{}' belongs to unknown faction '{}'",
                unit.id, unit.faction
            )));
        }

        if !board.in_bounds(unit.coord) {
            violations.push(InvariantViolation::new(format!(
                "Unit '{}' at {} is out of bounds",
                unit.id, unit.coord
            )));
        }

        if !unit.is_alive() {
            continue;
        }

        if !board.is_traversable(unit.coord) {
            violations.push(InvariantViolation::new(format!(
                "Living unit '{}' stands on impassable tile {}",
                unit.id, unit.coord
            )));
        }

        if let Some(other) = occupied.insert(unit.coord, &unit.id) {
            violations.push(InvariantViolation::new(format!(
                "Living units '{}' and '{}' share tile {}",
                other, unit.id, unit.coord
            )));
        }
    }

    for (faction, hq) in state.headquarters_map() {
        if !board.in_bounds(*hq) {
            violations.push(InvariantViolation::new(format!(
                "Headquarters of '{faction}' at {hq} is out of bounds"
            )));
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
