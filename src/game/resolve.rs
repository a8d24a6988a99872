//! Simultaneous turn resolution.
//!
//! All movement and combat outcomes are computed against the pre-turn
//! snapshot and applied together, so the result never depends on the order
//! in which actions are visited.
//!
//! Movement:
//! - a move must stay on the board and land on a traversable tile;
//! - two or more moves into the same tile all fail;
//! - a move into a tile held by a living unit succeeds only if that unit's
//!   own move succeeds (chains, swaps and cycles all vacate).
//!
//! Combat: the target must be a living enemy orthogonally adjacent to the
//! attacker's pre-turn position. Damage from every successful attack stacks.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::ResolutionError;
use crate::game::invariants::check_invariants;
use crate::game::{
    Action, ActionKind, ActionMap, Coord, Direction, FactionId, GameState, Unit, UnitId,
};

/// Why an action had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFailure {
    /// Move had no recognisable direction.
    InvalidDirection,
    /// Destination is off the board.
    OutOfBounds,
    /// Destination is not traversable.
    Impassable,
    /// Another unit tried to enter the same tile.
    Collision,
    /// Destination is held by a unit that is not leaving.
    Occupied,
    /// Attack named no target.
    MissingTarget,
    /// Attack target does not exist.
    UnknownTarget,
    /// Attack target was already destroyed.
    TargetDestroyed,
    /// Attack target is on the attacker's side.
    FriendlyFire,
    /// Attack target is not orthogonally adjacent.
    NotAdjacent,
    /// Action kind has no effect in this ruleset.
    Unimplemented,
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ActionFailure::InvalidDirection => "invalid direction",
            ActionFailure::OutOfBounds => "out of bounds",
            ActionFailure::Impassable => "impassable terrain",
            ActionFailure::Collision => "collision",
            ActionFailure::Occupied => "tile occupied",
            ActionFailure::MissingTarget => "no target",
            ActionFailure::UnknownTarget => "unknown target",
            ActionFailure::TargetDestroyed => "target already destroyed",
            ActionFailure::FriendlyFire => "friendly fire",
            ActionFailure::NotAdjacent => "target not adjacent",
            ActionFailure::Unimplemented => "not implemented",
        };
        f.write_str(text)
    }
}

/// Outcome of one unit's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Acting unit.
    pub unit_id: UnitId,
    /// Acting unit's faction.
    pub faction: FactionId,
    /// Kind of action.
    pub kind: ActionKind,
    /// Pre-turn position of the acting unit.
    pub source: Coord,
    /// Move destination or attack target position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_coord: Option<Coord>,
    /// Attack target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit_id: Option<UnitId>,
    /// Damage dealt by this action.
    pub damage: i32,
    /// Whether the action took effect.
    pub success: bool,
    /// Why it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ActionFailure>,
}

impl ActionEvent {
    fn new(unit: &Unit, kind: ActionKind) -> Self {
        Self {
            unit_id: unit.id.clone(),
            faction: unit.faction.clone(),
            kind,
            source: unit.coord,
            target_coord: None,
            target_unit_id: None,
            damage: 0,
            success: true,
            failure: None,
        }
    }

    fn fail(mut self, failure: ActionFailure) -> Self {
        self.success = false;
        self.failure = Some(failure);
        self
    }
}

/// Everything that happened during one resolved turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvents {
    /// One event per submitted action, in unit id order.
    pub events: Vec<ActionEvent>,
    /// Units destroyed this turn, in id order.
    pub destroyed: Vec<UnitId>,
}

impl TurnEvents {
    /// Total damage dealt this turn.
    #[must_use]
    pub fn total_damage(&self) -> i32 {
        self.events
            .iter()
            .fold(0, |total: i32, e| total.saturating_add(e.damage))
    }

    /// Successful moves this turn.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                e.kind == ActionKind::Move && e.success && e.target_coord != Some(e.source)
            })
            .count()
    }
}

/// Resolve one turn's merged action map and apply it to `state`.
///
/// Either every effect is applied or, on error, none is.
pub fn resolve_turn(
    state: &mut GameState,
    actions: &ActionMap,
) -> Result<TurnEvents, ResolutionError> {
    for id in actions.keys() {
        let unit = state
            .unit(id.as_str())
            .ok_or_else(|| ResolutionError::UnknownUnit(id.clone()))?;
        if !unit.is_alive() {
            return Err(ResolutionError::DeadUnit(id.clone()));
        }
    }

    let mut events: BTreeMap<&UnitId, ActionEvent> = BTreeMap::new();
    let mut moves: HashMap<&UnitId, Coord> = HashMap::new();
    let mut damage: HashMap<UnitId, i32> = HashMap::new();

    for (id, action) in actions {
        let Some(unit) = state.unit(id.as_str()) else {
            continue;
        };
        let event = match action {
            Action::Pass => ActionEvent::new(unit, ActionKind::Pass),
            Action::Move { direction } => plan_move(state, unit, *direction),
            Action::Attack { target } => {
                let event = plan_attack(state, unit, target.as_ref());
                if event.success
                    && let Some(target) = &event.target_unit_id
                {
                    let total = damage.entry(target.clone()).or_insert(0);
                    *total = total.saturating_add(event.damage);
                }
                event
            }
            Action::Recruit { fields } | Action::Gather { fields } => {
                resolve_extended(unit, action.kind(), fields)
            }
        };
        events.insert(id, event);
    }

    for (id, event) in &events {
        if event.kind == ActionKind::Move
            && event.success
            && let Some(dest) = event.target_coord
            && dest != event.source
        {
            moves.insert(*id, dest);
        }
    }

    let rejected = settle_moves(state, &mut moves);
    for (id, failure) in rejected {
        if let Some(event) = events.remove(id) {
            events.insert(id, event.fail(failure));
        }
    }

    let snapshot = state.units_mut().clone();
    let mut destroyed = Vec::new();
    {
        let units = state.units_mut();
        for (id, dest) in &moves {
            if let Some(unit) = units.get_mut(id.as_str()) {
                unit.coord = *dest;
            }
        }
        for (id, dmg) in &damage {
            if let Some(unit) = units.get_mut(id.as_str()) {
                unit.hp = unit.hp.saturating_sub(*dmg);
                if !unit.is_alive() {
                    destroyed.push(unit.id.clone());
                }
            }
        }
    }
    destroyed.sort();

    let violations = check_invariants(state);
    if !violations.is_empty() {
        *state.units_mut() = snapshot;
        return Err(ResolutionError::Invariant(
            violations.into_iter().map(|v| v.message).collect(),
        ));
    }

    let events: Vec<ActionEvent> = events.into_values().collect();
    debug!(
        actions = events.len(),
        moved = moves.len(),
        damaged = damage.len(),
        destroyed = destroyed.len(),
        "turn resolved"
    );
    Ok(TurnEvents { events, destroyed })
}

fn plan_move(state: &GameState, unit: &Unit, direction: Option<Direction>) -> ActionEvent {
    let event = ActionEvent::new(unit, ActionKind::Move);
    let Some(direction) = direction else {
        return event.fail(ActionFailure::InvalidDirection);
    };
    if direction == Direction::Stay {
        return ActionEvent {
            target_coord: Some(unit.coord),
            ..event
        };
    }
    let Some(dest) = state.board().step(unit.coord, direction) else {
        return event.fail(ActionFailure::OutOfBounds);
    };
    let event = ActionEvent {
        target_coord: Some(dest),
        ..event
    };
    if state.board().is_traversable(dest) {
        event
    } else {
        event.fail(ActionFailure::Impassable)
    }
}

fn plan_attack(state: &GameState, unit: &Unit, target: Option<&UnitId>) -> ActionEvent {
    let event = ActionEvent::new(unit, ActionKind::Attack);
    let Some(target_id) = target else {
        return event.fail(ActionFailure::MissingTarget);
    };
    let event = ActionEvent {
        target_unit_id: Some(target_id.clone()),
        ..event
    };
    let Some(target) = state.unit(target_id.as_str()) else {
        return event.fail(ActionFailure::UnknownTarget);
    };
    let event = ActionEvent {
        target_coord: Some(target.coord),
        ..event
    };
    if !target.is_alive() {
        return event.fail(ActionFailure::TargetDestroyed);
    }
    if target.faction == unit.faction {
        return event.fail(ActionFailure::FriendlyFire);
    }
    if !unit.coord.is_adjacent(target.coord) {
        return event.fail(ActionFailure::NotAdjacent);
    }
    ActionEvent {
        damage: unit.attack,
        ..event
    }
}

/// Drop every move that cannot happen and report why.
///
/// First all moves sharing a destination are removed. Then, to a fixed
/// point, any move whose destination holds a living unit that is not itself
/// still moving is removed.
fn settle_moves<'a>(
    state: &GameState,
    moves: &mut HashMap<&'a UnitId, Coord>,
) -> Vec<(&'a UnitId, ActionFailure)> {
    let mut rejected = Vec::new();

    let mut claims: HashMap<Coord, usize> = HashMap::with_capacity(moves.len());
    for dest in moves.values() {
        *claims.entry(*dest).or_insert(0) += 1;
    }
    moves.retain(|id, dest| {
        let keep = claims.get(&*dest).copied().unwrap_or(0) < 2;
        if !keep {
            rejected.push((*id, ActionFailure::Collision));
        }
        keep
    });

    let occupants: HashMap<Coord, &UnitId> =
        state.living_units().map(|u| (u.coord, &u.id)).collect();
    loop {
        let blocked: Vec<&'a UnitId> = moves
            .iter()
            .filter(|(_, dest)| {
                occupants
                    .get(*dest)
                    .is_some_and(|occupant| !moves.contains_key(*occupant))
            })
            .map(|(id, _)| *id)
            .collect();
        if blocked.is_empty() {
            break;
        }
        for id in blocked {
            trace!(unit = %id, "move blocked by stationary unit");
            moves.remove(id);
            rejected.push((id, ActionFailure::Occupied));
        }
    }

    rejected
}

/// Extension point for action kinds without rules yet.
///
/// Currently every such action is a no-op reported as `Unimplemented`.
fn resolve_extended(unit: &Unit, kind: ActionKind, fields: &Map<String, Value>) -> ActionEvent {
    trace!(unit = %unit.id, %kind, fields = fields.len(), "no rules for action kind");
    ActionEvent::new(unit, kind).fail(ActionFailure::Unimplemented)
}
