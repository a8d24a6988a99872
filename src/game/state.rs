//! Game state management.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::game::{Board, Coord, FactionId, Tile, Unit, UnitId};

/// Complete game state: the fixed board, the unit arena, headquarters and
/// the completed-turn counter.
///
/// Only the resolution engine mutates units, and only the referee advances
/// the turn counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StateData", into = "StateData")]
pub struct GameState {
    board: Board,
    factions: [FactionId; 2],
    headquarters: BTreeMap<FactionId, Coord>,
    units: BTreeMap<UnitId, Unit>,
    turn: u32,
}

/// Serialized shape of a game state, shared by map files and replays.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateData {
    factions: Vec<FactionId>,
    headquarters: BTreeMap<FactionId, Coord>,
    tiles: Board,
    units: Vec<Unit>,
    #[serde(default)]
    turn: u32,
}

impl GameState {
    /// Build and validate an initial game state.
    ///
    /// Every unit must belong to one of the two factions, start alive on a
    /// traversable in-bounds tile with non-negative attack, and no two units
    /// may share a tile.
    pub fn new(
        board: Board,
        factions: Vec<FactionId>,
        headquarters: BTreeMap<FactionId, Coord>,
        units: Vec<Unit>,
    ) -> Result<Self, BoardError> {
        let factions: [FactionId; 2] = factions
            .try_into()
            .map_err(|v: Vec<FactionId>| BoardError::FactionCount(v.len()))?;
        if factions[0] == factions[1] {
            return Err(BoardError::DuplicateFaction(factions[0].clone()));
        }

        for faction in &factions {
            let coord = *headquarters
                .get(faction)
                .ok_or_else(|| BoardError::MissingHeadquarters(faction.clone()))?;
            if !board.in_bounds(coord) {
                return Err(BoardError::HeadquartersOutOfBounds {
                    faction: faction.clone(),
                    coord,
                });
            }
        }
        let headquarters = headquarters
            .into_iter()
            .filter(|(f, _)| factions.contains(f))
            .collect();

        let mut arena = BTreeMap::new();
        let mut occupied: HashMap<Coord, UnitId> = HashMap::with_capacity(units.len());
        for unit in units {
            if !factions.contains(&unit.faction) {
                return Err(BoardError::UnknownFaction {
                    unit: unit.id,
                    faction: unit.faction,
                });
            }
            if !board.in_bounds(unit.coord) {
                return Err(BoardError::UnitOutOfBounds {
                    unit: unit.id,
                    coord: unit.coord,
                });
            }
            if !board.is_traversable(unit.coord) {
                return Err(BoardError::UnitOnImpassable {
                    unit: unit.id,
                    coord: unit.coord,
                });
            }
            if !unit.is_alive() {
                return Err(BoardError::NonPositiveHp {
                    unit: unit.id,
                    hp: unit.hp,
                });
            }
            if unit.attack < 0 {
                return Err(BoardError::NegativeAttack {
                    unit: unit.id,
                    attack: unit.attack,
                });
            }
            if let Some(first) = occupied.get(&unit.coord) {
                return Err(BoardError::StackedUnits {
                    first: first.clone(),
                    second: unit.id,
                    coord: unit.coord,
                });
            }
            if arena.contains_key(&unit.id) {
                return Err(BoardError::DuplicateUnit(unit.id));
            }
            occupied.insert(unit.coord, unit.id.clone());
            arena.insert(unit.id.clone(), unit);
        }

        Ok(Self {
            board,
            factions,
            headquarters,
            units: arena,
            turn: 0,
        })
    }

    /// The terrain grid.
    #[must_use]
    #[inline]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The two factions in canonical order.
    #[must_use]
    pub const fn factions(&self) -> &[FactionId; 2] {
        &self.factions
    }

    /// The faction opposing `faction`, if `faction` is playing.
    #[must_use]
    pub fn opponent(&self, faction: &FactionId) -> Option<&FactionId> {
        match &self.factions {
            [a, b] if a == faction => Some(b),
            [a, b] if b == faction => Some(a),
            _ => None,
        }
    }

    /// Number of completed turns.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Record a completed turn.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Headquarters coordinate of a faction.
    #[must_use]
    pub fn headquarters(&self, faction: &FactionId) -> Option<Coord> {
        self.headquarters.get(faction).copied()
    }

    /// Look up a unit by id, alive or dead.
    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Every unit ever placed, in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Living units in id order.
    pub fn living_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.is_alive())
    }

    /// Living units controlled by `faction`.
    pub fn living_units_of<'a>(&'a self, faction: &'a FactionId) -> impl Iterator<Item = &'a Unit> {
        self.living_units().filter(move |u| u.belongs_to(faction))
    }

    /// The living unit standing on `coord`, if any. Dead units never occupy.
    #[must_use]
    pub fn unit_at(&self, coord: Coord) -> Option<&Unit> {
        self.living_units().find(|u| u.coord == coord)
    }

    /// Tile at `coord`.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.board.get(coord)
    }

    /// A faction is defeated once it controls no living units.
    #[must_use]
    pub fn is_defeated(&self, faction: &FactionId) -> bool {
        self.living_units_of(faction).next().is_none()
    }

    /// A copy of this state with the unit arena and turn counter replaced by
    /// a recorded snapshot. The snapshot is trusted; callers that load it from
    /// disk should run [`check_invariants`](crate::game::invariants::check_invariants).
    #[must_use]
    pub fn with_snapshot(&self, units: &[Unit], turn: u32) -> Self {
        Self {
            board: self.board.clone(),
            factions: self.factions.clone(),
            headquarters: self.headquarters.clone(),
            units: units.iter().map(|u| (u.id.clone(), u.clone())).collect(),
            turn,
        }
    }

    /// Mutable access to the unit arena for the resolution engine.
    pub(crate) fn units_mut(&mut self) -> &mut BTreeMap<UnitId, Unit> {
        &mut self.units
    }

    /// Headquarters of both factions.
    pub(crate) fn headquarters_map(&self) -> &BTreeMap<FactionId, Coord> {
        &self.headquarters
    }
}

impl TryFrom<StateData> for GameState {
    type Error = BoardError;

    fn try_from(data: StateData) -> Result<Self, Self::Error> {
        let StateData {
            factions,
            headquarters,
            tiles,
            units,
            turn,
        } = data;
        let dead: Vec<Unit> = units.iter().filter(|u| !u.is_alive()).cloned().collect();
        let living = units.into_iter().filter(Unit::is_alive).collect();
        let mut state = Self::new(tiles, factions, headquarters, living)?;
        for unit in dead {
            // Recorded snapshots keep destroyed units; they never occupy a tile.
            if state.units.contains_key(&unit.id) {
                return Err(BoardError::DuplicateUnit(unit.id));
            }
            state.units.insert(unit.id.clone(), unit);
        }
        state.turn = turn;
        Ok(state)
    }
}

impl From<GameState> for StateData {
    fn from(state: GameState) -> Self {
        Self {
            factions: state.factions.to_vec(),
            headquarters: state.headquarters,
            tiles: state.board,
            units: state.units.into_values().collect(),
            turn: state.turn,
        }
    }
}
