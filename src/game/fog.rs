//! Fog-of-war projection.
//!
//! Terrain is public; unit positions are not. A faction sees its own living
//! units, plus living enemy units and the enemy headquarters when they lie
//! within Chebyshev distance `radius` of at least one friendly living unit.

use serde::{Deserialize, Serialize};

use crate::game::{Coord, FactionId, GameState, Tile, Unit};

/// Default sight range in tiles.
pub const DEFAULT_VISIBILITY_RADIUS: u16 = 2;

/// Everything one faction is allowed to know this turn.
///
/// Owned and self-contained: an oracle can keep or mutate it freely without
/// touching the shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionView {
    /// The faction this view belongs to.
    pub faction: FactionId,
    /// The turn being decided (completed turns + 1).
    pub turn: u32,
    /// Board width.
    pub width: u16,
    /// Board height.
    pub height: u16,
    /// Sight range used to build this view.
    pub visibility_radius: u16,
    /// Every tile on the board.
    pub tiles: Vec<Tile>,
    /// Own living units and visible living enemies, in id order.
    pub units: Vec<Unit>,
    /// Own headquarters.
    pub own_hq: Option<Coord>,
    /// Enemy headquarters, only while in sight.
    pub enemy_hq: Option<Coord>,
}

impl FactionView {
    /// Own units in the view.
    pub fn own_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.faction == self.faction)
    }

    /// Visible enemy units.
    pub fn enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.faction != self.faction)
    }

    /// Tile at `coord`.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        let idx = usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x);
        self.tiles.get(idx).filter(|t| t.coord == coord)
    }

    /// Visible unit on `coord`.
    #[must_use]
    pub fn unit_at(&self, coord: Coord) -> Option<&Unit> {
        self.units.iter().find(|u| u.coord == coord)
    }

    /// Whether a unit standing on `coord` would be in sight.
    #[must_use]
    pub fn is_visible(&self, coord: Coord) -> bool {
        self.own_units()
            .any(|u| u.coord.chebyshev(coord) <= self.visibility_radius)
    }
}

/// Build the view of `faction`.
///
/// An unknown faction gets the board and nothing else.
#[must_use]
pub fn project_view(state: &GameState, faction: &FactionId, radius: u16) -> FactionView {
    let friendly: Vec<Coord> = state.living_units_of(faction).map(|u| u.coord).collect();
    let in_sight = |coord: Coord| friendly.iter().any(|f| f.chebyshev(coord) <= radius);

    let units = state
        .living_units()
        .filter(|u| u.belongs_to(faction) || in_sight(u.coord))
        .cloned()
        .collect();

    let enemy_hq = state
        .opponent(faction)
        .and_then(|enemy| state.headquarters(enemy))
        .filter(|hq| in_sight(*hq));

    FactionView {
        faction: faction.clone(),
        turn: state.turn() + 1,
        width: state.board().width(),
        height: state.board().height(),
        visibility_radius: radius,
        tiles: state.board().tiles().to_vec(),
        units,
        own_hq: state.headquarters(faction),
        enemy_hq,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::game::{Board, TerrainKind};

    fn state(enemy_at: Coord) -> GameState {
        let board = Board::generate(8, 8, |c| Tile::new(c, "t", TerrainKind::Rural)).unwrap();
        let hq = BTreeMap::from([
            (FactionId::new("A"), Coord::new(0, 0)),
            (FactionId::new("B"), Coord::new(7, 7)),
        ]);
        let units = vec![
            Unit::new("a1", "A", Coord::new(2, 2), 10, 5),
            Unit::new("b1", "B", enemy_at, 10, 5),
        ];
        GameState::new(board, vec!["A".into(), "B".into()], hq, units).unwrap()
    }

    #[test]
    fn test_enemy_within_radius_is_visible() {
        let state = state(Coord::new(4, 4));
        let view = project_view(&state, &"A".into(), DEFAULT_VISIBILITY_RADIUS);
        assert_eq!(view.units.len(), 2);
        assert_eq!(view.enemy_units().count(), 1);
        assert_eq!(view.turn, 1);
        assert_eq!(view.tiles.len(), 64);
    }

    #[test]
    fn test_enemy_outside_radius_is_hidden() {
        let state = state(Coord::new(5, 2));
        let view = project_view(&state, &"A".into(), DEFAULT_VISIBILITY_RADIUS);
        assert_eq!(view.enemy_units().count(), 0);
        assert_eq!(view.own_units().count(), 1);
        assert_eq!(view.own_hq, Some(Coord::new(0, 0)));
        assert_eq!(view.enemy_hq, None);
    }

    #[test]
    fn test_enemy_hq_revealed_in_range() {
        let mut state = state(Coord::new(0, 7));
        state.units_mut().get_mut("a1").unwrap().coord = Coord::new(5, 6);
        let view = project_view(&state, &"A".into(), DEFAULT_VISIBILITY_RADIUS);
        assert_eq!(view.enemy_hq, Some(Coord::new(7, 7)));
    }

    #[test]
    fn test_dead_units_never_visible() {
        let mut state = state(Coord::new(3, 3));
        state.units_mut().get_mut("b1").unwrap().hp = -1;
        let view = project_view(&state, &"A".into(), DEFAULT_VISIBILITY_RADIUS);
        assert!(view.units.iter().all(|u| u.id.as_str() != "b1"));

        // A dead faction sees nothing but terrain.
        let view_b = project_view(&state, &"B".into(), DEFAULT_VISIBILITY_RADIUS);
        assert!(view_b.units.is_empty());
        assert_eq!(view_b.enemy_hq, None);
    }

    #[test]
    fn test_view_json_shape() {
        let state = state(Coord::new(3, 3));
        let view = project_view(&state, &"A".into(), DEFAULT_VISIBILITY_RADIUS);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tiles"][0]["x"], 0);
        assert_eq!(json["tiles"][0]["terrain"], "rural");
        assert_eq!(json["units"][0]["hp"], 10);
        assert!(json["enemy_hq"].is_null());
    }
}
