//! A deterministic greedy bot.

use std::collections::HashSet;

use serde_json::Value;

use crate::game::{
    Action, ActionMap, Coord, Direction, FactionId, FactionView, Unit, action_map_to_json,
};
use crate::oracle::{Oracle, OracleError};

/// Attacks the weakest adjacent enemy, otherwise advances.
///
/// Each unit heads for the nearest visible enemy, or the enemy headquarters
/// if it is in sight, or the mirror image of its own headquarters. Units
/// never plan to enter the same tile as a friendly unit.
#[derive(Debug, Clone)]
pub struct GreedyOracle {
    faction: FactionId,
    name: String,
}

impl GreedyOracle {
    /// Create a greedy oracle for `faction`.
    #[must_use]
    pub fn new(faction: FactionId) -> Self {
        let name = format!("{faction} (greedy)");
        Self { faction, name }
    }

    /// Compute orders for every own unit in `view`.
    #[must_use]
    pub fn plan(view: &FactionView) -> ActionMap {
        let mut claimed: HashSet<Coord> = HashSet::new();
        let mut actions = ActionMap::new();

        for unit in view.own_units() {
            let weakest = view
                .enemy_units()
                .filter(|e| unit.coord.is_adjacent(e.coord))
                .min_by(|a, b| a.hp.cmp(&b.hp).then_with(|| a.id.cmp(&b.id)));
            if let Some(target) = weakest {
                actions.insert(unit.id.clone(), Action::attack(target.id.clone()));
                claimed.insert(unit.coord);
                continue;
            }

            let goal = goal_for(view, unit);
            match best_step(view, unit.coord, goal, &claimed) {
                Some((direction, dest)) => {
                    claimed.insert(dest);
                    actions.insert(unit.id.clone(), Action::step(direction));
                }
                None => {
                    claimed.insert(unit.coord);
                    actions.insert(unit.id.clone(), Action::Pass);
                }
            }
        }

        actions
    }
}

fn goal_for(view: &FactionView, unit: &Unit) -> Coord {
    view.enemy_units()
        .min_by(|a, b| {
            unit.coord
                .chebyshev(a.coord)
                .cmp(&unit.coord.chebyshev(b.coord))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|e| e.coord)
        .or(view.enemy_hq)
        .unwrap_or_else(|| {
            let own = view.own_hq.unwrap_or(unit.coord);
            Coord::new(
                view.width.saturating_sub(1).saturating_sub(own.x),
                view.height.saturating_sub(1).saturating_sub(own.y),
            )
        })
}

fn best_step(
    view: &FactionView,
    from: Coord,
    goal: Coord,
    claimed: &HashSet<Coord>,
) -> Option<(Direction, Coord)> {
    let current = from.manhattan(goal);
    Direction::MOVING
        .iter()
        .filter_map(|&d| {
            let (dx, dy) = d.delta();
            let dest = from.offset(dx, dy)?;
            let open = view.tile(dest).is_some_and(|t| t.traversable)
                && view.unit_at(dest).is_none()
                && !claimed.contains(&dest);
            open.then_some((d, dest))
        })
        .filter(|(_, dest)| dest.manhattan(goal) < current)
        .min_by_key(|(_, dest)| dest.manhattan(goal))
}

impl Oracle for GreedyOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    fn decide(&mut self, view: FactionView) -> Result<Value, OracleError> {
        Ok(action_map_to_json(&Self::plan(&view)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::game::{Board, GameState, TerrainKind, Tile, project_view};

    fn state(units: Vec<Unit>) -> GameState {
        let board = Board::generate(6, 6, |c| Tile::new(c, "t", TerrainKind::Rural)).unwrap();
        let hq = BTreeMap::from([
            (FactionId::new("A"), Coord::new(0, 0)),
            (FactionId::new("B"), Coord::new(5, 5)),
        ]);
        GameState::new(board, vec!["A".into(), "B".into()], hq, units).unwrap()
    }

    #[test]
    fn test_attacks_weakest_adjacent() {
        let s = state(vec![
            Unit::new("a1", "A", Coord::new(2, 2), 10, 5),
            Unit::new("b1", "B", Coord::new(3, 2), 10, 5),
            Unit::new("b2", "B", Coord::new(2, 3), 4, 5),
        ]);
        let plan = GreedyOracle::plan(&project_view(&s, &"A".into(), 2));
        assert_eq!(plan["a1"], Action::attack("b2"));
    }

    #[test]
    fn test_advances_towards_enemy() {
        let s = state(vec![
            Unit::new("a1", "A", Coord::new(0, 0), 10, 5),
            Unit::new("b1", "B", Coord::new(2, 2), 10, 5),
        ]);
        let plan = GreedyOracle::plan(&project_view(&s, &"A".into(), 2));
        assert_eq!(plan["a1"], Action::step(Direction::SouthEast));
    }

    #[test]
    fn test_friendly_units_do_not_collide() {
        let s = state(vec![
            Unit::new("a1", "A", Coord::new(0, 1), 10, 5),
            Unit::new("a2", "A", Coord::new(1, 0), 10, 5),
        ]);
        let plan = GreedyOracle::plan(&project_view(&s, &"A".into(), 2));
        let dest = |id: &str| match plan[id] {
            Action::Move {
                direction: Some(d),
            } => {
                let (dx, dy) = d.delta();
                s.unit(id).unwrap().coord.offset(dx, dy)
            }
            _ => None,
        };
        assert_ne!(dest("a1"), dest("a2"));
    }

    #[test]
    fn test_output_is_valid_orders() {
        let s = state(vec![Unit::new("a1", "A", Coord::new(1, 1), 10, 5)]);
        let mut oracle = GreedyOracle::new("A".into());
        let raw = oracle.decide(project_view(&s, &"A".into(), 2)).unwrap();
        let orders = crate::game::validate_orders(&s, &"A".into(), &raw);
        assert!(orders.is_clean());
    }
}
