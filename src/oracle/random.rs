//! A seeded random bot.

use serde_json::Value;

use crate::game::{Action, ActionMap, Direction, FactionId, FactionView, action_map_to_json};
use crate::oracle::{Oracle, OracleError};
use crate::rng::Rng;

/// Issues random but well-formed orders.
///
/// Adjacent enemies are attacked half of the time; otherwise the unit
/// passes or moves in a random direction, which may well be blocked.
#[derive(Debug, Clone)]
pub struct RandomOracle {
    faction: FactionId,
    name: String,
    rng: Rng,
}

impl RandomOracle {
    /// Create a random oracle for `faction` seeded with `seed`.
    #[must_use]
    pub fn new(faction: FactionId, seed: u64) -> Self {
        let name = format!("{faction} (random)");
        Self {
            faction,
            name,
            rng: Rng::new(seed),
        }
    }

    fn plan(&mut self, view: &FactionView) -> ActionMap {
        let mut actions = ActionMap::new();
        for unit in view.own_units() {
            let adjacent: Vec<_> = view
                .enemy_units()
                .filter(|e| unit.coord.is_adjacent(e.coord))
                .collect();
            let action = if !adjacent.is_empty() && self.rng.next_u32(2) == 0 {
                let target = adjacent[self.rng.next_index(adjacent.len())];
                Action::attack(target.id.clone())
            } else if self.rng.next_u32(10) == 0 {
                Action::Pass
            } else {
                Action::step(Direction::MOVING[self.rng.next_index(Direction::MOVING.len())])
            };
            actions.insert(unit.id.clone(), action);
        }
        actions
    }
}

impl Oracle for RandomOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    fn decide(&mut self, view: FactionView) -> Result<Value, OracleError> {
        let actions = self.plan(&view);
        Ok(action_map_to_json(&actions))
    }
}
