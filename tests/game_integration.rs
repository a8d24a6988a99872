//! End-to-end tests of the referee driving full games.
//!
//! Every game here runs through `Referee`, so validation, resolution and
//! victory evaluation are exercised together.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use clash::game::{
    ActionFailure, ActionKind, Board, Coord, FactionId, FactionView, GameState, NON_MAPPING_ROOT,
    TerrainKind, Tile, Unit,
};
use clash::oracle::{GreedyOracle, Oracle, OracleError, PassOracle, ScriptedOracle};
use clash::referee::{EndReason, NullObserver, Referee, RefereeConfig, TurnReport};

/// Open 6x6 field, HQs in opposite corners.
fn field(units: Vec<Unit>) -> GameState {
    let board = Board::generate(6, 6, |c| Tile::new(c, "field", TerrainKind::Rural)).unwrap();
    let hq = BTreeMap::from([
        (FactionId::new("A"), Coord::new(0, 0)),
        (FactionId::new("B"), Coord::new(5, 5)),
    ]);
    GameState::new(board, vec!["A".into(), "B".into()], hq, units).unwrap()
}

fn unit(id: &str, x: u16, y: u16) -> Unit {
    let faction = if id.starts_with('a') { "A" } else { "B" };
    Unit::new(id, faction, Coord::new(x, y), 10, 5)
}

fn scripted(faction: &str, script: Vec<Value>) -> Box<dyn Oracle> {
    Box::new(ScriptedOracle::new(faction.into(), script.into_iter().map(Ok)))
}

fn referee(state: GameState, a: Box<dyn Oracle>, b: Box<dyn Oracle>, max_turns: u32) -> Referee {
    let config = RefereeConfig {
        max_turns,
        ..RefereeConfig::default()
    };
    Referee::new(state, vec![a, b], config).unwrap()
}

fn event<'a>(report: &'a TurnReport, id: &str) -> &'a clash::ActionEvent {
    report
        .events
        .events
        .iter()
        .find(|e| e.unit_id.as_str() == id)
        .unwrap()
}

/// Oracle that passes and keeps every view it is handed.
struct Spy {
    faction: FactionId,
    views: Arc<Mutex<Vec<FactionView>>>,
}

impl Oracle for Spy {
    fn name(&self) -> &str {
        "spy"
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    fn decide(&mut self, view: FactionView) -> Result<Value, OracleError> {
        self.views.lock().unwrap().push(view);
        Ok(json!({}))
    }
}

#[test]
fn test_collision_is_symmetric() {
    let state = field(vec![unit("a1", 1, 2), unit("b1", 3, 2)]);
    let into_middle_a = json!({"a1": {"action": "move", "direction": "E"}});
    let into_middle_b = json!({"b1": {"action": "move", "direction": "W"}});
    let mut referee = referee(
        state,
        scripted("A", vec![into_middle_a.clone(), into_middle_a]),
        scripted("B", vec![into_middle_b.clone(), into_middle_b]),
        10,
    );

    // Turn 1 gives A priority, turn 2 gives B priority; neither matters.
    for _ in 0..2 {
        let report = referee.play_turn().unwrap();
        assert_eq!(event(&report, "a1").failure, Some(ActionFailure::Collision));
        assert_eq!(event(&report, "b1").failure, Some(ActionFailure::Collision));
        assert_eq!(referee.state().unit("a1").unwrap().coord, Coord::new(1, 2));
        assert_eq!(referee.state().unit("b1").unwrap().coord, Coord::new(3, 2));
    }
}

#[test]
fn test_vacating_chain_moves_together() {
    let state = field(vec![unit("a1", 1, 1), unit("a2", 2, 1), unit("b1", 5, 4)]);
    let mut referee = referee(
        state,
        scripted(
            "A",
            vec![json!({
                "a1": {"action": "move", "direction": "E"},
                "a2": {"action": "move", "direction": "E"},
            })],
        ),
        Box::new(PassOracle::new("B".into())),
        10,
    );

    let report = referee.play_turn().unwrap();
    assert!(event(&report, "a1").success);
    assert!(event(&report, "a2").success);
    assert_eq!(referee.state().unit("a1").unwrap().coord, Coord::new(2, 1));
    assert_eq!(referee.state().unit("a2").unwrap().coord, Coord::new(3, 1));
}

#[test]
fn test_move_into_stationary_unit_fails() {
    let state = field(vec![unit("a1", 1, 1), unit("a2", 2, 1), unit("b1", 5, 4)]);
    let mut referee = referee(
        state,
        scripted("A", vec![json!({"a1": {"action": "move", "direction": "E"}})]),
        Box::new(PassOracle::new("B".into())),
        10,
    );

    let report = referee.play_turn().unwrap();
    assert_eq!(event(&report, "a1").failure, Some(ActionFailure::Occupied));
    assert_eq!(referee.state().unit("a1").unwrap().coord, Coord::new(1, 1));
}

#[test]
fn test_friendly_fire_has_no_effect() {
    let state = field(vec![unit("a1", 1, 1), unit("a2", 2, 1), unit("b1", 5, 4)]);
    let mut referee = referee(
        state,
        scripted(
            "A",
            vec![json!({"a1": {"action": "attack", "target_unit_id": "a2"}})],
        ),
        Box::new(PassOracle::new("B".into())),
        10,
    );

    let report = referee.play_turn().unwrap();
    let attack = event(&report, "a1");
    assert_eq!(attack.failure, Some(ActionFailure::FriendlyFire));
    assert_eq!(attack.damage, 0);
    assert_eq!(referee.state().unit("a2").unwrap().hp, 10);
}

#[test]
fn test_damage_stacks_and_combat_is_simultaneous() {
    let state = field(vec![
        unit("a1", 1, 2),
        unit("a2", 2, 1),
        unit("b1", 2, 2),
        unit("b2", 5, 5),
    ]);
    let mut referee = referee(
        state,
        scripted(
            "A",
            vec![json!({
                "a1": {"action": "attack", "target_unit_id": "b1"},
                "a2": {"action": "attack", "target_unit_id": "b1"},
            })],
        ),
        scripted(
            "B",
            vec![json!({"b1": {"action": "attack", "target_unit_id": "a1"}})],
        ),
        10,
    );

    let report = referee.play_turn().unwrap();
    assert_eq!(report.events.destroyed, vec!["b1".into()]);
    assert_eq!(referee.state().unit("b1").unwrap().hp, 0);
    // b1 still struck back on the turn it died.
    assert_eq!(referee.state().unit("a1").unwrap().hp, 5);
    assert_eq!(report.events.total_damage(), 15);
    assert!(report.outcome.is_none());
}

#[test]
fn test_fog_boundary_is_inclusive() {
    let views = Arc::new(Mutex::new(Vec::new()));
    let spy = Spy {
        faction: "A".into(),
        views: Arc::clone(&views),
    };
    let state = field(vec![unit("a1", 0, 0), unit("b1", 2, 2), unit("b2", 3, 0)]);
    let mut referee = referee(state, Box::new(spy), Box::new(PassOracle::new("B".into())), 10);
    referee.play_turn().unwrap();

    let views = views.lock().unwrap();
    let view = &views[0];
    assert_eq!(view.turn, 1);
    assert_eq!(view.visibility_radius, 2);
    let seen: Vec<&str> = view.units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(seen, vec!["a1", "b1"]);
    assert_eq!(view.own_hq, Some(Coord::new(0, 0)));
    assert_eq!(view.enemy_hq, None);
    assert_eq!(view.tiles.len(), 36);
}

#[test]
fn test_malformed_oracle_output_degrades_to_pass() {
    let state = field(vec![unit("a1", 1, 1), unit("b1", 4, 4)]);
    let nonsense = Box::new(ScriptedOracle::new(
        "B".into(),
        vec![
            Ok(json!("attack everything")),
            Err("connection reset".to_string()),
            Ok(json!({"b1": {"action": "teleport"}, "a1": {"action": "pass"}})),
        ],
    ));
    let mut referee = referee(state, Box::new(PassOracle::new("A".into())), nonsense, 3);

    let first = referee.play_turn().unwrap();
    let b = first.factions.iter().find(|f| f.faction.as_str() == "B").unwrap();
    assert!(b.orders.malformed_root);
    assert!(b.report().unwrap().contains(NON_MAPPING_ROOT));

    let second = referee.play_turn().unwrap();
    let b = second.factions.iter().find(|f| f.faction.as_str() == "B").unwrap();
    assert_eq!(b.oracle_error.as_deref(), Some("connection reset"));

    let third = referee.play_turn().unwrap();
    let b = third.factions.iter().find(|f| f.faction.as_str() == "B").unwrap();
    assert_eq!(b.orders.ignored, vec!["a1".to_string()]);
    assert_eq!(b.orders.rejected.len(), 1);
    assert!(third.events.events.iter().all(|e| e.kind == ActionKind::Pass));

    assert_eq!(referee.state().unit("b1").unwrap().coord, Coord::new(4, 4));
    assert_eq!(third.outcome.unwrap().reason, EndReason::TurnLimit);
}

#[test]
fn test_elimination_ends_the_game() {
    let state = field(vec![unit("a1", 2, 2), unit("b1", 3, 2)]);
    let mut referee = referee(
        state,
        Box::new(GreedyOracle::new("A".into())),
        Box::new(PassOracle::new("B".into())),
        50,
    );

    let result = referee.run(&mut NullObserver).unwrap();
    assert_eq!(result.outcome.winner, Some("A".into()));
    assert_eq!(result.outcome.reason, EndReason::Elimination);
    assert_eq!(result.turns, 2);
    assert!(result.is_defeated(&"B".into()));
    assert!(referee.play_turn().is_err());
}

#[test]
fn test_mutual_elimination_is_a_stalemate() {
    let weak = |id: &str, x, faction: &str| Unit::new(id, faction, Coord::new(x, 2), 5, 5);
    let state = field(vec![weak("a1", 2, "A"), weak("b1", 3, "B")]);
    let mut referee = referee(
        state,
        scripted("A", vec![json!({"a1": {"action": "attack", "target_unit_id": "b1"}})]),
        scripted("B", vec![json!({"b1": {"action": "attack", "target_unit_id": "a1"}})]),
        50,
    );

    let result = referee.run(&mut NullObserver).unwrap();
    assert_eq!(result.outcome.winner, None);
    assert_eq!(result.outcome.reason, EndReason::MutualElimination);
    assert_eq!(result.turns, 1);
}

#[test]
fn test_turn_cap_ends_in_a_draw() {
    let state = field(vec![unit("a1", 0, 1), unit("b1", 5, 4)]);
    let mut referee = referee(
        state,
        Box::new(PassOracle::new("A".into())),
        Box::new(PassOracle::new("B".into())),
        4,
    );

    let result = referee.run(&mut NullObserver).unwrap();
    assert_eq!(result.outcome.winner, None);
    assert_eq!(result.outcome.reason, EndReason::TurnLimit);
    assert_eq!(result.turns, 4);
    assert_eq!(result.survivors[&FactionId::new("A")], 1);
    assert_eq!(result.survivors[&FactionId::new("B")], 1);
}
