//! Recording, replay and tournament tests that touch the filesystem or
//! run many games.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clash::game::{GameState, Unit};
use clash::oracle::{LlmConfig, OracleKind, build_agents};
use clash::referee::{Referee, RefereeConfig};
use clash::replay::{FORMAT_VERSION, Recorder, Recording, ReplayEngine, ReplayError};
use clash::scenario::{MapGenConfig, Scenario, harford_county, save_map};
use clash::tournament::{TournamentConfig, run_tournament};

fn positions(units: impl Iterator<Item = Unit>) -> Vec<(String, u16, u16, i32)> {
    units
        .map(|u| (u.id.to_string(), u.coord.x, u.coord.y, u.hp))
        .collect()
}

/// Play a recorded Harford game and return the recording and final state.
fn record_game(seed: u64) -> (Recording, GameState) {
    let state = harford_county().unwrap();
    let agents = build_agents(
        state.factions(),
        [OracleKind::Greedy, OracleKind::Random],
        seed,
        &LlmConfig::default(),
    );
    let config = RefereeConfig {
        max_turns: 25,
        oracle_timeout: Duration::MAX,
        seed,
        ..RefereeConfig::default()
    };
    let oracles: BTreeMap<_, _> = agents
        .iter()
        .map(|a| (a.faction().clone(), a.name().to_string()))
        .collect();
    let mut recorder = Recorder::new(Recording::new(state.clone(), seed, config.max_turns, oracles));
    let mut referee = Referee::new(state, agents, config).unwrap();
    let result = referee.run(&mut recorder).unwrap();

    let recording = recorder.into_recording();
    assert_eq!(recording.result.as_ref(), Some(&result));
    assert_eq!(recording.last_turn(), result.turns);
    (recording, referee.state().clone())
}

#[test]
fn test_recording_survives_save_and_load() {
    let (recording, final_state) = record_game(11);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.json");
    recording.save(&path).unwrap();

    let loaded = Recording::load(&path).unwrap();
    assert_eq!(loaded.version, FORMAT_VERSION);
    assert_eq!(loaded.seed, 11);
    assert_eq!(loaded.oracles, recording.oracles);
    assert_eq!(loaded.result, recording.result);
    assert_eq!(loaded.len(), recording.len());

    let last = loaded.last_turn();
    let mut engine = ReplayEngine::new_at_turn(loaded, last).unwrap();
    assert!(engine.is_game_over());
    assert_eq!(
        positions(engine.state().units().cloned()),
        positions(final_state.units().cloned())
    );

    // Back to the start: the initial state exactly.
    engine.goto_turn(0).unwrap();
    assert!(engine.report().is_none());
    assert_eq!(
        positions(engine.state().units().cloned()),
        positions(recording.initial.units().cloned())
    );
}

#[test]
fn test_replay_steps_match_reports() {
    let (recording, _) = record_game(5);
    let mut engine = ReplayEngine::new(recording.clone()).unwrap();

    for report in &recording.turns {
        engine.step_forward().unwrap();
        assert_eq!(engine.turn(), report.turn);
        assert_eq!(engine.report(), Some(report));
        assert_eq!(
            positions(engine.state().units().cloned()),
            positions(report.units.iter().cloned())
        );
    }
    assert!(engine.step_forward().is_err());

    engine.step_backward().unwrap();
    assert_eq!(engine.turn(), recording.last_turn() - 1);
}

#[test]
fn test_corrupt_snapshot_is_rejected() {
    let (mut recording, _) = record_game(3);
    let first = recording.turns[0].units[0].coord;
    recording.turns[0].units[1].coord = first;

    let err = ReplayEngine::new_at_turn(recording, 1).unwrap_err();
    assert!(matches!(err, ReplayError::Corrupt { turn: 1, .. }), "{err}");
}

#[test]
fn test_unknown_recording_version_is_rejected() {
    let (mut recording, _) = record_game(3);
    recording.version = FORMAT_VERSION + 1;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    recording.save(&path).unwrap();

    let err = Recording::load(&path).unwrap_err();
    assert!(matches!(err, ReplayError::Version { .. }), "{err}");
}

#[test]
fn test_missing_recording_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Recording::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ReplayError::Io { .. }));
}

#[test]
fn test_map_file_scenario_round_trips() {
    let state = harford_county().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harford.json");
    save_map(&path, &state).unwrap();

    let loaded = Scenario::File(path).build(0, &MapGenConfig::default()).unwrap();
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        serde_json::to_value(&state).unwrap()
    );
}

#[test]
fn test_tournament_is_reproducible() {
    let config = TournamentConfig {
        max_turns: 40,
        ..TournamentConfig::default()
    };
    let finished = AtomicU64::new(0);
    let on_game = || {
        finished.fetch_add(1, Ordering::Relaxed);
    };

    let kinds = [OracleKind::Greedy, OracleKind::Random];
    let first = run_tournament(7, 12, kinds, &config, &on_game).unwrap();
    let second = run_tournament(7, 12, kinds, &config, &on_game).unwrap();

    assert_eq!(first, second);
    assert_eq!(finished.load(Ordering::Relaxed), 24);
    assert_eq!(first.games_played, 12);
    assert_eq!(first.games_failed, 0);
    assert_eq!(first.wins[0] + first.wins[1] + first.draws, 12);
    assert_eq!(first.reasons.values().sum::<u64>(), 12);
}

#[test]
fn test_tournament_on_harford() {
    let config = TournamentConfig {
        max_turns: 30,
        scenario: Scenario::Harford,
        ..TournamentConfig::default()
    };
    let stats = run_tournament(1, 6, [OracleKind::Pass, OracleKind::Pass], &config, &|| {}).unwrap();

    // Nobody moves, so every game runs to the cap.
    assert_eq!(stats.draws, 6);
    assert_eq!(stats.total_turns, 6 * 30);
}
