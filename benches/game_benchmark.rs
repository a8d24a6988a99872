//! Benchmarks for the turn pipeline and complete games.
//!
//! Resolution and fog projection run once per turn per faction, so they are
//! the hot path for tournaments.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;

use clash::game::{
    Action, DEFAULT_VISIBILITY_RADIUS, Direction, FactionId, GameState, ValidatedOrders,
    project_view, resolve_turn, validate_orders,
};
use clash::oracle::OracleKind;
use clash::scenario::{MapGenConfig, Scenario, generate_map, harford_county};
use clash::tournament::{TournamentConfig, run_game};

/// A mid-sized generated battlefield.
fn crowded_state() -> GameState {
    let config = MapGenConfig {
        width: 24,
        height: 24,
        units_per_faction: 12,
        ..MapGenConfig::default()
    };
    generate_map(42, &config).unwrap()
}

fn bench_project_view(c: &mut Criterion) {
    let state = crowded_state();
    let faction = state.factions()[0].clone();

    c.bench_function("project_view_24x24", |b| {
        b.iter(|| black_box(project_view(&state, &faction, DEFAULT_VISIBILITY_RADIUS)));
    });
}

fn bench_validate_orders(c: &mut Criterion) {
    let state = harford_county().unwrap();
    let faction = state.factions()[0].clone();
    let mut raw = serde_json::Map::new();
    for (i, unit) in state.living_units_of(&faction).enumerate() {
        let entry = if i % 2 == 0 {
            json!({"action": "move", "direction": "NE"})
        } else {
            json!({"action": "attack", "target_unit_id": "nobody"})
        };
        raw.insert(unit.id.to_string(), entry);
    }
    raw.insert("stray".to_string(), json!("noise"));
    let raw = serde_json::Value::Object(raw);

    c.bench_function("validate_orders_harford", |b| {
        b.iter(|| black_box(validate_orders(&state, &faction, black_box(&raw))));
    });
}

fn bench_resolve_turn(c: &mut Criterion) {
    let state = crowded_state();
    let [first, second] = state.factions().clone();
    // Everyone marches east; the front rank blocks the ones behind it.
    let marching = |faction: &FactionId| {
        let mut orders = ValidatedOrders::all_pass(&state, faction);
        for action in orders.actions.values_mut() {
            *action = Action::step(Direction::East);
        }
        orders.actions
    };
    let mut actions = marching(&first);
    actions.extend(marching(&second));

    c.bench_function("resolve_turn_24x24", |b| {
        b.iter_batched(
            || state.clone(),
            |mut s| black_box(resolve_turn(&mut s, &actions).unwrap()),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_full_game(c: &mut Criterion) {
    let generated = TournamentConfig::default();
    let harford = TournamentConfig {
        scenario: Scenario::Harford,
        ..TournamentConfig::default()
    };
    let kinds = [OracleKind::Greedy, OracleKind::Random];

    c.bench_function("game_generated_greedy_vs_random", |b| {
        b.iter(|| black_box(run_game(black_box(42), kinds, &generated)));
    });

    c.bench_function("game_harford_greedy_vs_random", |b| {
        b.iter(|| black_box(run_game(black_box(42), kinds, &harford)));
    });
}

fn bench_game_batch(c: &mut Criterion) {
    // Sequential, without the parallel overhead of a tournament.
    let config = TournamentConfig::default();
    let kinds = [OracleKind::Greedy, OracleKind::Greedy];

    c.bench_function("10_games_sequential", |b| {
        b.iter(|| {
            for seed in 0..10u64 {
                let _ = black_box(run_game(black_box(seed), kinds, &config));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_project_view,
    bench_validate_orders,
    bench_resolve_turn,
    bench_full_game,
    bench_game_batch,
);
criterion_main!(benches);
