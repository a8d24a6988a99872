#![no_main]

//! Turn pipeline fuzzer.
//!
//! Feeds arbitrary bytes as oracle output through validation and
//! resolution for several turns:
//! 1. Parse the bytes as JSON (anything unparsable becomes `null`)
//! 2. Validate each faction's orders
//! 3. Merge and resolve
//! 4. Check state invariants
//!
//! Validation must absorb any input, and resolution must never fail on
//! validated orders.

use arbitrary::Arbitrary;
use clash::game::invariants::check_invariants;
use clash::game::{resolve_turn, validate_orders};
use clash::scenario::{MapGenConfig, generate_map};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

/// Structured input for turn fuzzing.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    /// Seed for the generated battlefield.
    seed: u64,
    /// Board edge, folded into a small range.
    edge: u8,
    /// Raw oracle outputs, alternating between the two factions.
    outputs: Vec<Vec<u8>>,
}

fuzz_target!(|input: TurnInput| {
    let config = MapGenConfig {
        width: 4 + u16::from(input.edge % 9),
        height: 4 + u16::from(input.edge / 9 % 9),
        units_per_faction: 3,
        ..MapGenConfig::default()
    };
    let Ok(mut state) = generate_map(input.seed, &config) else {
        return;
    };
    let factions = state.factions().clone();

    for pair in input.outputs.chunks(2).take(12) {
        let mut merged = std::collections::BTreeMap::new();
        for (faction, bytes) in factions.iter().zip(pair) {
            let raw: Value = serde_json::from_slice(bytes).unwrap_or(Value::Null);
            let orders = validate_orders(&state, faction, &raw);

            assert_eq!(
                orders.actions.len(),
                state.living_units_of(faction).count(),
                "validated orders must cover every living unit"
            );
            assert!(orders.actions.keys().all(|id| {
                state.unit(id.as_str()).is_some_and(|u| u.is_alive() && u.belongs_to(faction))
            }));
            merged.extend(orders.actions);
        }

        let events = resolve_turn(&mut state, &merged).expect("validated orders must resolve");
        assert_eq!(events.events.len(), merged.len());

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
        state.advance_turn();
    }
});
