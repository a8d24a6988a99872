//! Map validation command implementation.

use std::fs;
use std::path::Path;

use clash::game::invariants::check_invariants;
use clash::game::{DEFAULT_VISIBILITY_RADIUS, GameState};
use clash::replay::{render_ascii, render_fogged};
use clash::scenario::parse_map;

use super::CliError;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the map file cannot be read or is invalid.
pub(crate) fn execute(map: &Path, show: bool) -> Result<(), CliError> {
    let text = fs::read_to_string(map)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", map.display())))?;

    println!("Validating: {}", map.display());
    println!();

    // Parsing also runs every construction check.
    let state = match parse_map(&text) {
        Ok(state) => {
            print_check("JSON map parses and passes board checks", true);
            state
        }
        Err(e) => {
            print_check("JSON map parses and passes board checks", false);
            return Err(CliError::new(format!("Invalid map: {e}")));
        }
    };

    let violations = check_invariants(&state);
    print_check("State invariants", violations.is_empty());
    if let Some(violation) = violations.first() {
        return Err(CliError::new(violation.to_string()));
    }

    let reachable = state
        .factions()
        .iter()
        .all(|f| state.living_units_of(f).next().is_some());
    print_check("Both factions field units", reachable);
    if !reachable {
        return Err(CliError::new("A faction starts without units; the game would end at once"));
    }

    println!();
    print_summary(&state);

    if show {
        println!();
        print!("{}", render_ascii(&state, 0));
        for faction in state.factions() {
            println!();
            print!("{}", render_fogged(&state, faction, DEFAULT_VISIBILITY_RADIUS));
        }
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_summary(state: &GameState) {
    let board = state.board();
    let passable = board.tiles().iter().filter(|t| t.traversable).count();
    println!("Summary:");
    println!("  Board:        {}x{}", board.width(), board.height());
    println!("  Passable:     {passable} of {} tiles", board.tiles().len());
    for faction in state.factions() {
        let hq = state
            .headquarters(faction)
            .and_then(|c| state.tile(c).map(|t| format!("{} {c}", t.name)))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {faction}: {} units, HQ at {hq}",
            state.living_units_of(faction).count()
        );
    }
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
