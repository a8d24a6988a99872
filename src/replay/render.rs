//! ASCII renderer for terminal viewing with ANSI colors.

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use crate::game::{Coord, FactionId, GameState, Unit, project_view};

/// ANSI color codes for the two factions.
const FACTION_COLORS: [&str; 2] = [
    "\x1b[34m", // Faction 1: Blue
    "\x1b[31m", // Faction 2: Red
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const GRAY: &str = "\x1b[90m";

/// Render the full board with every unit.
///
/// Output format:
/// ```text
/// Turn 7/50
/// ┌─────────────────────┐
/// │ . . ^ . . ^ . 2 ~ ~ │
/// │ . ^ . . ^ . . . H ~ │
/// └─────────────────────┘
///
/// Legend: .=Farmland  #=Town  ^=Woods  ~=Water  H=Headquarters  1/2=Unit
///
/// BlueCrabs: 3 units, 27 HP
/// BayBirds:  2 units, 15 HP
/// ```
#[must_use]
pub fn render_ascii(state: &GameState, max_turns: u32) -> String {
    let mut output = format!("Turn {}/{max_turns}\n", state.turn());
    render_grid(&mut output, state, |c| state.unit_at(c), |_| true);
    render_legend(&mut output, state);
    let units: Vec<&Unit> = state.living_units().collect();
    render_faction_stats(&mut output, state, &units);
    output
}

/// Render the board as `faction` sees it: enemy units outside the sight
/// radius are hidden and unobserved tiles are dimmed.
#[must_use]
pub fn render_fogged(state: &GameState, faction: &FactionId, radius: u16) -> String {
    let view = project_view(state, faction, radius);
    let mut output = format!("Turn {} - view of {faction} (radius {radius})\n", state.turn());
    render_grid(
        &mut output,
        state,
        |c| view.unit_at(c),
        |c| view.is_visible(c),
    );
    render_legend(&mut output, state);
    let units: Vec<&Unit> = view.units.iter().collect();
    render_faction_stats(&mut output, state, &units);
    output
}

fn render_grid<'a>(
    output: &mut String,
    state: &GameState,
    unit_at: impl Fn(Coord) -> Option<&'a Unit>,
    visible: impl Fn(Coord) -> bool,
) {
    let width = state.board().width();
    let height = state.board().height();
    let border = "─".repeat(usize::from(width) * 2 + 1);

    output.push_str(&format!("┌{border}┐\n"));
    for y in 0..height {
        output.push_str("│ ");
        for x in 0..width {
            let coord = Coord::new(x, y);
            render_tile(output, state, coord, unit_at(coord), visible(coord));
            output.push(' ');
        }
        output.push_str("│\n");
    }
    output.push_str(&format!("└{border}┘\n"));
}

fn render_tile(
    output: &mut String,
    state: &GameState,
    coord: Coord,
    unit: Option<&Unit>,
    lit: bool,
) {
    if let Some(unit) = unit {
        let idx = faction_index(state, &unit.faction);
        let color = FACTION_COLORS.get(idx).copied().unwrap_or(BOLD);
        output.push_str(&format!("{BOLD}{color}{}{RESET}", idx + 1));
        return;
    }

    if let Some(owner) = state
        .factions()
        .iter()
        .position(|f| state.headquarters(f) == Some(coord))
    {
        let color = FACTION_COLORS.get(owner).copied().unwrap_or(BOLD);
        output.push_str(&format!("{color}H{RESET}"));
        return;
    }

    let Some(tile) = state.tile(coord) else {
        output.push('?');
        return;
    };
    let glyph = tile.terrain.glyph();
    if !lit {
        output.push_str(&format!("{DIM}{GRAY}{glyph}{RESET}"));
        return;
    }
    let color = match glyph {
        '~' => CYAN,
        '^' => GREEN,
        _ => "",
    };
    if color.is_empty() {
        output.push(glyph);
    } else {
        output.push_str(&format!("{color}{glyph}{RESET}"));
    }
}

fn render_legend(output: &mut String, state: &GameState) {
    let [a, b] = state.factions();
    output.push_str(&format!(
        "\nLegend: .=Farmland  #=Town  ^=Woods  ~=Water  H=Headquarters  1={a}  2={b}\n\n"
    ));
}

fn render_faction_stats(output: &mut String, state: &GameState, units: &[&Unit]) {
    for (idx, faction) in state.factions().iter().enumerate() {
        let color = FACTION_COLORS.get(idx).copied().unwrap_or(BOLD);
        let mine: Vec<&&Unit> = units
            .iter()
            .filter(|u| u.belongs_to(faction) && u.is_alive())
            .collect();
        if mine.is_empty() && state.is_defeated(faction) {
            output.push_str(&format!("{DIM}{faction}: DEFEATED{RESET}\n"));
            continue;
        }
        let hp = mine.iter().fold(0, |hp: i32, u| hp.saturating_add(u.hp));
        output.push_str(&format!(
            "{color}{faction}:{RESET} {} units, {hp} HP\n",
            mine.len()
        ));
    }
}

fn faction_index(state: &GameState, faction: &FactionId) -> usize {
    state
        .factions()
        .iter()
        .position(|f| f == faction)
        .unwrap_or(0)
}
