//! Plain structured text output.
//!
//! Used for the spectator summary, `replay --format text` and anywhere
//! colors would get in the way (logs, files, pipes).

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use crate::game::{ActionEvent, ActionKind, GameState};
use crate::referee::TurnReport;

/// Render the state as structured text.
///
/// Output format:
/// ```text
/// === TURN 7 OF 50 ===
///
/// MAP (10x10): 22 water, 14 woods, 8 towns
/// Headquarters:
/// - BlueCrabs at Bel Air (2,5)
/// - BayBirds at Havre de Grace (8,1)
///
/// TEAM      | UNIT_ID | (x,y) | HP
/// BlueCrabs | BC-1    | (1,5) | 10
/// ...
///
/// STATUS:
/// - BlueCrabs: ACTIVE (3 units)
/// - BayBirds: DEFEATED
/// ```
#[must_use]
pub fn render_text(state: &GameState, max_turns: u32) -> String {
    let mut output = format!("=== TURN {} OF {max_turns} ===\n\n", state.turn());
    render_map_overview(&mut output, state);
    output.push_str(&render_unit_table(state));
    output.push('\n');
    render_status(&mut output, state);
    output
}

fn render_map_overview(output: &mut String, state: &GameState) {
    let board = state.board();
    let count = |glyph: char| {
        board
            .tiles()
            .iter()
            .filter(|t| t.terrain.glyph() == glyph)
            .count()
    };
    output.push_str(&format!(
        "MAP ({}x{}): {} water, {} woods, {} towns\n",
        board.width(),
        board.height(),
        count('~'),
        count('^'),
        count('#'),
    ));

    output.push_str("Headquarters:\n");
    for faction in state.factions() {
        if let Some(hq) = state.headquarters(faction) {
            let name = state.tile(hq).map_or("?", |t| t.name.as_str());
            output.push_str(&format!("- {faction} at {name} {hq}\n"));
        }
    }
    output.push('\n');
}

/// The spectator unit table: one row per living unit.
#[must_use]
pub fn render_unit_table(state: &GameState) -> String {
    let rows: Vec<[String; 4]> = state
        .factions()
        .iter()
        .flat_map(|f| state.living_units_of(f))
        .map(|u| {
            [
                u.faction.to_string(),
                u.id.to_string(),
                u.coord.to_string(),
                u.hp.to_string(),
            ]
        })
        .collect();

    let header = ["TEAM", "UNIT_ID", "(x,y)", "HP"].map(str::to_string);
    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut output = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        output.push_str(cells.join(" | ").trim_end());
        output.push('\n');
    }
    output
}

fn render_status(output: &mut String, state: &GameState) {
    output.push_str("STATUS:\n");
    for faction in state.factions() {
        let alive = state.living_units_of(faction).count();
        if alive == 0 {
            output.push_str(&format!("- {faction}: DEFEATED\n"));
        } else {
            output.push_str(&format!("- {faction}: ACTIVE ({alive} units)\n"));
        }
    }
}

/// Render the events and validation findings of one turn.
#[must_use]
pub fn render_events(report: &TurnReport) -> String {
    let mut output = format!(
        "EVENTS OF TURN {} ({} moves first):\n",
        report.turn, report.order[0]
    );

    for faction in &report.factions {
        if let Some(err) = &faction.oracle_error {
            output.push_str(&format!("[ORACLE] {}: {err}\n", faction.oracle));
        }
        if let Some(text) = faction.report() {
            output.push_str(&format!("[RULE] {text}\n"));
        }
    }

    for event in &report.events.events {
        if event.kind == ActionKind::Pass {
            continue;
        }
        output.push_str("- ");
        output.push_str(&describe_event(event));
        output.push('\n');
    }

    if !report.events.destroyed.is_empty() {
        let names: Vec<&str> = report.events.destroyed.iter().map(|id| id.as_str()).collect();
        output.push_str(&format!("Destroyed: {}\n", names.join(", ")));
    }
    if let Some(outcome) = &report.outcome {
        output.push_str(&format!("GAME OVER: {outcome}\n"));
    }
    output
}

/// One-line description of an event.
#[must_use]
pub fn describe_event(event: &ActionEvent) -> String {
    let mut line = format!("{} {} {}", event.unit_id, event.kind, event.source);
    match event.kind {
        ActionKind::Move => {
            if let Some(to) = event.target_coord {
                line.push_str(&format!(" -> {to}"));
            }
        }
        ActionKind::Attack => {
            if let Some(target) = &event.target_unit_id {
                line.push_str(&format!(" -> {target}"));
            }
            if event.success {
                line.push_str(&format!(" for {}", event.damage));
            }
        }
        ActionKind::Pass | ActionKind::Recruit | ActionKind::Gather => {}
    }
    match event.failure {
        Some(failure) => line.push_str(&format!(" FAILED ({failure})")),
        None => line.push_str(" ok"),
    }
    line
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::oracle::{Oracle, ScriptedOracle};
    use crate::referee::{Referee, RefereeConfig};
    use crate::scenario::harford_county;

    #[test]
    fn test_render_text_basic() {
        let state = harford_county().unwrap();
        let output = render_text(&state, 50);

        assert!(output.contains("=== TURN 0 OF 50 ==="));
        assert!(output.contains("MAP (10x10)"));
        assert!(output.contains("- BlueCrabs at Bel Air (2,5)"));
        assert!(output.contains("- BayBirds at Havre de Grace (8,1)"));
        assert!(output.contains("- BlueCrabs: ACTIVE (3 units)"));
    }

    #[test]
    fn test_unit_table() {
        let state = harford_county().unwrap();
        let table = render_unit_table(&state);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("TEAM"));
        assert!(lines[1].starts_with("BlueCrabs | BC-1"));
        assert!(lines[1].ends_with("| 10"));
        assert!(lines[4].starts_with("BayBirds"));
    }

    #[test]
    fn test_render_events() {
        let state = harford_county().unwrap();
        let blue = ScriptedOracle::new(
            "BlueCrabs".into(),
            vec![Ok(json!({"BC-1": {"action": "move", "direction": "E"}, "XX": {}}))],
        );
        let birds = ScriptedOracle::new("BayBirds".into(), vec![Ok(json!("nonsense"))]);
        let agents: Vec<Box<dyn Oracle>> = vec![Box::new(blue), Box::new(birds)];
        let mut referee = Referee::new(state, agents, RefereeConfig::default()).unwrap();
        let report = referee.play_turn().unwrap();
        let text = render_events(&report);

        assert!(text.contains("EVENTS OF TURN 1 (BlueCrabs moves first)"));
        assert!(text.contains("[RULE] Agent 'BayBirds (scripted)' issued invalid orders"));
        assert!(text.contains("BC-1 move (1,5) -> (2,5) ok"));
    }
}
