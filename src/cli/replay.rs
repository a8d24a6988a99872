//! Replay command implementation.

use std::path::Path;
use std::time::Duration;

use clash::game::{DEFAULT_VISIBILITY_RADIUS, FactionId};
use clash::replay::{Recording, ReplayEngine, render_events};
use crossterm::event::KeyCode;

use super::tui::{Screen, Term, draw, next_view, poll_key, with_terminal};
use super::{CliError, ReplayFormat};

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or is corrupt.
pub(crate) fn execute(
    recording_path: &Path,
    format: ReplayFormat,
    turn: Option<u32>,
    faction: Option<FactionId>,
    radius: Option<u16>,
) -> Result<(), CliError> {
    // Load recording
    let recording = Recording::load(recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;

    let view = match &faction {
        Some(name) => Some(
            recording
                .initial
                .factions()
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| CliError::new(format!("no faction named '{name}' in recording")))?,
        ),
        None => None,
    };
    let radius = radius.unwrap_or(DEFAULT_VISIBILITY_RADIUS);

    // Create replay engine
    let engine = if let Some(target_turn) = turn {
        ReplayEngine::new_at_turn(recording, target_turn)?
    } else {
        ReplayEngine::new(recording)?
    };

    match format {
        ReplayFormat::Tui => with_terminal(|terminal| run_replay_tui(terminal, engine, view, radius)),
        ReplayFormat::Text => print_text_replay(engine),
        ReplayFormat::Ascii => print_ascii_replay(engine, faction.as_ref(), radius),
    }
}

const CONTROLS: &str = " [q] Quit  [←/→] Step  [Home/End] First/Last  [f] Fog view ";

fn run_replay_tui(
    terminal: &mut Term,
    mut engine: ReplayEngine,
    mut view: Option<usize>,
    radius: u16,
) -> Result<(), CliError> {
    loop {
        let status = match engine.recording().result.as_ref() {
            Some(result) if engine.is_game_over() => format!("GAME OVER: {}", result.outcome),
            _ => "REPLAY".to_string(),
        };
        let screen = Screen {
            title: "Harford Clash Replay",
            status: &status,
            state: engine.state(),
            report: engine.report(),
            max_turns: engine.recording().max_turns,
            oracles: &engine.recording().oracles,
            view,
            radius,
            controls: CONTROLS,
        };
        terminal.draw(|f| draw(f, &screen))?;

        if let Some(code) = poll_key(Duration::from_millis(100))? {
            // Stepping past either end is a no-op.
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Right | KeyCode::Char('l') => {
                    let _ = engine.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    let _ = engine.step_backward();
                }
                KeyCode::Home => engine.goto_turn(0)?,
                KeyCode::End => {
                    let last = engine.recording().last_turn();
                    engine.goto_turn(last)?;
                }
                KeyCode::Char('f') => view = next_view(view),
                _ => {}
            }
        }
    }

    Ok(())
}

fn print_text_replay(mut engine: ReplayEngine) -> Result<(), CliError> {
    println!("Replay of game (seed: {})", engine.recording().seed);
    for (faction, oracle) in &engine.recording().oracles {
        println!("  {faction}: {oracle}");
    }
    println!();

    loop {
        println!("{}", engine.render_text());
        if let Some(report) = engine.report() {
            println!("{}", render_events(report));
        }
        if engine.is_game_over() {
            break;
        }
        engine.step_forward()?;
    }

    print_final(&engine);
    Ok(())
}

fn print_ascii_replay(
    mut engine: ReplayEngine,
    faction: Option<&FactionId>,
    radius: u16,
) -> Result<(), CliError> {
    println!("Replay of game (seed: {})", engine.recording().seed);
    println!();

    loop {
        match faction {
            Some(faction) => println!("{}", engine.render_fogged(faction, radius)),
            None => println!("{}", engine.render_ascii()),
        }
        if engine.is_game_over() {
            break;
        }
        engine.step_forward()?;
    }

    print_final(&engine);
    Ok(())
}

fn print_final(engine: &ReplayEngine) {
    match &engine.recording().result {
        Some(result) => println!("=== GAME OVER: {} ===", result.outcome),
        None => println!("=== END OF RECORDING (game did not finish) ==="),
    }
}
