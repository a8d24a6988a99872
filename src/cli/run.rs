//! Run command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use clash::game::{FactionId, GameState};
use clash::referee::{GameResult, TurnObserver, TurnReport};
use clash::replay::{Recorder, Recording, render_events, render_unit_table};
use tracing::info;

use super::output::{JsonGameResult, format_scoreboard};
use super::{CliError, GameArgs, OutputFormat, random_seed};

/// Prints each turn as it resolves and optionally records the game.
struct Spectator {
    verbose: bool,
    recorder: Option<Recorder>,
}

impl TurnObserver for Spectator {
    fn on_turn(&mut self, state: &GameState, report: &TurnReport) {
        if self.verbose {
            print!("{}", render_events(report));
            println!();
            print!("{}", render_unit_table(state));
            println!();
        }
        if let Some(recorder) = &mut self.recorder {
            recorder.on_turn(state, report);
        }
    }

    fn on_game_end(&mut self, state: &GameState, result: &GameResult) {
        if let Some(recorder) = &mut self.recorder {
            recorder.on_game_end(state, result);
        }
    }
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the game cannot be set up or aborts.
pub(crate) fn execute(
    game: &GameArgs,
    format: OutputFormat,
    record: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let seed = game.seed.unwrap_or_else(random_seed);
    let mut referee = game.referee(seed)?;

    let oracles: BTreeMap<FactionId, String> = referee
        .state()
        .factions()
        .iter()
        .map(|f| (f.clone(), referee.oracle_name(f).unwrap_or("unknown").to_string()))
        .collect();

    let text = format == OutputFormat::Text;
    if text && !quiet {
        let [first, second] = referee.state().factions();
        println!("Harford Clash (seed: {seed}, map: {})", game.board.map);
        println!(
            "{} vs {}, up to {} turns, sight radius {}",
            oracles.get(first).map_or("?", String::as_str),
            oracles.get(second).map_or("?", String::as_str),
            game.board.turns,
            game.board.radius,
        );
        println!();
        print!("{}", render_unit_table(referee.state()));
        println!();
    }

    let recorder = record.as_ref().map(|_| {
        Recorder::new(Recording::new(
            referee.state().clone(),
            seed,
            game.board.turns,
            oracles.clone(),
        ))
    });
    let mut spectator = Spectator {
        verbose: text && !quiet,
        recorder,
    };

    let start = Instant::now();
    let result = referee.run(&mut spectator)?;
    let duration = start.elapsed();
    info!(seed, turns = result.turns, outcome = %result.outcome, "game finished");

    if let (Some(path), Some(recorder)) = (&record, spectator.recorder) {
        recorder
            .into_recording()
            .save(path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if text && !quiet {
            println!("Recording saved to: {}", path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_scoreboard(&result, referee.state(), &oracles, duration));
        }
        OutputFormat::Json => {
            let json_result = JsonGameResult::new(&result, referee.state(), &oracles, duration);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
    }

    Ok(())
}
