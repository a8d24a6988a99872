//! Watch command implementation - live TUI viewer.
//!
//! The referee runs on a worker thread and streams each resolved turn over a
//! channel; the viewer keeps every received frame so the user can step back
//! through the game while it is still being played.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use clash::game::{FactionId, GameState};
use clash::referee::{GameResult, TurnObserver, TurnReport};
use crossterm::event::KeyCode;
use tracing::debug;

use super::tui::{Screen, Term, draw, next_view, poll_key, with_terminal};
use super::{CliError, GameArgs, random_seed};

/// What the worker thread reports.
enum Update {
    Turn(Box<GameState>, Box<TurnReport>),
    Finished(GameResult),
    Failed(String),
}

/// Observer forwarding turns to the viewer.
struct Feed {
    tx: Sender<Update>,
}

impl TurnObserver for Feed {
    fn on_turn(&mut self, state: &GameState, report: &TurnReport) {
        // The viewer may already be gone.
        let _ = self.tx.send(Update::Turn(
            Box::new(state.clone()),
            Box::new(report.clone()),
        ));
    }

    fn on_game_end(&mut self, _state: &GameState, result: &GameResult) {
        let _ = self.tx.send(Update::Finished(result.clone()));
    }
}

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the game cannot be set up or the TUI fails.
pub(crate) fn execute(game: &GameArgs, speed: u64) -> Result<(), CliError> {
    let seed = game.seed.unwrap_or_else(random_seed);
    let mut referee = game.referee(seed)?;

    let oracles: BTreeMap<FactionId, String> = referee
        .state()
        .factions()
        .iter()
        .map(|f| (f.clone(), referee.oracle_name(f).unwrap_or("unknown").to_string()))
        .collect();
    let initial = referee.state().clone();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut feed = Feed { tx };
        if let Err(e) = referee.run(&mut feed) {
            let _ = feed.tx.send(Update::Failed(e.to_string()));
        }
    });

    let mut app = App {
        frames: vec![(initial, None)],
        cursor: 0,
        paused: false,
        speed_ms: speed,
        view: None,
        radius: game.board.radius,
        max_turns: game.board.turns,
        oracles,
        last_step: Instant::now(),
        finished: None,
    };
    debug!(seed, "watch started");

    with_terminal(|terminal| run_tui(terminal, &mut app, &rx))
}

/// App state for the TUI.
struct App {
    frames: Vec<(GameState, Option<TurnReport>)>,
    cursor: usize,
    paused: bool,
    speed_ms: u64,
    view: Option<usize>,
    radius: u16,
    max_turns: u32,
    oracles: BTreeMap<FactionId, String>,
    last_step: Instant,
    /// Final status line once the worker is done.
    finished: Option<String>,
}

impl App {
    fn receive(&mut self, rx: &Receiver<Update>) {
        loop {
            match rx.try_recv() {
                Ok(Update::Turn(state, report)) => self.frames.push((*state, Some(*report))),
                Ok(Update::Finished(result)) => {
                    self.finished = Some(format!("GAME OVER: {}", result.outcome));
                }
                Ok(Update::Failed(e)) => self.finished = Some(format!("ABORTED: {e}")),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.finished.is_none() {
                        self.finished = Some("ABORTED: referee stopped".to_string());
                    }
                    break;
                }
            }
        }
    }

    fn at_live_edge(&self) -> bool {
        self.cursor + 1 >= self.frames.len()
    }

    fn step_forward(&mut self) {
        if !self.at_live_edge() {
            self.cursor += 1;
        }
        self.last_step = Instant::now();
    }

    fn step_backward(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.last_step = Instant::now();
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(100).max(50);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 100).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.at_live_edge()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }

    fn status(&self) -> String {
        if !self.at_live_edge() {
            let label = if self.paused { "PAUSED" } else { "PLAYING" };
            label.to_string()
        } else if let Some(finished) = &self.finished {
            finished.clone()
        } else {
            "WAITING FOR ORACLES".to_string()
        }
    }
}

const CONTROLS: &str =
    " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [r] Restart  [e] Live  [f] Fog view ";

fn run_tui(terminal: &mut Term, app: &mut App, rx: &Receiver<Update>) -> Result<(), CliError> {
    loop {
        app.receive(rx);

        let status = app.status();
        let (state, report) = &app.frames[app.cursor.min(app.frames.len() - 1)];
        let screen = Screen {
            title: "Harford Clash",
            status: &status,
            state,
            report: report.as_ref(),
            max_turns: app.max_turns,
            oracles: &app.oracles,
            view: app.view,
            radius: app.radius,
            controls: CONTROLS,
        };
        terminal.draw(|f| draw(f, &screen))?;

        if app.should_auto_step() {
            app.step_forward();
        }

        if let Some(code) = poll_key(Duration::from_millis(50))? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.paused = !app.paused,
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => {
                    app.cursor = 0;
                    app.paused = true;
                }
                KeyCode::Char('e') => {
                    app.cursor = app.frames.len() - 1;
                    app.paused = false;
                }
                KeyCode::Char('f') => app.view = next_view(app.view),
                _ => {}
            }
        }
    }

    Ok(())
}
