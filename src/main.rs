//! Harford Clash CLI - run, watch, replay and benchmark games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clash::game::FactionId;
use tracing_subscriber::EnvFilter;

/// Harford Clash - a two-faction simultaneous-turn war-game
#[derive(Parser, Debug)]
#[command(name = "clash")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter, e.g. "debug" or "clash=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game and print it turn by turn
    Run {
        #[command(flatten)]
        game: cli::GameArgs,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save a replay recording to file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch a game in real-time
    Watch {
        #[command(flatten)]
        game: cli::GameArgs,

        /// Delay between displayed turns in milliseconds
        #[arg(long, default_value = "500")]
        speed: u64,
    },

    /// Replay a recorded game
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: tui, text, or ascii
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Start at specific turn
        #[arg(short, long)]
        turn: Option<u32>,

        /// Show the board as this faction saw it
        #[arg(long)]
        faction: Option<FactionId>,

        /// Sight radius for the fogged view
        #[arg(short, long)]
        radius: Option<u16>,
    },

    /// Run mass parallel games between deterministic bots
    Tournament(cli::tournament::TournamentArgs),

    /// Validate a JSON map file
    Validate {
        /// Map file to validate
        #[arg(required = true)]
        map: PathBuf,

        /// Print the board and each faction's starting view
        #[arg(long)]
        show: bool,
    },
}

impl Commands {
    /// Whether the command takes over the terminal.
    const fn is_tui(&self) -> bool {
        matches!(
            self,
            Commands::Watch { .. }
                | Commands::Replay {
                    format: cli::ReplayFormat::Tui,
                    ..
                }
        )
    }
}

/// Log to stderr so stdout stays machine-readable.
///
/// TUI commands log nothing unless asked, since stray lines would corrupt
/// the screen.
fn init_tracing(level: Option<&str>, tui: bool) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None if tui => EnvFilter::new("off"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_level.as_deref(), args.command.is_tui());

    let result = match args.command {
        Commands::Run {
            game,
            format,
            record,
            quiet,
        } => cli::run::execute(&game, format, record, quiet),

        Commands::Watch { game, speed } => cli::watch::execute(&game, speed),

        Commands::Replay {
            recording,
            format,
            turn,
            faction,
            radius,
        } => cli::replay::execute(&recording, format, turn, faction, radius),

        Commands::Tournament(tournament) => cli::tournament::execute(&tournament),

        Commands::Validate { map, show } => cli::validate::execute(&map, show),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
