//! Tournament command implementation.

use std::time::{Duration, Instant};

use clash::oracle::OracleKind;
use clash::tournament::{TournamentConfig, run_tournament};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::output::{JsonTournamentResult, format_tournament_csv, format_tournament_text};
use super::{BoardArgs, CliError, TournamentFormat, random_seed};

/// Options for the tournament command.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TournamentArgs {
    /// Oracle for each slot: pass, greedy or random
    #[arg(num_args = 2, value_names = ["FIRST", "SECOND"], default_values = ["greedy", "random"])]
    pub(crate) oracles: Vec<OracleKind>,

    /// Number of games to run
    #[arg(short, long, default_value_t = 1000)]
    pub(crate) games: u64,

    /// Starting seed (increments for each game)
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Parallel threads (default: CPU count)
    #[arg(short = 'j', long)]
    pub(crate) threads: Option<usize>,

    #[command(flatten)]
    pub(crate) board: BoardArgs,

    /// Keep each oracle on the same faction in every game
    #[arg(long)]
    pub(crate) no_swap: bool,

    /// Output format: text, json, or csv
    #[arg(short, long, default_value = "text")]
    pub(crate) format: TournamentFormat,

    /// Show progress bar
    #[arg(short, long)]
    pub(crate) progress: bool,
}

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the tournament cannot run.
pub(crate) fn execute(args: &TournamentArgs) -> Result<(), CliError> {
    let [first, second] = args.oracles[..] else {
        return Err(CliError::new("exactly two oracles are required"));
    };
    let names = vec![first.to_string(), second.to_string()];

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = args.seed.unwrap_or_else(random_seed);
    let config = TournamentConfig {
        max_turns: args.board.turns,
        visibility_radius: args.board.radius,
        scenario: args.board.map.clone(),
        map: args.board.map_config(),
        victory: args.board.victory(),
        swap_sides: !args.no_swap,
    };

    // Progress bar
    let pb = if args.progress {
        let pb = ProgressBar::new(args.games);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})",
            )
            .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let on_game = || {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    };
    let stats = run_tournament(base_seed, args.games, [first, second], &config, &on_game)?;

    if let Some(pb) = &pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    info!(
        base_seed,
        games = stats.games_played,
        failed = stats.games_failed,
        secs = duration.as_secs_f64(),
        "tournament finished"
    );

    // Output based on format
    match args.format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&stats, &names));
            println!();
            println!(
                "Seeds: {base_seed}..{}",
                base_seed.wrapping_add(args.games.saturating_sub(1))
            );
            println!(
                "Duration: {:.2}s ({:.0} games/sec)",
                duration.as_secs_f64(),
                games_per_sec(stats.games_played, duration)
            );
        }
        TournamentFormat::Json => {
            let json_result = JsonTournamentResult::from_stats(&stats, &names, duration);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        TournamentFormat::Csv => {
            print!("{}", format_tournament_csv(&stats, &names));
        }
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn games_per_sec(games: u64, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs > 0.0 { games as f64 / secs } else { 0.0 }
}
