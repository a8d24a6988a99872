//! Output formatting utilities for CLI.

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use std::collections::BTreeMap;
use std::time::Duration;

use clash::game::{FactionId, GameState};
use clash::referee::{EndReason, GameResult};
use clash::tournament::TournamentStats;
use serde::Serialize;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Random seed used.
    seed: u64,
    /// Winning faction (null if none).
    winner: Option<&'a FactionId>,
    /// Why the game ended.
    reason: EndReason,
    /// Completed turns.
    turns: u32,
    /// Wall-clock duration in milliseconds.
    duration_ms: u128,
    /// Per-faction results.
    factions: Vec<JsonFactionResult<'a>>,
}

/// JSON-serializable faction result.
#[derive(Debug, Serialize)]
pub(super) struct JsonFactionResult<'a> {
    /// Faction name.
    faction: &'a FactionId,
    /// Oracle display name.
    oracle: &'a str,
    /// Living units at the end.
    survivors: usize,
    /// Hit points left across living units.
    hp: i32,
}

impl<'a> JsonGameResult<'a> {
    /// Create from a finished game.
    pub(super) fn new(
        result: &'a GameResult,
        state: &'a GameState,
        oracles: &'a BTreeMap<FactionId, String>,
        duration: Duration,
    ) -> Self {
        Self {
            seed: result.seed,
            winner: result.outcome.winner.as_ref(),
            reason: result.outcome.reason,
            turns: result.turns,
            duration_ms: duration.as_millis(),
            factions: state
                .factions()
                .iter()
                .map(|faction| JsonFactionResult {
                    faction,
                    oracle: oracles.get(faction).map_or("unknown", String::as_str),
                    survivors: state.living_units_of(faction).count(),
                    hp: state
                        .living_units_of(faction)
                        .fold(0, |hp: i32, u| hp.saturating_add(u.hp)),
                })
                .collect(),
        }
    }
}

/// Format the final scoreboard.
pub(super) fn format_scoreboard(
    result: &GameResult,
    state: &GameState,
    oracles: &BTreeMap<FactionId, String>,
    duration: Duration,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    output.push_str(&format!("  Outcome: {}\n", result.outcome));
    output.push_str(&format!("  Turns: {}\n", result.turns));
    output.push_str(&format!("  Duration: {:.2}s\n\n", duration.as_secs_f64()));

    for faction in state.factions() {
        let oracle = oracles.get(faction).map_or("unknown", String::as_str);
        let alive = state.living_units_of(faction).count();
        if alive == 0 {
            output.push_str(&format!("  {faction}: DEFEATED ({oracle})\n"));
        } else {
            let hp = state
                .living_units_of(faction)
                .fold(0, |hp: i32, u| hp.saturating_add(u.hp));
            output.push_str(&format!(
                "  {faction}: ACTIVE, {alive} units, {hp} HP ({oracle})\n"
            ));
        }
    }

    output
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult<'a> {
    /// Total games finished.
    games_played: u64,
    /// Games aborted by an error.
    games_failed: u64,
    /// Per-oracle statistics.
    oracles: Vec<JsonTournamentOracle<'a>>,
    /// Number of draws.
    draws: u64,
    /// Draw rate (0.0-1.0).
    draw_rate: f64,
    /// Average game length in turns.
    avg_turns: f64,
    /// Finished games per end reason.
    reasons: &'a BTreeMap<EndReason, u64>,
    /// Wall-clock duration in seconds.
    duration_secs: f64,
}

/// JSON-serializable per-oracle tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentOracle<'a> {
    /// Oracle slot (1-based).
    slot: usize,
    /// Oracle kind.
    oracle: &'a str,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average surviving units.
    avg_survivors: f64,
}

impl<'a> JsonTournamentResult<'a> {
    /// Create from stats and oracle names.
    pub(super) fn from_stats(
        stats: &'a TournamentStats,
        names: &'a [String],
        duration: Duration,
    ) -> Self {
        let oracles = names
            .iter()
            .enumerate()
            .map(|(i, name)| JsonTournamentOracle {
                slot: i + 1,
                oracle: name,
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                avg_survivors: stats.avg_survivors(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            games_failed: stats.games_failed,
            oracles,
            draws: stats.draws,
            draw_rate: stats.draw_rate(),
            avg_turns: stats.avg_turns(),
            reasons: &stats.reasons,
            duration_secs: duration.as_secs_f64(),
        }
    }
}

/// Format tournament stats as human-readable text.
pub(super) fn format_tournament_text(stats: &TournamentStats, names: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Tournament Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for (i, name) in names.iter().enumerate() {
        let wins = stats.wins.get(i).copied().unwrap_or(0);
        let rate = stats.win_rate(i) * 100.0;
        output.push_str(&format!("  Oracle {} ({name}): {rate:.1}% ({wins} wins)\n", i + 1));
    }
    output.push_str(&format!(
        "  Draws: {} ({:.1}%)\n\n",
        stats.draws,
        stats.draw_rate() * 100.0
    ));

    output.push_str("Average Survivors:\n");
    for (i, name) in names.iter().enumerate() {
        output.push_str(&format!(
            "  Oracle {} ({name}): {:.2} units\n",
            i + 1,
            stats.avg_survivors(i)
        ));
    }

    if !stats.reasons.is_empty() {
        output.push_str("\nEnd Reasons:\n");
        for (reason, count) in &stats.reasons {
            output.push_str(&format!("  {reason}: {count}\n"));
        }
    }

    output.push_str(&format!("\nAverage Game Length: {:.1} turns\n", stats.avg_turns()));
    if stats.games_failed > 0 {
        output.push_str(&format!("Failed Games: {}\n", stats.games_failed));
    }

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats, names: &[String]) -> String {
    let mut output = String::new();

    // Header
    output.push_str("slot,oracle,wins,win_rate,draws,avg_survivors,avg_turns\n");

    // Data rows
    for (i, name) in names.iter().enumerate() {
        output.push_str(&format!(
            "{},{},{},{:.4},{},{:.2},{:.2}\n",
            i + 1,
            name,
            stats.wins.get(i).copied().unwrap_or(0),
            stats.win_rate(i),
            stats.draws,
            stats.avg_survivors(i),
            stats.avg_turns()
        ));
    }

    output
}
