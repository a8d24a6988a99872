//! Tournament runner.
//!
//! Provides a pure function interface: `(seed, oracle kinds) -> GameResult`
//!
//! The tournament runner handles:
//! - Deterministic scenario construction per seed
//! - Seeding the random oracles from the game seed
//! - Running many games in parallel with rayon
//! - Aggregating wins, draws and game lengths

use std::collections::BTreeMap;
use std::time::Duration;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::game::{DEFAULT_VISIBILITY_RADIUS, FactionId};
use crate::oracle::{LlmConfig, OracleKind, build_agents};
use crate::referee::{
    DEFAULT_MAX_TURNS, EndReason, GameResult, NullObserver, Referee, RefereeConfig, RefereeError,
    VictoryRules,
};
use crate::scenario::{MapGenConfig, Scenario, ScenarioError};

/// Configuration for the tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Maximum turns before a game is drawn.
    pub max_turns: u32,
    /// Fog-of-war sight range.
    pub visibility_radius: u16,
    /// Where each game's board comes from.
    pub scenario: Scenario,
    /// Shape of generated boards.
    pub map: MapGenConfig,
    /// Extra victory conditions.
    pub victory: VictoryRules,
    /// Swap which oracle commands which faction on every odd game.
    pub swap_sides: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            scenario: Scenario::Generated,
            map: MapGenConfig::default(),
            victory: VictoryRules::default(),
            swap_sides: true,
        }
    }
}

/// Error type for tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// The oracle cannot be replayed from a seed.
    #[error("oracle '{0}' is not deterministic and cannot play in tournaments")]
    UnsupportedOracle(OracleKind),
    /// The scenario could not be built.
    #[error("scenario failed: {0}")]
    Scenario(#[from] ScenarioError),
    /// The referee aborted the game.
    #[error("game aborted: {0}")]
    Referee(#[from] RefereeError),
}

/// Play one game where `kinds[i]` commands faction `i`.
///
/// Everything random (board and random oracles) derives from `seed`, so the
/// same inputs always produce the same result.
pub fn run_game(
    seed: u64,
    kinds: [OracleKind; 2],
    config: &TournamentConfig,
) -> Result<GameResult, TournamentError> {
    play(seed, kinds, config).map(|(result, _)| result)
}

/// Play one game, also returning the factions in canonical order.
fn play(
    seed: u64,
    kinds: [OracleKind; 2],
    config: &TournamentConfig,
) -> Result<(GameResult, [FactionId; 2]), TournamentError> {
    if let Some(kind) = kinds.iter().find(|k| **k == OracleKind::Llm) {
        return Err(TournamentError::UnsupportedOracle(*kind));
    }

    let state = config.scenario.build(seed, &config.map)?;
    let factions = state.factions().clone();
    let agents = build_agents(&factions, kinds, seed, &LlmConfig::default());

    // Wall-clock deadlines would make results depend on machine load.
    let referee_config = RefereeConfig {
        max_turns: config.max_turns,
        visibility_radius: config.visibility_radius,
        oracle_timeout: Duration::MAX,
        victory: config.victory,
        seed,
    };
    let mut referee = Referee::new(state, agents, referee_config)?;
    let result = referee.run(&mut NullObserver)?;
    debug!(seed, turns = result.turns, outcome = %result.outcome, "tournament game finished");
    Ok((result, factions))
}

/// Aggregated tournament statistics, indexed by oracle slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TournamentStats {
    /// Games that finished.
    pub games_played: u64,
    /// Games aborted by an error.
    pub games_failed: u64,
    /// Wins per oracle slot.
    pub wins: [u64; 2],
    /// Games without a winner.
    pub draws: u64,
    /// Finished games per end reason.
    pub reasons: BTreeMap<EndReason, u64>,
    /// Turns across all finished games.
    pub total_turns: u64,
    /// Surviving units per oracle slot, summed over finished games.
    pub survivors: [u64; 2],
}

impl TournamentStats {
    /// Add a finished game. `factions[i]` is the faction oracle slot `i`
    /// commanded.
    pub fn add_result(&mut self, result: &GameResult, factions: &[FactionId; 2]) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns);
        *self.reasons.entry(result.outcome.reason).or_insert(0) += 1;

        match &result.outcome.winner {
            Some(winner) => {
                if let Some(slot) = factions.iter().position(|f| f == winner) {
                    self.wins[slot] += 1;
                }
            }
            None => self.draws += 1,
        }
        for (slot, faction) in factions.iter().enumerate() {
            let alive = result.survivors.get(faction).copied().unwrap_or(0);
            self.survivors[slot] += u64::try_from(alive).unwrap_or(u64::MAX);
        }
    }

    /// Record an aborted game.
    pub fn add_failure(&mut self) {
        self.games_failed += 1;
    }

    /// Merge another partial result into this one.
    pub fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.games_failed += other.games_failed;
        self.draws += other.draws;
        self.total_turns += other.total_turns;
        for (mine, theirs) in self.wins.iter_mut().zip(other.wins) {
            *mine += theirs;
        }
        for (mine, theirs) in self.survivors.iter_mut().zip(other.survivors) {
            *mine += theirs;
        }
        for (reason, count) in &other.reasons {
            *self.reasons.entry(*reason).or_insert(0) += count;
        }
    }

    /// Win rate of an oracle slot (0.0-1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(slot).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Draw rate (0.0-1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.draws as f64 / self.games_played as f64
    }

    /// Average game length in turns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }

    /// Average surviving units of an oracle slot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_survivors(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.survivors.get(slot).copied().unwrap_or(0) as f64 / self.games_played as f64
    }
}

/// Run `games` games in parallel, seeded `base_seed`, `base_seed + 1`, ...
///
/// `on_game` is called once per finished or failed game, from worker
/// threads.
pub fn run_tournament(
    base_seed: u64,
    games: u64,
    kinds: [OracleKind; 2],
    config: &TournamentConfig,
    on_game: &(dyn Fn() + Sync),
) -> Result<TournamentStats, TournamentError> {
    if let Some(kind) = kinds.iter().find(|k| **k == OracleKind::Llm) {
        return Err(TournamentError::UnsupportedOracle(*kind));
    }

    // Each thread accumulates into its own stats, merged at the end.
    let stats = (0..games)
        .into_par_iter()
        .fold(TournamentStats::default, |mut local, i| {
            let seed = base_seed.wrapping_add(i);
            let swapped = config.swap_sides && i % 2 == 1;
            let slot_kinds = if swapped { [kinds[1], kinds[0]] } else { kinds };

            match play(seed, slot_kinds, config) {
                Ok((result, [first, second])) => {
                    let by_slot = if swapped { [second, first] } else { [first, second] };
                    local.add_result(&result, &by_slot);
                }
                Err(e) => {
                    warn!(seed, error = %e, "tournament game failed");
                    local.add_failure();
                }
            }
            on_game();
            local
        })
        .reduce(TournamentStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    Ok(stats)
}
