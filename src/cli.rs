//! CLI command implementations for Harford Clash.

pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod tournament;
pub(crate) mod validate;
pub(crate) mod watch;

mod output;
mod tui;

use std::error::Error;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Args, ValueEnum};
use clash::game::DEFAULT_VISIBILITY_RADIUS;
use clash::oracle::{LlmConfig, OracleKind, build_agents};
use clash::referee::{DEFAULT_MAX_TURNS, Referee, RefereeConfig, VictoryRules};
use clash::scenario::{MapGenConfig, Scenario, ScenarioError};

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable spectator output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `replay` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReplayFormat {
    /// Interactive TUI.
    Tui,
    /// Structured text, one block per turn.
    Text,
    /// Colored board, one per turn.
    Ascii,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Board and rule options shared by `run`, `watch` and `tournament`.
#[derive(Debug, Clone, Args)]
pub(crate) struct BoardArgs {
    /// Map: harford, generated, or a path to a JSON map file
    #[arg(short, long, default_value = "harford")]
    pub(crate) map: Scenario,

    /// Maximum turns before the game is drawn
    #[arg(short, long, default_value_t = DEFAULT_MAX_TURNS)]
    pub(crate) turns: u32,

    /// Fog-of-war sight range in tiles
    #[arg(short, long, default_value_t = DEFAULT_VISIBILITY_RADIUS)]
    pub(crate) radius: u16,

    /// End the game when a unit steps onto the enemy headquarters
    #[arg(long)]
    pub(crate) hq_capture: bool,

    /// Width of generated maps
    #[arg(long, default_value_t = 10)]
    pub(crate) width: u16,

    /// Height of generated maps
    #[arg(long, default_value_t = 10)]
    pub(crate) height: u16,

    /// Units per faction on generated maps
    #[arg(long, default_value_t = 3)]
    pub(crate) units: usize,
}

impl BoardArgs {
    /// Shape of generated maps.
    pub(crate) fn map_config(&self) -> MapGenConfig {
        MapGenConfig {
            width: self.width,
            height: self.height,
            units_per_faction: self.units,
            ..MapGenConfig::default()
        }
    }

    /// Extra victory conditions.
    pub(crate) fn victory(&self) -> VictoryRules {
        VictoryRules {
            hq_capture: self.hq_capture,
        }
    }
}

/// Options for a single game with live oracles.
#[derive(Debug, Clone, Args)]
pub(crate) struct GameArgs {
    /// Oracle for each faction: pass, greedy, random or llm
    #[arg(num_args = 2, value_names = ["FIRST", "SECOND"], default_values = ["greedy", "greedy"])]
    pub(crate) oracles: Vec<OracleKind>,

    /// Random seed (default: random)
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    #[command(flatten)]
    pub(crate) board: BoardArgs,

    /// Seconds to wait for an oracle before its faction passes
    #[arg(long, default_value_t = 60)]
    pub(crate) timeout: u64,

    /// LLM model (overrides OPENAI_MODEL)
    #[arg(long)]
    pub(crate) model: Option<String>,

    /// LLM sampling temperature (overrides OPENAI_TEMP)
    #[arg(long)]
    pub(crate) temperature: Option<f32>,

    /// LLM API root (overrides OPENAI_BASE_URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

impl GameArgs {
    /// LLM settings: environment first, then command-line overrides.
    pub(crate) fn llm_config(&self) -> LlmConfig {
        let mut config = LlmConfig::from_env();
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.timeout = Duration::from_secs(self.timeout);
        config
    }

    /// Build the referee for one game.
    pub(crate) fn referee(&self, seed: u64) -> Result<Referee, CliError> {
        let [first, second] = self.oracles[..] else {
            return Err(CliError::new("exactly two oracles are required"));
        };
        let state = self.board.map.build(seed, &self.board.map_config())?;
        let agents = build_agents(state.factions(), [first, second], seed, &self.llm_config());
        let config = RefereeConfig {
            max_turns: self.board.turns,
            visibility_radius: self.board.radius,
            oracle_timeout: Duration::from_secs(self.timeout),
            victory: self.board.victory(),
            seed,
        };
        Ok(Referee::new(state, agents, config)?)
    }
}

/// Seed derived from the clock, for runs without `--seed`.
pub(crate) fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().rotate_left(32) ^ u64::from(d.subsec_nanos()))
        .unwrap_or(42)
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

impl From<clash::tournament::TournamentError> for CliError {
    fn from(e: clash::tournament::TournamentError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<clash::replay::ReplayError> for CliError {
    fn from(e: clash::replay::ReplayError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<clash::referee::RefereeError> for CliError {
    fn from(e: clash::referee::RefereeError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ScenarioError> for CliError {
    fn from(e: ScenarioError) -> Self {
        Self::new(format!("cannot build map: {e}"))
    }
}
