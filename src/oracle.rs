//! Decision oracles.
//!
//! An oracle turns a faction's fog-of-war view into raw orders: a JSON
//! object mapping unit ids to action objects. The output is untrusted; the
//! referee validates it before anything reaches the game state.
//!
//! Implementations:
//! - [`PassOracle`]: always passes
//! - [`GreedyOracle`]: deterministic attack-or-advance bot
//! - [`RandomOracle`]: seeded random orders
//! - [`ScriptedOracle`]: replays a fixed queue of responses
//! - [`LlmOracle`]: OpenAI-compatible chat completions

mod greedy;
mod llm;
mod pass;
mod random;
mod scripted;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::game::{FactionId, FactionView};
use crate::rng::Rng;

pub use greedy::GreedyOracle;
pub use llm::{LlmConfig, LlmOracle};
pub use pass::PassOracle;
pub use random::RandomOracle;
pub use scripted::ScriptedOracle;

/// Failure of a single decision call. The referee falls back to all-pass.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The transport failed.
    #[error("oracle transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The remote service answered with an error status.
    #[error("oracle service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
    /// The answer could not be turned into JSON orders.
    #[error("malformed oracle response: {0}")]
    Malformed(String),
    /// Every retry failed.
    #[error("oracle gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Last error seen.
        last: String,
    },
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// A faction's decision maker.
///
/// `decide` receives an owned view and may do whatever it likes with it.
/// Implementations must be `Send` so both factions can be queried in
/// parallel.
pub trait Oracle: Send {
    /// Display name used in reports.
    fn name(&self) -> &str;

    /// Faction this oracle commands.
    fn faction(&self) -> &FactionId;

    /// Produce raw orders for the turn described by `view`.
    fn decide(&mut self, view: FactionView) -> Result<Value, OracleError>;
}

/// Built-in oracle kinds selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleKind {
    /// [`PassOracle`].
    Pass,
    /// [`GreedyOracle`].
    Greedy,
    /// [`RandomOracle`].
    Random,
    /// [`LlmOracle`].
    Llm,
}

impl OracleKind {
    /// Instantiate an oracle of this kind.
    ///
    /// `seed` feeds the random oracle; `llm` configures the LLM oracle.
    #[must_use]
    pub fn build(self, faction: FactionId, seed: u64, llm: &LlmConfig) -> Box<dyn Oracle> {
        match self {
            OracleKind::Pass => Box::new(PassOracle::new(faction)),
            OracleKind::Greedy => Box::new(GreedyOracle::new(faction)),
            OracleKind::Random => Box::new(RandomOracle::new(faction, seed)),
            OracleKind::Llm => Box::new(LlmOracle::new(faction, llm.clone())),
        }
    }
}

/// Build one oracle per faction, `kinds[i]` commanding `factions[i]`.
///
/// Random oracles get independent streams forked from `seed`, so a game is
/// reproducible from its seed alone.
#[must_use]
pub fn build_agents(
    factions: &[FactionId; 2],
    kinds: [OracleKind; 2],
    seed: u64,
    llm: &LlmConfig,
) -> Vec<Box<dyn Oracle>> {
    let mut rng = Rng::new(seed);
    factions
        .iter()
        .zip(kinds)
        .zip([1u64, 2])
        .map(|((faction, kind), salt)| {
            let oracle_seed = rng.fork(salt).next_u64();
            kind.build(faction.clone(), oracle_seed, llm)
        })
        .collect()
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(OracleKind::Pass),
            "greedy" => Ok(OracleKind::Greedy),
            "random" => Ok(OracleKind::Random),
            "llm" => Ok(OracleKind::Llm),
            other => Err(format!(
                "unknown oracle '{other}' (expected pass, greedy, random or llm)"
            )),
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OracleKind::Pass => "pass",
            OracleKind::Greedy => "greedy",
            OracleKind::Random => "random",
            OracleKind::Llm => "llm",
        };
        f.write_str(name)
    }
}
