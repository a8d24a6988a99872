//! Turn orchestration.
//!
//! The referee owns the authoritative [`GameState`] and both oracles. Each
//! turn it:
//! 1. projects a fog-of-war view per faction,
//! 2. queries both oracles in parallel (joined before anything else happens),
//! 3. validates each answer, falling back to all-pass on failure,
//! 4. merges the two order sets and resolves them in one atomic step,
//! 5. advances the turn counter and evaluates victory.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::error::ResolutionError;
use crate::game::{
    ActionMap, DEFAULT_VISIBILITY_RADIUS, FactionId, FactionView, GameState, TurnEvents, Unit,
    UnitId, ValidatedOrders, project_view, resolve_turn, validate_orders,
};
use crate::oracle::Oracle;

/// Default turn cap.
pub const DEFAULT_MAX_TURNS: u32 = 50;

/// Default deadline for one oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the referee is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting to query the oracles.
    AwaitingOrders,
    /// Sanitizing oracle output.
    Validating,
    /// Applying the merged orders.
    Resolving,
    /// Looking for a winner.
    CheckingVictory,
    /// The game is over.
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingOrders => "awaiting orders",
            Phase::Validating => "validating",
            Phase::Resolving => "resolving",
            Phase::CheckingVictory => "checking victory",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Optional victory conditions on top of elimination and the turn cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryRules {
    /// A living unit standing on the enemy headquarters wins the game.
    pub hq_capture: bool,
}

/// Referee settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefereeConfig {
    /// Turn cap; reaching it without a winner is a draw.
    pub max_turns: u32,
    /// Fog-of-war sight range.
    pub visibility_radius: u16,
    /// Answers arriving later than this are discarded as all-pass.
    ///
    /// Checked once the oracle returns: a call is never interrupted, so an
    /// oracle that never returns blocks the turn. Oracles doing I/O must
    /// bound their own calls, as the LLM oracle does.
    pub oracle_timeout: Duration,
    /// Extra victory conditions.
    pub victory: VictoryRules,
    /// Seed recorded with the result for reproducibility.
    pub seed: u64,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            victory: VictoryRules::default(),
            seed: 0,
        }
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// One faction lost all its units.
    Elimination,
    /// Both factions lost all their units on the same turn.
    MutualElimination,
    /// The turn cap was reached.
    TurnLimit,
    /// A headquarters was occupied.
    HqCapture,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndReason::Elimination => "elimination",
            EndReason::MutualElimination => "mutual elimination",
            EndReason::TurnLimit => "turn limit",
            EndReason::HqCapture => "headquarters capture",
        };
        f.write_str(name)
    }
}

/// Winner (if any) and reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// The winning faction, `None` for a draw or stalemate.
    pub winner: Option<FactionId>,
    /// Why the game ended.
    pub reason: EndReason,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.winner, self.reason) {
            (Some(w), reason) => write!(f, "{w} wins by {reason}"),
            (None, EndReason::TurnLimit) => f.write_str("draw (turn limit reached)"),
            (None, reason) => write!(f, "stalemate ({reason})"),
        }
    }
}

/// One faction's contribution to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionOrders {
    /// Faction.
    pub faction: FactionId,
    /// Oracle display name.
    pub oracle: String,
    /// Sanitized orders and the validation findings.
    pub orders: ValidatedOrders,
    /// Oracle failure that forced an all-pass turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_error: Option<String>,
    /// Wall-clock time spent in the oracle.
    pub elapsed_ms: u64,
}

impl FactionOrders {
    /// Spectator-facing validation report, if anything was defaulted.
    #[must_use]
    pub fn report(&self) -> Option<String> {
        self.orders.report(&self.oracle)
    }
}

/// Everything that happened in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// The turn number (1-based).
    pub turn: u32,
    /// Factions in this turn's priority order.
    pub order: [FactionId; 2],
    /// Per-faction orders, in priority order.
    pub factions: Vec<FactionOrders>,
    /// Resolution events.
    pub events: TurnEvents,
    /// All units after the turn, dead ones included.
    pub units: Vec<Unit>,
    /// Set when this turn ended the game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winner and reason.
    pub outcome: GameOutcome,
    /// Completed turns.
    pub turns: u32,
    /// Living units per faction at the end.
    pub survivors: BTreeMap<FactionId, usize>,
    /// Seed the game was configured with.
    pub seed: u64,
}

impl GameResult {
    /// Whether `faction` ended the game without living units.
    #[must_use]
    pub fn is_defeated(&self, faction: &FactionId) -> bool {
        self.survivors.get(faction).copied().unwrap_or(0) == 0
    }
}

/// Read-only consumer of turn reports.
pub trait TurnObserver {
    /// Called after every resolved turn.
    fn on_turn(&mut self, state: &GameState, report: &TurnReport);

    /// Called once when the game ends.
    fn on_game_end(&mut self, _state: &GameState, _result: &GameResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TurnObserver for NullObserver {
    fn on_turn(&mut self, _state: &GameState, _report: &TurnReport) {}
}

/// Fatal referee errors.
#[derive(Debug, Error)]
pub enum RefereeError {
    /// Exactly two oracles are required.
    #[error("referee requires exactly 2 oracles, got {0}")]
    AgentCount(usize),
    /// An oracle commands a faction that is not playing.
    #[error("oracle commands unknown faction '{0}'")]
    UnknownFaction(FactionId),
    /// Both oracles command the same faction.
    #[error("two oracles command faction '{0}'")]
    DuplicateFaction(FactionId),
    /// Both order sets contained the same unit.
    #[error("unit '{0}' ordered by both factions")]
    MergeConflict(UnitId),
    /// The resolution engine failed.
    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
    /// `play_turn` was called after the game ended.
    #[error("game is already over")]
    GameOver,
}

/// The turn orchestrator.
pub struct Referee {
    state: GameState,
    agents: [Box<dyn Oracle>; 2],
    config: RefereeConfig,
    phase: Phase,
    outcome: Option<GameOutcome>,
}

impl fmt::Debug for Referee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Referee")
            .field("turn", &self.state.turn())
            .field("agents", &[self.agents[0].name(), self.agents[1].name()])
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Referee {
    /// Create a referee for `state` with one oracle per faction.
    ///
    /// Oracles may be supplied in any order; they are matched to the state's
    /// factions by [`Oracle::faction`].
    pub fn new(
        state: GameState,
        agents: Vec<Box<dyn Oracle>>,
        config: RefereeConfig,
    ) -> Result<Self, RefereeError> {
        let count = agents.len();
        let [first, second]: [Box<dyn Oracle>; 2] =
            agents.try_into().map_err(|_| RefereeError::AgentCount(count))?;

        for agent in [&first, &second] {
            if !state.factions().contains(agent.faction()) {
                return Err(RefereeError::UnknownFaction(agent.faction().clone()));
            }
        }
        if first.faction() == second.faction() {
            return Err(RefereeError::DuplicateFaction(first.faction().clone()));
        }

        let agents = if first.faction() == &state.factions()[0] {
            [first, second]
        } else {
            [second, first]
        };

        Ok(Self {
            state,
            agents,
            config,
            phase: Phase::AwaitingOrders,
            outcome: None,
        })
    }

    /// The authoritative game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &RefereeConfig {
        &self.config
    }

    /// The outcome, once the game has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Display name of the oracle commanding `faction`.
    #[must_use]
    pub fn oracle_name(&self, faction: &FactionId) -> Option<&str> {
        self.agents
            .iter()
            .find(|a| a.faction() == faction)
            .map(|a| a.name())
    }

    /// Agent indices in priority order for the upcoming turn.
    ///
    /// Odd turns give faction 0 priority, even turns faction 1.
    #[must_use]
    pub const fn turn_order(&self) -> [usize; 2] {
        if (self.state.turn() + 1) % 2 == 1 { [0, 1] } else { [1, 0] }
    }

    fn set_phase(&mut self, phase: Phase) {
        trace!(turn = self.state.turn() + 1, %phase, "phase change");
        self.phase = phase;
    }

    /// Play one full turn.
    pub fn play_turn(&mut self) -> Result<TurnReport, RefereeError> {
        if self.phase == Phase::Terminated {
            return Err(RefereeError::GameOver);
        }
        let turn = self.state.turn() + 1;
        let order = self.turn_order();
        debug!(turn, first = %self.state.factions()[order[0]], "turn start");

        self.set_phase(Phase::AwaitingOrders);
        let radius = self.config.visibility_radius;
        let timeout = self.config.oracle_timeout;
        let [view_a, view_b] = self
            .state
            .factions()
            .clone()
            .map(|f| project_view(&self.state, &f, radius));
        let [agent_a, agent_b] = &mut self.agents;
        let (answer_a, answer_b) = rayon::join(
            || consult(agent_a.as_mut(), view_a, timeout),
            || consult(agent_b.as_mut(), view_b, timeout),
        );
        let mut answers = [Some(answer_a), Some(answer_b)];

        self.set_phase(Phase::Validating);
        let mut factions = Vec::with_capacity(2);
        for idx in order {
            let Some(answer) = answers[idx].take() else {
                continue;
            };
            let faction = self.state.factions()[idx].clone();
            let orders = match &answer.raw {
                Some(raw) => validate_orders(&self.state, &faction, raw),
                None => ValidatedOrders::all_pass(&self.state, &faction),
            };
            let report = FactionOrders {
                faction,
                oracle: self.agents[idx].name().to_string(),
                orders,
                oracle_error: answer.error,
                elapsed_ms: u64::try_from(answer.elapsed.as_millis()).unwrap_or(u64::MAX),
            };
            if let Some(text) = report.report() {
                warn!(turn, "{text}");
            }
            factions.push(report);
        }

        let mut merged = ActionMap::new();
        for report in &factions {
            for (id, action) in &report.orders.actions {
                if merged.insert(id.clone(), action.clone()).is_some() {
                    self.set_phase(Phase::Terminated);
                    return Err(RefereeError::MergeConflict(id.clone()));
                }
            }
        }

        self.set_phase(Phase::Resolving);
        let events = match resolve_turn(&mut self.state, &merged) {
            Ok(events) => events,
            Err(e) => {
                self.set_phase(Phase::Terminated);
                return Err(e.into());
            }
        };
        self.state.advance_turn();

        self.set_phase(Phase::CheckingVictory);
        self.outcome = self.evaluate_victory();
        if let Some(outcome) = &self.outcome {
            info!(turn, %outcome, "game over");
        }
        self.set_phase(if self.outcome.is_some() {
            Phase::Terminated
        } else {
            Phase::AwaitingOrders
        });

        let [first, second] = order;
        Ok(TurnReport {
            turn,
            order: [
                self.state.factions()[first].clone(),
                self.state.factions()[second].clone(),
            ],
            factions,
            events,
            units: self.state.units().cloned().collect(),
            outcome: self.outcome.clone(),
        })
    }

    /// Play until the game ends, feeding every report to `observer`.
    pub fn run(&mut self, observer: &mut dyn TurnObserver) -> Result<GameResult, RefereeError> {
        if self.outcome.is_none() && self.state.turn() >= self.config.max_turns {
            self.outcome = Some(GameOutcome {
                winner: None,
                reason: EndReason::TurnLimit,
            });
            self.set_phase(Phase::Terminated);
        }

        while self.outcome.is_none() {
            let report = self.play_turn()?;
            observer.on_turn(&self.state, &report);
        }

        let result = self.result();
        if let Some(result) = &result {
            observer.on_game_end(&self.state, result);
        }
        result.ok_or(RefereeError::GameOver)
    }

    /// The final result, once the game has ended.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        let outcome = self.outcome.clone()?;
        let survivors = self
            .state
            .factions()
            .iter()
            .map(|f| (f.clone(), self.state.living_units_of(f).count()))
            .collect();
        Some(GameResult {
            outcome,
            turns: self.state.turn(),
            survivors,
            seed: self.config.seed,
        })
    }

    fn evaluate_victory(&self) -> Option<GameOutcome> {
        let [a, b] = self.state.factions();
        match (self.state.is_defeated(a), self.state.is_defeated(b)) {
            (true, true) => {
                return Some(GameOutcome {
                    winner: None,
                    reason: EndReason::MutualElimination,
                });
            }
            (true, false) => return Some(winner(b, EndReason::Elimination)),
            (false, true) => return Some(winner(a, EndReason::Elimination)),
            (false, false) => {}
        }

        if self.config.victory.hq_capture {
            match (self.captures(a, b), self.captures(b, a)) {
                (true, true) => {
                    return Some(GameOutcome {
                        winner: None,
                        reason: EndReason::HqCapture,
                    });
                }
                (true, false) => return Some(winner(a, EndReason::HqCapture)),
                (false, true) => return Some(winner(b, EndReason::HqCapture)),
                (false, false) => {}
            }
        }

        (self.state.turn() >= self.config.max_turns).then_some(GameOutcome {
            winner: None,
            reason: EndReason::TurnLimit,
        })
    }

    /// Whether a living unit of `attacker` stands on the headquarters of `defender`.
    fn captures(&self, attacker: &FactionId, defender: &FactionId) -> bool {
        self.state
            .headquarters(defender)
            .and_then(|hq| self.state.unit_at(hq))
            .is_some_and(|u| u.belongs_to(attacker))
    }
}

fn winner(faction: &FactionId, reason: EndReason) -> GameOutcome {
    GameOutcome {
        winner: Some(faction.clone()),
        reason,
    }
}

/// One oracle's answer, or the reason it has none.
struct Answer {
    raw: Option<Value>,
    error: Option<String>,
    elapsed: Duration,
}

/// Query one oracle, enforcing the deadline after the fact.
fn consult(oracle: &mut dyn Oracle, view: FactionView, timeout: Duration) -> Answer {
    let start = Instant::now();
    let result = oracle.decide(view);
    let elapsed = start.elapsed();

    match result {
        Ok(raw) if elapsed <= timeout => Answer {
            raw: Some(raw),
            error: None,
            elapsed,
        },
        Ok(_) => {
            warn!(oracle = oracle.name(), ?elapsed, ?timeout, "oracle missed deadline, passing");
            Answer {
                raw: None,
                error: Some(format!("deadline of {timeout:?} exceeded after {elapsed:?}")),
                elapsed,
            }
        }
        Err(e) => {
            warn!(oracle = oracle.name(), error = %e, "oracle failed, passing");
            Answer {
                raw: None,
                error: Some(e.to_string()),
                elapsed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::game::{Board, Coord, TerrainKind, Tile};
    use crate::oracle::{OracleError, PassOracle, ScriptedOracle};

    fn state() -> GameState {
        let board = Board::generate(6, 6, |c| Tile::new(c, "t", TerrainKind::Rural)).unwrap();
        let hq = BTreeMap::from([
            (FactionId::new("A"), Coord::new(0, 0)),
            (FactionId::new("B"), Coord::new(5, 5)),
        ]);
        let units = vec![
            Unit::new("a1", "A", Coord::new(2, 2), 10, 5),
            Unit::new("b1", "B", Coord::new(3, 2), 10, 5),
        ];
        GameState::new(board, vec!["A".into(), "B".into()], hq, units).unwrap()
    }

    fn pass(f: &str) -> Box<dyn Oracle> {
        Box::new(PassOracle::new(f.into()))
    }

    #[test]
    fn test_agent_validation() {
        assert!(matches!(
            Referee::new(state(), vec![pass("A")], RefereeConfig::default()),
            Err(RefereeError::AgentCount(1))
        ));
        assert!(matches!(
            Referee::new(state(), vec![pass("A"), pass("C")], RefereeConfig::default()),
            Err(RefereeError::UnknownFaction(_))
        ));
        assert!(matches!(
            Referee::new(state(), vec![pass("A"), pass("A")], RefereeConfig::default()),
            Err(RefereeError::DuplicateFaction(_))
        ));
    }

    #[test]
    fn test_agents_matched_by_faction() {
        let referee =
            Referee::new(state(), vec![pass("B"), pass("A")], RefereeConfig::default()).unwrap();
        assert_eq!(referee.oracle_name(&"A".into()), Some("A (pass)"));
        assert_eq!(referee.turn_order(), [0, 1]);
    }

    #[test]
    fn test_turn_order_alternates() {
        let mut referee =
            Referee::new(state(), vec![pass("A"), pass("B")], RefereeConfig::default()).unwrap();
        let first = referee.play_turn().unwrap();
        let second = referee.play_turn().unwrap();
        assert_eq!(first.order, [FactionId::new("A"), FactionId::new("B")]);
        assert_eq!(second.order, [FactionId::new("B"), FactionId::new("A")]);
        assert_eq!(second.factions[0].faction.as_str(), "B");
    }

    #[test]
    fn test_oracle_error_falls_back_to_pass() {
        let failing = ScriptedOracle::new("A".into(), vec![Err("boom".to_string())]);
        let mut referee = Referee::new(
            state(),
            vec![Box::new(failing), pass("B")],
            RefereeConfig::default(),
        )
        .unwrap();
        let report = referee.play_turn().unwrap();
        let a = &report.factions[0];
        assert_eq!(a.oracle_error.as_deref(), Some("boom"));
        assert!(a.orders.rejected.is_empty());
        assert_eq!(a.orders.actions.len(), 1);
        assert_eq!(report.turn, 1);
        assert_eq!(referee.state().turn(), 1);
    }

    /// Answers correctly, but only after a delay.
    struct Slow {
        faction: FactionId,
        delay: Duration,
    }

    impl Oracle for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn faction(&self) -> &FactionId {
            &self.faction
        }

        fn decide(&mut self, _view: FactionView) -> Result<Value, OracleError> {
            std::thread::sleep(self.delay);
            Ok(json!({"a1": {"action": "attack", "target_unit_id": "b1"}}))
        }
    }

    #[test]
    fn test_late_answer_is_discarded() {
        let slow = Slow {
            faction: "A".into(),
            delay: Duration::from_millis(50),
        };
        let config = RefereeConfig {
            oracle_timeout: Duration::from_millis(5),
            ..RefereeConfig::default()
        };
        let mut referee = Referee::new(state(), vec![Box::new(slow), pass("B")], config).unwrap();
        let report = referee.play_turn().unwrap();

        // The call ran to completion, then its answer was thrown away.
        let a = &report.factions[0];
        assert!(a.elapsed_ms >= 50);
        assert!(a.oracle_error.as_deref().is_some_and(|e| e.contains("deadline")));
        assert_eq!(referee.state().unit("b1").unwrap().hp, 10);
    }

    #[test]
    fn test_elimination_ends_game() {
        let attacker = ScriptedOracle::new(
            "A".into(),
            vec![
                Ok(json!({"a1": {"action": "attack", "target_unit_id": "b1"}})),
                Ok(json!({"a1": {"action": "attack", "target_unit_id": "b1"}})),
            ],
        );
        let mut referee = Referee::new(
            state(),
            vec![Box::new(attacker), pass("B")],
            RefereeConfig::default(),
        )
        .unwrap();
        let result = referee.run(&mut NullObserver).unwrap();
        assert_eq!(result.outcome.winner, Some(FactionId::new("A")));
        assert_eq!(result.outcome.reason, EndReason::Elimination);
        assert_eq!(result.turns, 2);
        assert_eq!(referee.phase(), Phase::Terminated);
        assert!(matches!(referee.play_turn(), Err(RefereeError::GameOver)));
    }

    #[test]
    fn test_turn_cap_draw() {
        let config = RefereeConfig {
            max_turns: 3,
            ..RefereeConfig::default()
        };
        let mut referee = Referee::new(state(), vec![pass("A"), pass("B")], config).unwrap();
        let result = referee.run(&mut NullObserver).unwrap();
        assert_eq!(result.outcome.winner, None);
        assert_eq!(result.outcome.reason, EndReason::TurnLimit);
        assert_eq!(result.turns, 3);
        assert_eq!(referee.state().turn(), 3);
    }

    #[test]
    fn test_zero_turn_cap() {
        let config = RefereeConfig {
            max_turns: 0,
            ..RefereeConfig::default()
        };
        let mut referee = Referee::new(state(), vec![pass("A"), pass("B")], config).unwrap();
        let result = referee.run(&mut NullObserver).unwrap();
        assert_eq!(result.turns, 0);
        assert_eq!(result.outcome.reason, EndReason::TurnLimit);
    }

    #[test]
    fn test_hq_capture_is_opt_in() {
        let runner = ScriptedOracle::new(
            "B".into(),
            vec![Ok(json!({"b1": {"action": "move", "direction": "N"}}))],
        );
        let board = Board::generate(6, 6, |c| Tile::new(c, "t", TerrainKind::Rural)).unwrap();
        let hq = BTreeMap::from([
            (FactionId::new("A"), Coord::new(3, 1)),
            (FactionId::new("B"), Coord::new(5, 5)),
        ]);
        let units = vec![
            Unit::new("a1", "A", Coord::new(0, 0), 10, 5),
            Unit::new("b1", "B", Coord::new(3, 2), 10, 5),
        ];
        let s = GameState::new(board, vec!["A".into(), "B".into()], hq, units).unwrap();
        let config = RefereeConfig {
            victory: VictoryRules { hq_capture: true },
            ..RefereeConfig::default()
        };

        let mut referee =
            Referee::new(s.clone(), vec![pass("A"), Box::new(runner.clone())], config).unwrap();
        referee.play_turn().unwrap();
        let outcome = referee.outcome().unwrap();
        assert_eq!(outcome.winner, Some(FactionId::new("B")));
        assert_eq!(outcome.reason, EndReason::HqCapture);

        let mut referee =
            Referee::new(s, vec![pass("A"), Box::new(runner)], RefereeConfig::default()).unwrap();
        referee.play_turn().unwrap();
        assert!(referee.outcome().is_none());
    }
}
