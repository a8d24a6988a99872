//! Sanitizing untrusted oracle output into one action per living unit.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::{Action, ActionMap, FactionId, GameState, UnitId};

/// Marker reported when the oracle output is not a JSON object at all.
pub const NON_MAPPING_ROOT: &str = "<non-mapping root object>";

/// Why a unit's entry was replaced by `pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The oracle output had no entry for this unit.
    Missing,
    /// The entry was not a JSON object.
    NotAnObject,
    /// The `action` field was absent or not a string.
    MissingKind,
    /// The `action` field named an unknown kind.
    UnknownKind,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::Missing => "missing",
            RejectReason::NotAnObject => "not an object",
            RejectReason::MissingKind => "no action kind",
            RejectReason::UnknownKind => "unknown action kind",
        };
        f.write_str(text)
    }
}

/// A defaulted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Unit whose action was replaced.
    pub unit_id: UnitId,
    /// What was wrong with it.
    pub reason: RejectReason,
}

/// Output of [`validate_orders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedOrders {
    /// Faction the orders belong to.
    pub faction: FactionId,
    /// Exactly one action per living unit of `faction`.
    #[serde(skip)]
    pub actions: ActionMap,
    /// Whether the raw output was not a JSON object.
    pub malformed_root: bool,
    /// Units whose entries were invalid or absent and defaulted to `pass`.
    pub rejected: Vec<Rejection>,
    /// Keys that did not name a living unit of `faction`.
    pub ignored: Vec<String>,
}

impl ValidatedOrders {
    /// Orders where every living unit of `faction` passes.
    #[must_use]
    pub fn all_pass(state: &GameState, faction: &FactionId) -> Self {
        Self {
            faction: faction.clone(),
            actions: state
                .living_units_of(faction)
                .map(|u| (u.id.clone(), Action::Pass))
                .collect(),
            malformed_root: false,
            rejected: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// Whether anything was defaulted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.malformed_root && self.rejected.is_empty()
    }

    /// Human-readable report naming every defaulted entry, or `None` when
    /// the output was clean.
    #[must_use]
    pub fn report(&self, agent: &str) -> Option<String> {
        if self.is_clean() {
            return None;
        }
        let mut entries: Vec<String> = Vec::with_capacity(self.rejected.len() + 1);
        if self.malformed_root {
            entries.push(NON_MAPPING_ROOT.to_string());
        }
        entries.extend(
            self.rejected
                .iter()
                .filter(|r| !self.malformed_root || r.reason != RejectReason::Missing)
                .map(|r| format!("{} ({})", r.unit_id, r.reason)),
        );
        Some(format!(
            "Agent '{agent}' issued invalid orders for: {}",
            entries.join(", ")
        ))
    }
}

/// Sanitize `raw` into exactly one action per living unit of `faction`.
///
/// A non-object root, a missing entry, a non-object entry or an unknown
/// action kind all default to `pass`. Keys for units the faction does not
/// control are dropped. Field-level problems are left for the engine.
#[must_use]
pub fn validate_orders(state: &GameState, faction: &FactionId, raw: &Value) -> ValidatedOrders {
    let mut orders = ValidatedOrders::all_pass(state, faction);
    let Some(entries) = raw.as_object() else {
        orders.malformed_root = true;
        orders.rejected = orders
            .actions
            .keys()
            .map(|id| Rejection {
                unit_id: id.clone(),
                reason: RejectReason::Missing,
            })
            .collect();
        return orders;
    };

    for (id, slot) in &mut orders.actions {
        let Some(entry) = entries.get(id.as_str()) else {
            orders.rejected.push(Rejection {
                unit_id: id.clone(),
                reason: RejectReason::Missing,
            });
            continue;
        };
        match Action::from_json(entry) {
            Some(action) => *slot = action,
            None => orders.rejected.push(Rejection {
                unit_id: id.clone(),
                reason: classify(entry),
            }),
        }
    }

    orders.ignored = entries
        .keys()
        .filter(|k| !orders.actions.contains_key(k.as_str()))
        .cloned()
        .collect();

    orders
}

fn classify(entry: &Value) -> RejectReason {
    match entry.as_object() {
        None => RejectReason::NotAnObject,
        Some(obj) => match obj.get("action").and_then(Value::as_str) {
            None => RejectReason::MissingKind,
            Some(_) => RejectReason::UnknownKind,
        },
    }
}
