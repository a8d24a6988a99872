//! Per-unit actions and their JSON form.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::game::{Direction, UnitId};

/// The five accepted action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Do nothing.
    Pass,
    /// Step one tile.
    Move,
    /// Strike an adjacent enemy.
    Attack,
    /// Raise a new unit (no effect in the current ruleset).
    Recruit,
    /// Collect resources (no effect in the current ruleset).
    Gather,
}

impl ActionKind {
    /// Wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Pass => "pass",
            ActionKind::Move => "move",
            ActionKind::Attack => "attack",
            ActionKind::Recruit => "recruit",
            ActionKind::Gather => "gather",
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ActionKind::Pass),
            "move" => Ok(ActionKind::Move),
            "attack" => Ok(ActionKind::Attack),
            "recruit" => Ok(ActionKind::Recruit),
            "gather" => Ok(ActionKind::Gather),
            other => Err(format!("unknown action kind '{other}'")),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally valid action.
///
/// Kind-specific fields are kept as parsed-or-absent so that a well-formed
/// action with a bad field still reaches the engine and fails there as a
/// no-op for that unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Do nothing.
    Pass,
    /// Step one tile; `None` when the direction was missing or unrecognised.
    Move {
        /// Requested direction.
        direction: Option<Direction>,
    },
    /// Attack a unit; `None` when the target id was missing or not a string.
    Attack {
        /// Requested target.
        target: Option<UnitId>,
    },
    /// Recruit with opaque parameters.
    Recruit {
        /// Remaining fields of the raw action object.
        fields: Map<String, Value>,
    },
    /// Gather with opaque parameters.
    Gather {
        /// Remaining fields of the raw action object.
        fields: Map<String, Value>,
    },
}

impl Action {
    /// Kind tag of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::Pass => ActionKind::Pass,
            Action::Move { .. } => ActionKind::Move,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Recruit { .. } => ActionKind::Recruit,
            Action::Gather { .. } => ActionKind::Gather,
        }
    }

    /// Convenience constructor for a move.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Action::Move {
            direction: Some(direction),
        }
    }

    /// Convenience constructor for an attack.
    #[must_use]
    pub fn attack(target: impl Into<UnitId>) -> Self {
        Action::Attack {
            target: Some(target.into()),
        }
    }

    /// Parse one raw action entry.
    ///
    /// Returns `None` unless `raw` is an object whose `action` field is a
    /// string naming one of the accepted kinds.
    #[must_use]
    pub fn from_json(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let kind: ActionKind = obj.get("action")?.as_str()?.parse().ok()?;
        let rest = || {
            obj.iter()
                .filter(|(k, _)| k.as_str() != "action")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>()
        };
        Some(match kind {
            ActionKind::Pass => Action::Pass,
            ActionKind::Move => Action::Move {
                direction: obj
                    .get("direction")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok()),
            },
            ActionKind::Attack => Action::Attack {
                target: obj
                    .get("target_unit_id")
                    .and_then(Value::as_str)
                    .map(UnitId::from),
            },
            ActionKind::Recruit => Action::Recruit { fields: rest() },
            ActionKind::Gather => Action::Gather { fields: rest() },
        })
    }

    /// JSON form understood by [`Action::from_json`].
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Action::Pass => json!({ "action": "pass" }),
            Action::Move { direction } => match direction {
                Some(d) => json!({ "action": "move", "direction": d.as_str() }),
                None => json!({ "action": "move" }),
            },
            Action::Attack { target } => match target {
                Some(t) => json!({ "action": "attack", "target_unit_id": t.as_str() }),
                None => json!({ "action": "attack" }),
            },
            Action::Recruit { fields } | Action::Gather { fields } => {
                let mut obj = fields.clone();
                obj.insert("action".into(), Value::from(self.kind().as_str()));
                Value::Object(obj)
            }
        }
    }
}

/// One action per unit for a single turn.
pub type ActionMap = BTreeMap<UnitId, Action>;

/// Serialize an action map into the oracle output shape.
#[must_use]
pub fn action_map_to_json(actions: &ActionMap) -> Value {
    Value::Object(
        actions
            .iter()
            .map(|(id, action)| (id.to_string(), action.to_json()))
            .collect(),
    )
}
