//! An oracle that replays canned responses.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::game::{FactionId, FactionView};
use crate::oracle::{Oracle, OracleError};

/// Returns queued responses in order, then empty orders once exhausted.
///
/// A queued `Err` is reported as an oracle failure, which makes this the
/// tool of choice for exercising the referee's fallback paths.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    faction: FactionId,
    name: String,
    script: VecDeque<Result<Value, String>>,
}

impl ScriptedOracle {
    /// Create a scripted oracle with the given responses.
    #[must_use]
    pub fn new(faction: FactionId, script: impl IntoIterator<Item = Result<Value, String>>) -> Self {
        let name = format!("{faction} (scripted)");
        Self {
            faction,
            name,
            script: script.into_iter().collect(),
        }
    }
}

impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    fn decide(&mut self, _view: FactionView) -> Result<Value, OracleError> {
        match self.script.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(OracleError::Other(message)),
            None => Ok(Value::Object(Map::new())),
        }
    }
}
