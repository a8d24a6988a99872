//! The always-pass oracle.

use serde_json::{Map, Value};

use crate::game::{FactionId, FactionView};
use crate::oracle::{Oracle, OracleError};

/// Passes with every unit, every turn.
#[derive(Debug, Clone)]
pub struct PassOracle {
    faction: FactionId,
    name: String,
}

impl PassOracle {
    /// Create a pass oracle for `faction`.
    #[must_use]
    pub fn new(faction: FactionId) -> Self {
        let name = format!("{faction} (pass)");
        Self { faction, name }
    }
}

impl Oracle for PassOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    /// An empty object: the validator defaults every unit to `pass`.
    fn decide(&mut self, _view: FactionView) -> Result<Value, OracleError> {
        Ok(Value::Object(Map::new()))
    }
}
