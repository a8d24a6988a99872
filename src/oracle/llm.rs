//! OpenAI-compatible chat-completions oracle.
//!
//! Without an API key the oracle answers with empty orders, so every unit
//! passes. The referee bounds each call with its own deadline; the HTTP
//! client also carries a request timeout so a hung connection cannot stall
//! the worker forever.

use std::collections::VecDeque;
use std::env;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::game::{FactionId, FactionView};
use crate::oracle::{Oracle, OracleError};

const DEFAULT_MODEL: &str = "gpt-4.1-nano";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const HISTORY_LIMIT: usize = 6;
const MAX_RETRIES: u32 = 3;
const BACKOFF: Duration = Duration::from_secs(2);
const ERROR_BODY_LIMIT: usize = 512;

const SYSTEM_PROMPT: &str = "\
You are the autonomous commander of one faction in a turn-based grid war-game \
set in Harford County, Maryland. Each turn you receive a JSON view of the \
battlefield restricted by fog of war: every tile, your own units, and enemy \
units within 2 tiles (Chebyshev distance) of any of your units.

Rules:
- Each unit takes exactly one action per turn.
- move: one step in direction N, NE, E, SE, S, SW, W, NW or STAY. Water is \
impassable. If two units try to enter the same tile, neither moves. A unit \
cannot enter a tile held by a unit that is not leaving it.
- attack: target an enemy unit exactly one tile away horizontally or \
vertically. Damage equals your attack power and stacks across attackers. \
Friendly fire has no effect. Units are destroyed at 0 HP.
- pass: do nothing.
- All actions resolve simultaneously.
- You win by eliminating every enemy unit.

Respond ONLY with a JSON object mapping each of your unit ids to an action, \
for example {\"u1\": {\"action\": \"move\", \"direction\": \"N\"}, \
\"u2\": {\"action\": \"attack\", \"target_unit_id\": \"e1\"}}. \
Do not reveal private reasoning.";

/// Settings for [`LlmOracle`].
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Bearer token. `None` disables remote calls.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_TEMP` and
    /// `OPENAI_BASE_URL`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            ..Self::default()
        };
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.model = model;
        }
        if let Ok(temp) = env::var("OPENAI_TEMP") {
            match temp.parse() {
                Ok(t) => config.temperature = t,
                Err(_) => warn!(value = %temp, "ignoring unparsable OPENAI_TEMP"),
            }
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Commander backed by a chat-completions endpoint.
pub struct LlmOracle {
    faction: FactionId,
    name: String,
    config: LlmConfig,
    client: Option<Client>,
    history: VecDeque<(ChatMessage, ChatMessage)>,
}

impl std::fmt::Debug for LlmOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmOracle")
            .field("faction", &self.faction)
            .field("model", &self.config.model)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl LlmOracle {
    /// Create an LLM oracle for `faction`.
    #[must_use]
    pub fn new(faction: FactionId, config: LlmConfig) -> Self {
        let name = format!("{faction} ({})", config.model);
        Self {
            faction,
            name,
            config,
            client: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    fn client(&mut self) -> Result<&Client, OracleError> {
        if self.client.is_none() {
            let client = Client::builder().timeout(self.config.timeout).build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| OracleError::Other("HTTP client unavailable".to_string()))
    }

    fn request(&mut self, api_key: &str, messages: &[ChatMessage]) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": messages,
        });
        let response = self
            .client()?
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let parsed: ChatResponse = response.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Malformed("response has no choices".to_string()))
    }

    fn remember(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.history.push_back((user, assistant));
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

/// Strip markdown code fences an LLM may wrap its JSON in.
fn strip_md_fences(text: &str) -> &str {
    let mut text = text.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
        }
        if let Some(rest) = text.strip_suffix(fence) {
            text = rest;
        }
    }
    text.trim()
}

/// Parse the assistant's reply into raw orders.
fn parse_orders(content: &str) -> Result<Value, OracleError> {
    serde_json::from_str(strip_md_fences(content))
        .map_err(|e| OracleError::Malformed(format!("{e}: {content}")))
}

impl Oracle for LlmOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn faction(&self) -> &FactionId {
        &self.faction
    }

    fn decide(&mut self, view: FactionView) -> Result<Value, OracleError> {
        let Some(api_key) = self.config.api_key.clone() else {
            debug!(faction = %self.faction, "no API key, passing");
            return Ok(Value::Object(Map::new()));
        };

        let intel = serde_json::to_string(&view).map_err(|e| OracleError::Other(e.to_string()))?;
        let user = ChatMessage::new(
            "user",
            format!(
                "Turn {}. You command faction {}. Battlefield intel:\n{intel}",
                view.turn, view.faction
            ),
        );

        let mut messages = Vec::with_capacity(2 + 2 * self.history.len());
        messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
        for (u, a) in &self.history {
            messages.push(u.clone());
            messages.push(a.clone());
        }
        messages.push(user.clone());

        let mut last = String::new();
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BACKOFF * 2u32.pow(attempt - 1);
                debug!(faction = %self.faction, attempt, ?delay, "retrying LLM call");
                thread::sleep(delay);
            }
            let reply = self
                .request(&api_key, &messages)
                .and_then(|content| parse_orders(&content).map(|orders| (content, orders)));
            match reply {
                Ok((content, orders)) => {
                    self.remember(user, ChatMessage::new("assistant", content));
                    return Ok(orders);
                }
                Err(e) => {
                    warn!(
                        faction = %self.faction,
                        attempt = attempt + 1,
                        error = %e,
                        "LLM call failed"
                    );
                    last = e.to_string();
                }
            }
        }

        Err(OracleError::Exhausted {
            attempts: MAX_RETRIES,
            last,
        })
    }
}
