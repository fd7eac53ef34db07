//! Externalized session state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skein_expr::Value;

use crate::path::START_PATH;
use crate::story::Story;

/// Snapshot of a play-through: where it stands and what it has seen.
///
/// Visit counts are `Integer` entries keyed by node path; declared
/// variables live in the same map under their names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Path of the node the session is paused at.
    pub current: String,
    /// Visit counts and variables.
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
}

impl Context {
    /// A fresh context at the start of the story with declared defaults.
    pub fn new(story: &Story) -> Self {
        Self {
            current: START_PATH.to_string(),
            vars: story.initial_vars(),
        }
    }

    /// How many times the path has been visited.
    pub fn visits(&self, path: &str) -> i64 {
        self.vars
            .get(path)
            .and_then(Value::as_integer)
            .unwrap_or(0)
    }

    /// Parse a context from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the context as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
