//! Scenario results.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    /// The environment could not exercise the behaviour; never fails a run.
    Inconclusive,
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenarioStatus::Passed => "PASSED",
            ScenarioStatus::Failed => "FAILED",
            ScenarioStatus::Inconclusive => "INCONCLUSIVE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub status: ScenarioStatus,
    pub message: String,
    pub details: Map<String, Value>,
}

impl ScenarioOutcome {
    fn new(name: &'static str, status: ScenarioStatus, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn passed(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, ScenarioStatus::Passed, message)
    }

    pub fn failed(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, ScenarioStatus::Failed, message)
    }

    pub fn inconclusive(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, ScenarioStatus::Inconclusive, message)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Anything but `Failed`.
    pub fn success(&self) -> bool {
        self.status != ScenarioStatus::Failed
    }
}
