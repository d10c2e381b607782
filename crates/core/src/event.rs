//! Monitoring event records as delivered by the task-queue monitor.

use serde::{Deserialize, Serialize};

/// Whether the record describes a task execution or a worker status change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Task,
    Worker,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Task => write!(f, "task"),
            EventKind::Worker => write!(f, "worker"),
        }
    }
}

/// A single task or worker event.
///
/// Optional fields are `None` when the monitor did not report them.
/// `retries: Some(0)` means "zero retries" and is distinct from `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub kind: EventKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub app_env: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    /// Execution time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Positional arguments, already rendered to text by the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    /// Keyword arguments, already rendered to text by the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl Event {
    /// Parse an event from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, crate::CoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}
