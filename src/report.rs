use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Status written for every aggregated task. Aggregation never marks a task complete.
pub const TASK_STATUS_RUNNING: &str = "running";

/// Per-dataset record; the unit that is persisted and merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub general: General,
    pub bad: BadSummary,
}

impl TaskReport {
    pub fn dataset(&self) -> &str {
        &self.general.dataset
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct General {
    pub dataset: String,
    pub nevents_total: i64,
    pub nevents_done: i64,
    pub njobs_total: usize,
    pub njobs_done: usize,
    pub status: String,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Pass-through dataset fields. Never holds a key that collides with the fields above.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl General {
    /// Keys computed by aggregation; they replace same-named metadata fields.
    pub const COMPUTED_KEYS: [&'static str; 7] = [
        "dataset",
        "nevents_total",
        "nevents_done",
        "njobs_total",
        "njobs_done",
        "status",
        "type",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BadSummary {
    #[serde(default)]
    pub plots: Vec<String>,
    #[serde(default)]
    pub jobs_not_done: BTreeMap<String, BadJobInfo>,
    #[serde(default)]
    pub missing_events: i64,
}

/// Diagnostics for a job that needed at least one retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadJobInfo {
    pub retries: usize,
    pub inputs: usize,
    pub events: i64,
    pub last_error: String,
    pub last_log: String,
}

/// The report file as persisted. Tasks stay raw JSON so entries written by earlier runs, possibly
/// by other versions, are carried forward exactly as found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedReport {
    #[serde(default)]
    pub tasks: Vec<Value>,
    /// Seconds since the unix epoch.
    #[serde(default)]
    pub last_updated: f64,
}

/// `general.dataset` of a persisted task.
pub fn task_dataset(task: &Value) -> Option<&str> {
    task.pointer("/general/dataset").and_then(Value::as_str)
}
