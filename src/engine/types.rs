use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric name to ordered samples for one attempt.
pub type ResourceSeries = BTreeMap<String, Vec<f64>>;

/// Log reference to that attempt's samples.
pub type SeriesByLog = BTreeMap<String, ResourceSeries>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    pub xtitle: String,
    pub ytitle: String,
    pub title: String,
    pub bin_count: u32,
    pub normalize_x: bool,
    pub colorbar: bool,
    #[serde(default)]
    pub scale_y: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperDiag {
    pub python_exe: String,
    pub python_version: String,
    pub ok: bool,
    #[serde(default)]
    pub plotting_backend: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct InferErrorOut {
    pub ok: bool,
    #[serde(default)]
    pub error_class: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SampleOut {
    pub ok: bool,
    #[serde(default)]
    pub dstat: Option<ResourceSeries>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PlotOut {
    pub ok: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
