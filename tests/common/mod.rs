#![allow(dead_code)]

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use taskboard::{
    engine::{ErrorClassifier, PlotOptions, PlotRenderer, ResourceSampler, ResourceSeries, SeriesByLog},
    model::DatasetSummary,
};

/// In-memory collaborators that record every call.
#[derive(Default)]
pub struct FakeEngine {
    pub errors: HashMap<String, String>,
    pub samples: HashMap<String, ResourceSeries>,
    pub unrendered_metrics: HashSet<String>,
    pub failing_logs: HashSet<String>,
    pub failing_samples: HashSet<String>,
    pub failing_renders: HashSet<String>,
    pub classified: RefCell<Vec<String>>,
    pub sampled: RefCell<Vec<String>>,
    pub rendered: RefCell<Vec<(String, String, PlotOptions)>>,
}

impl FakeEngine {
    pub fn with_error(mut self, log: &str, error: &str) -> Self {
        self.errors.insert(log.to_string(), error.to_string());
        self
    }

    pub fn with_samples(mut self, log: &str) -> Self {
        let series = ResourceSeries::from([
            ("epoch".to_string(), vec![0.0, 1.0, 2.0]),
            ("usr".to_string(), vec![10.0, 80.0, 95.0]),
        ]);
        self.samples.insert(log.to_string(), series);
        self
    }
}

impl ErrorClassifier for FakeEngine {
    fn infer_error(&self, log_ref: &str) -> Result<String> {
        self.classified.borrow_mut().push(log_ref.to_string());
        if self.failing_logs.contains(log_ref) {
            return Err(anyhow!("log parser crashed"));
        }
        Ok(self.errors.get(log_ref).cloned().unwrap_or_default())
    }
}

impl ResourceSampler for FakeEngine {
    fn sample(&self, log_ref: &str) -> Result<Option<ResourceSeries>> {
        self.sampled.borrow_mut().push(log_ref.to_string());
        if self.failing_samples.contains(log_ref) {
            return Err(anyhow!("dstat parser crashed"));
        }
        Ok(self.samples.get(log_ref).cloned())
    }
}

impl PlotRenderer for FakeEngine {
    fn render(
        &self,
        _series: &SeriesByLog,
        dataset: &str,
        metrics: (&str, &str),
        options: &PlotOptions,
    ) -> Result<Option<String>> {
        self.rendered
            .borrow_mut()
            .push((dataset.to_string(), metrics.1.to_string(), options.clone()));
        if self.failing_renders.contains(metrics.1) {
            return Err(anyhow!("plotter crashed"));
        }
        if self.unrendered_metrics.contains(metrics.1) {
            return Ok(None);
        }
        Ok(Some(format!("plots/{dataset}_{}.png", metrics.1)))
    }
}

pub fn attempt(n: usize, job: &str) -> Value {
    serde_json::json!({
        "logfile_out": format!("logs/{job}_{n}.out"),
        "logfile_err": format!("logs/{job}_{n}.err"),
    })
}

pub fn done_job(events: i64) -> Value {
    serde_json::json!({
        "output_exists": true,
        "is_on_condor": false,
        "condor_jobs": [attempt(0, "done")],
        "inputs": [["in.root", events]],
        "output": ["out.root", events],
    })
}

pub fn pending_job(job: &str, attempts: usize, input_events: &[i64]) -> Value {
    let inputs: Vec<Value> = input_events
        .iter()
        .enumerate()
        .map(|(i, n)| serde_json::json!([format!("in_{i}.root"), n]))
        .collect();
    serde_json::json!({
        "output_exists": false,
        "is_on_condor": true,
        "condor_jobs": (0..attempts).map(|n| attempt(n, job)).collect::<Vec<_>>(),
        "inputs": inputs,
    })
}

pub fn dataset(value: Value) -> DatasetSummary {
    DatasetSummary::from_value("ds", value).expect("valid dataset")
}
