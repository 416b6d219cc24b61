use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One execution attempt of a job, as recorded by the batch backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(rename = "logfile_out")]
    pub stdout_log: String,
    #[serde(rename = "logfile_err")]
    pub stderr_log: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub output_exists: bool,
    pub is_on_condor: bool,
    /// Chronological; the last entry is the most recent attempt. Only read for unfinished jobs.
    #[serde(rename = "condor_jobs", default)]
    pub attempts: Option<Vec<AttemptRecord>>,
    #[serde(default)]
    pub inputs: Vec<(String, i64)>,
    #[serde(default)]
    pub output: Option<(String, i64)>,
}

impl JobRecord {
    pub fn is_done(&self) -> bool {
        self.output_exists && !self.is_on_condor
    }

    pub fn retry_count(&self) -> usize {
        self.attempts
            .as_ref()
            .map_or(0, |a| a.len().saturating_sub(1))
    }

    /// Sum of input events. Fails when the job lists no inputs or the sum overflows.
    pub fn input_events(&self) -> Result<i64, &'static str> {
        if self.inputs.is_empty() {
            return Err("job has no `inputs`");
        }
        self.inputs
            .iter()
            .try_fold(0i64, |acc, (_, n)| acc.checked_add(*n))
            .ok_or("input event count overflows")
    }

    pub fn output_events(&self) -> Option<i64> {
        self.output.as_ref().map(|(_, n)| *n)
    }

    /// Attempts before the final one, followed by the final one.
    pub fn split_attempts(&self) -> Option<(&[AttemptRecord], &AttemptRecord)> {
        self.attempts
            .as_deref()?
            .split_last()
            .map(|(last, earlier)| (earlier, last))
    }
}

/// One dataset's entry in the input summary file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// In input-file order.
    pub jobs: Vec<(String, JobRecord)>,
    pub queried_nevents: i64,
    /// Every field except `jobs`, verbatim and in input order.
    pub metadata: Map<String, Value>,
}

impl DatasetSummary {
    pub fn from_value(dataset: &str, value: Value) -> ReportResult<Self> {
        let Value::Object(mut metadata) = value else {
            return Err(ReportError::malformed_dataset(
                dataset,
                "dataset entry is not an object",
            ));
        };

        let raw_jobs = match metadata.remove("jobs") {
            Some(Value::Object(jobs)) => jobs,
            Some(_) => {
                return Err(ReportError::malformed_dataset(
                    dataset,
                    "`jobs` is not an object",
                ));
            }
            None => return Err(ReportError::malformed_dataset(dataset, "missing `jobs`")),
        };

        let queried_nevents = metadata
            .get("queried_nevents")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ReportError::malformed_dataset(dataset, "missing or non-integer `queried_nevents`")
            })?;

        let mut jobs = Vec::with_capacity(raw_jobs.len());
        for (job_id, raw) in raw_jobs {
            let job: JobRecord = serde_json::from_value(raw)
                .map_err(|e| ReportError::malformed_job(dataset, &job_id, e.to_string()))?;
            jobs.push((job_id, job));
        }

        Ok(Self {
            jobs,
            queried_nevents,
            metadata,
        })
    }
}
