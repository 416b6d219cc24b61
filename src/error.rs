use std::path::PathBuf;
use thiserror::Error;

/// Result type for report generation
pub type ReportResult<T> = Result<T, ReportError>;

/// Failures that abort a reporting run. There is no partial report mode.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input summary file is absent or unreadable
    #[error("input summary not found: {}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input summary {} is not a dataset map: {reason}", .path.display())]
    InvalidSummary { path: PathBuf, reason: String },

    /// A dataset or job record lacks a required field
    #[error("malformed input in dataset {dataset}{}: {reason}", job_suffix(.job))]
    MalformedInput {
        dataset: String,
        job: Option<String>,
        reason: String,
    },

    #[error("{collaborator} failed on {log_ref}: {reason}")]
    CollaboratorFailure {
        collaborator: &'static str,
        log_ref: String,
        reason: String,
    },

    #[error("report persistence failed for {}: {reason}", .path.display())]
    PersistenceFailure { path: PathBuf, reason: String },

    #[error("task report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    pub fn malformed_job(dataset: &str, job: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            dataset: dataset.to_string(),
            job: Some(job.to_string()),
            reason: reason.into(),
        }
    }

    pub fn malformed_dataset(dataset: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            dataset: dataset.to_string(),
            job: None,
            reason: reason.into(),
        }
    }

    pub fn collaborator(
        collaborator: &'static str,
        log_ref: &str,
        err: &anyhow::Error,
    ) -> Self {
        Self::CollaboratorFailure {
            collaborator,
            log_ref: log_ref.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

fn job_suffix(job: &Option<String>) -> String {
    match job {
        Some(j) => format!(" (job {j})"),
        None => String::new(),
    }
}
