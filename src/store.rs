use crate::{
    error::{ReportError, ReportResult},
    model::DatasetSummary,
    report::{task_dataset, PersistedReport},
    util::{ensure_dir, to_sorted_json},
};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Reads the input summary, keeping datasets in file order.
pub fn load_summary(path: &Path) -> ReportResult<Vec<(String, DatasetSummary)>> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReportError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    parse_summary(path, &raw)
}

pub fn parse_summary(path: &Path, raw: &str) -> ReportResult<Vec<(String, DatasetSummary)>> {
    let datasets: Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| ReportError::InvalidSummary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    datasets
        .into_iter()
        .map(|(name, value)| {
            let summary = DatasetSummary::from_value(&name, value)?;
            Ok::<_, ReportError>((name, summary))
        })
        .collect()
}

/// Loads the previously persisted report, or `None` when there is none yet.
pub fn load_report(path: &Path) -> ReportResult<Option<PersistedReport>> {
    if !path.exists() {
        debug!("no prior report at {}", path.display());
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|e| persistence(path, e))?;
    let report: PersistedReport =
        serde_json::from_str(&raw).map_err(|e| persistence(path, format!("corrupt report: {e}")))?;
    if let Some(i) = report.tasks.iter().position(|t| task_dataset(t).is_none()) {
        return Err(persistence(
            path,
            format!("corrupt report: task {i} has no `general.dataset`"),
        ));
    }
    Ok(Some(report))
}

/// Overwrites `path` with the report as sorted, indented JSON.
pub fn write_report(path: &Path, report: &PersistedReport) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).map_err(|e| persistence(path, format!("{e:#}")))?;
    }
    let body = to_sorted_json(report).map_err(|e| persistence(path, format!("{e:#}")))?;
    std::fs::write(path, body).map_err(|e| persistence(path, e))?;
    info!("wrote {} tasks to {}", report.tasks.len(), path.display());
    Ok(())
}

fn persistence(path: &Path, reason: impl ToString) -> ReportError {
    ReportError::PersistenceFailure {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
