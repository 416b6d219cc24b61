use crate::{
    error::ReportResult,
    report::{task_dataset, PersistedReport, TaskReport},
    util::now_epoch_seconds,
};
use std::collections::HashSet;
use tracing::debug;

/// Combines this run's tasks with a prior report, stamped with the current time.
pub fn merge(
    new_tasks: Vec<TaskReport>,
    prior: Option<PersistedReport>,
) -> ReportResult<PersistedReport> {
    merge_at(new_tasks, prior, now_epoch_seconds())
}

/// New tasks come first and always win. Prior tasks for datasets this run did not touch are
/// appended verbatim in their original order, so runs over disjoint datasets accumulate.
pub fn merge_at(
    new_tasks: Vec<TaskReport>,
    prior: Option<PersistedReport>,
    last_updated: f64,
) -> ReportResult<PersistedReport> {
    let mut seen: HashSet<String> = new_tasks.iter().map(|t| t.dataset().to_string()).collect();
    let mut tasks = new_tasks
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(prior) = prior {
        for task in prior.tasks {
            let keep = match task_dataset(&task) {
                Some(name) => seen.insert(name.to_string()),
                None => false,
            };
            if keep {
                debug!("keeping prior task {}", task_dataset(&task).unwrap_or_default());
                tasks.push(task);
            }
        }
    }

    Ok(PersistedReport {
        tasks,
        last_updated,
    })
}
