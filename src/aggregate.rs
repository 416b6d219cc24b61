use crate::{
    config::Config,
    engine::{ErrorClassifier, PlotRenderer, ResourceSampler},
    error::{ReportError, ReportResult},
    model::{DatasetSummary, JobRecord},
    plots,
    report::{BadJobInfo, BadSummary, General, TaskReport, TASK_STATUS_RUNNING},
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What a single job contributes to its dataset's report.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Done { events: i64 },
    /// Needed at least one retry. `logs_to_inspect` holds the stdout logs of every attempt but
    /// the last; the diagnosis in `info` comes from the last attempt only.
    Retried {
        info: BadJobInfo,
        logs_to_inspect: Vec<String>,
    },
    /// Not done and never retried; counted nowhere.
    Pending,
}

/// Reduces one dataset's job records into a [`TaskReport`].
pub struct TaskAggregator<'a, E> {
    engine: &'a E,
    task_type: String,
    plots_enabled: bool,
    bin_count: u32,
}

impl<'a, E> TaskAggregator<'a, E>
where
    E: ErrorClassifier + ResourceSampler + PlotRenderer,
{
    pub fn new(cfg: &Config, engine: &'a E) -> Self {
        Self {
            engine,
            task_type: cfg.report.task_type.clone(),
            plots_enabled: cfg.plots.enabled,
            bin_count: cfg.plots.bin_count,
        }
    }

    pub fn aggregate(&self, dataset: &str, summary: &DatasetSummary) -> ReportResult<TaskReport> {
        let mut completed_events = 0i64;
        let mut done_jobs = 0usize;
        let mut jobs_not_done = BTreeMap::new();
        let mut logs_to_inspect = Vec::new();

        for (job_id, job) in &summary.jobs {
            match self.diagnose_job(dataset, job_id, job)? {
                JobOutcome::Done { events } => {
                    completed_events = completed_events.checked_add(events).ok_or_else(|| {
                        ReportError::malformed_job(dataset, job_id, "completed event count overflows")
                    })?;
                    done_jobs += 1;
                }
                JobOutcome::Retried {
                    info,
                    logs_to_inspect: logs,
                } => {
                    logs_to_inspect.extend(logs);
                    jobs_not_done.insert(job_id.clone(), info);
                }
                JobOutcome::Pending => {}
            }
        }

        let plots = if logs_to_inspect.is_empty() {
            Vec::new()
        } else if !self.plots_enabled {
            debug!("plots disabled; skipping {} logs for {dataset}", logs_to_inspect.len());
            Vec::new()
        } else {
            self.plot_resource_usage(dataset, &logs_to_inspect)?
        };

        info!(
            "dataset={dataset} jobs={}/{} events={}/{} bad={} plots={}",
            done_jobs,
            summary.jobs.len(),
            completed_events,
            summary.queried_nevents,
            jobs_not_done.len(),
            plots.len()
        );

        let mut metadata = summary.metadata.clone();
        for key in General::COMPUTED_KEYS {
            metadata.shift_remove(key);
        }

        Ok(TaskReport {
            general: General {
                dataset: dataset.to_string(),
                nevents_total: summary.queried_nevents,
                nevents_done: completed_events,
                njobs_total: summary.jobs.len(),
                njobs_done: done_jobs,
                status: TASK_STATUS_RUNNING.to_string(),
                task_type: self.task_type.clone(),
                metadata,
            },
            bad: BadSummary {
                plots,
                jobs_not_done,
                missing_events: summary.queried_nevents.saturating_sub(completed_events).max(0),
            },
        })
    }

    pub fn diagnose_job(
        &self,
        dataset: &str,
        job_id: &str,
        job: &JobRecord,
    ) -> ReportResult<JobOutcome> {
        if job.is_done() {
            let events = job.output_events().ok_or_else(|| {
                ReportError::malformed_job(dataset, job_id, "done job has no `output`")
            })?;
            return Ok(JobOutcome::Done { events });
        }

        if job.attempts.is_none() {
            return Err(ReportError::malformed_job(
                dataset,
                job_id,
                "unfinished job has no `condor_jobs`",
            ));
        }
        let retries = job.retry_count();
        let events = job
            .input_events()
            .map_err(|reason| ReportError::malformed_job(dataset, job_id, reason))?;

        if retries == 0 {
            return Ok(JobOutcome::Pending);
        }

        let (earlier, last) = job.split_attempts().ok_or_else(|| {
            ReportError::malformed_job(dataset, job_id, "retried job has no attempts")
        })?;
        let logs_to_inspect = earlier.iter().map(|a| a.stdout_log.clone()).collect();

        let last_error = self
            .engine
            .infer_error(&last.stderr_log)
            .map_err(|e| ReportError::collaborator("error classifier", &last.stderr_log, &e))?;
        debug!("dataset={dataset} job={job_id} retries={retries} last_error={last_error:?}");

        Ok(JobOutcome::Retried {
            info: BadJobInfo {
                retries,
                inputs: job.inputs.len(),
                events,
                last_error,
                last_log: last.stdout_log.clone(),
            },
            logs_to_inspect,
        })
    }

    fn plot_resource_usage(&self, dataset: &str, logs: &[String]) -> ReportResult<Vec<String>> {
        let series = plots::collect_series(self.engine, logs)?;
        if series.is_empty() {
            debug!("no usable resource samples for {dataset}");
            return Ok(Vec::new());
        }
        plots::render_metric_plots(self.engine, &series, dataset, self.bin_count)
    }
}
