use crate::{
    aggregate::TaskAggregator,
    config::Config,
    engine::{ErrorClassifier, PlotRenderer, Publisher, ResourceSampler},
    error::ReportResult,
    merge,
    model::DatasetSummary,
    report::{PersistedReport, TaskReport},
    store,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Where one run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub summary: PathBuf,
    pub report: PathBuf,
    /// `None` skips publishing.
    pub dashboard_dir: Option<PathBuf>,
}

pub struct Pipeline<E> {
    cfg: Config,
    engine: E,
}

pub struct RunOutput {
    pub report: PersistedReport,
    pub report_path: PathBuf,
    pub new_tasks: usize,
    pub published: bool,
}

impl<E> Pipeline<E>
where
    E: ErrorClassifier + ResourceSampler + PlotRenderer,
{
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Aggregates every dataset in input order. Stops at the first failure.
    pub fn aggregate_all(&self, datasets: &[(String, DatasetSummary)]) -> ReportResult<Vec<TaskReport>> {
        let aggregator = TaskAggregator::new(&self.cfg, &self.engine);
        datasets
            .iter()
            .map(|(name, summary)| aggregator.aggregate(name, summary))
            .collect()
    }

    /// Load, aggregate, merge with the prior report, write, then publish.
    pub fn run(&self, paths: &RunPaths, publisher: &dyn Publisher) -> ReportResult<RunOutput> {
        let started = Instant::now();

        let datasets = store::load_summary(&paths.summary)?;
        info!("loaded {} datasets from {}", datasets.len(), paths.summary.display());

        let tasks = self.aggregate_all(&datasets)?;
        let new_tasks = tasks.len();

        let prior = store::load_report(&paths.report)?;
        let report = merge::merge(tasks, prior)?;
        store::write_report(&paths.report, &report)?;

        let published = match &paths.dashboard_dir {
            Some(dir) => publish(publisher, dir, &paths.report),
            None => false,
        };

        info!(
            "run finished in {:?}: {} new tasks, {} total",
            started.elapsed(),
            new_tasks,
            report.tasks.len()
        );

        Ok(RunOutput {
            report,
            report_path: paths.report.clone(),
            new_tasks,
            published,
        })
    }
}

fn publish(publisher: &dyn Publisher, dir: &Path, report: &Path) -> bool {
    match publisher.publish(dir, report) {
        Ok(()) => {
            info!("published {} to {}", report.display(), dir.display());
            true
        }
        Err(err) => {
            warn!("publishing to {} failed: {err:#}", dir.display());
            false
        }
    }
}
