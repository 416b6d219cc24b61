pub mod python;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{HelperDiag, PlotOptions, ResourceSeries, SeriesByLog};

/// Infers a short failure cause from an attempt's stderr log.
pub trait ErrorClassifier {
    /// Missing or unreadable logs yield an empty string rather than an error.
    fn infer_error(&self, log_ref: &str) -> Result<String>;
}

/// Extracts resource-usage samples from an attempt's stdout log.
pub trait ResourceSampler {
    fn sample(&self, log_ref: &str) -> Result<Option<ResourceSeries>>;
}

pub trait PlotRenderer {
    /// Returns `None` when nothing was rendered.
    fn render(
        &self,
        series: &SeriesByLog,
        dataset: &str,
        metrics: (&str, &str),
        options: &PlotOptions,
    ) -> Result<Option<String>>;
}

/// Pushes the persisted report to wherever the dashboard is served from.
pub trait Publisher {
    fn publish(&self, dest_dir: &Path, report_path: &Path) -> Result<()>;
}
