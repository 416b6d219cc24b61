use crate::{engine::Publisher, store, util::ensure_dir};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Publishes by copying into a directory served by the dashboard web server.
pub struct DirPublisher {
    pub copy_plots: bool,
}

impl Publisher for DirPublisher {
    fn publish(&self, dest_dir: &Path, report_path: &Path) -> Result<()> {
        ensure_dir(dest_dir)?;
        let file_name = report_path
            .file_name()
            .ok_or_else(|| anyhow!("report path has no file name: {}", report_path.display()))?;
        std::fs::copy(report_path, dest_dir.join(file_name))
            .with_context(|| format!("copy {} to {}", report_path.display(), dest_dir.display()))?;

        if !self.copy_plots {
            return Ok(());
        }

        let Some(report) = store::load_report(report_path)? else {
            return Ok(());
        };
        let plots_dir = dest_dir.join("plots");
        let plots = report
            .tasks
            .iter()
            .filter_map(|t| t.pointer("/bad/plots").and_then(|p| p.as_array()))
            .flatten()
            .filter_map(|p| p.as_str());
        for plot in plots {
            let src = Path::new(plot);
            let Some(name) = src.file_name() else {
                continue;
            };
            if !src.exists() {
                debug!("plot not on disk, skipping: {plot}");
                continue;
            }
            ensure_dir(&plots_dir)?;
            if let Err(e) = std::fs::copy(src, plots_dir.join(name)) {
                warn!("failed to copy plot {plot}: {e}");
            }
        }
        Ok(())
    }
}
