use crate::{
    engine::{PlotOptions, PlotRenderer, ResourceSampler, SeriesByLog},
    error::{ReportError, ReportResult},
};
use tracing::{debug, warn};

/// Sample index, normalized to elapsed job time by the renderer.
pub const TIME_METRIC: &str = "epoch";
const TIME_TITLE: &str = "norm. job time";

/// One resource dimension plotted against normalized job time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPlot {
    pub metric: &'static str,
    pub ytitle: &'static str,
    pub title: &'static str,
    pub scale_y: Option<f64>,
}

/// Plotted for every dataset with retried jobs, in this order.
pub const METRIC_PLOTS: [MetricPlot; 9] = [
    MetricPlot {
        metric: "usr",
        ytitle: "usr CPU",
        title: "user CPU vs norm. job time",
        scale_y: None,
    },
    MetricPlot {
        metric: "sys",
        ytitle: "sys CPU",
        title: "system CPU vs norm. job time",
        scale_y: None,
    },
    MetricPlot {
        metric: "idl",
        ytitle: "idle CPU",
        title: "idle CPU vs norm. job time",
        scale_y: None,
    },
    MetricPlot {
        metric: "writ",
        ytitle: "Disk write",
        title: "disk write (MB/s) vs norm. job time",
        scale_y: Some(0.125e-6),
    },
    MetricPlot {
        metric: "read",
        ytitle: "Disk read",
        title: "disk read (MB/s) vs norm. job time",
        scale_y: Some(0.125e-6),
    },
    MetricPlot {
        metric: "send",
        ytitle: "network send",
        title: "network send (MB/s) vs norm. job time",
        scale_y: Some(1e-6),
    },
    MetricPlot {
        metric: "recv",
        ytitle: "network receive",
        title: "network receive (MB/s) vs norm. job time",
        scale_y: Some(1e-6),
    },
    MetricPlot {
        metric: "used",
        ytitle: "used mem.",
        title: "used memory [GB] vs norm. job time",
        scale_y: Some(1e-9),
    },
    MetricPlot {
        metric: "buff",
        ytitle: "buff",
        title: "buff [GB] vs norm. job time",
        scale_y: Some(1e-9),
    },
];

impl MetricPlot {
    pub fn options(&self, bin_count: u32) -> PlotOptions {
        PlotOptions {
            xtitle: TIME_TITLE.to_string(),
            ytitle: self.ytitle.to_string(),
            title: self.title.to_string(),
            bin_count,
            normalize_x: true,
            colorbar: true,
            scale_y: self.scale_y,
        }
    }
}

/// Samples every log and keeps the ones that produced data.
pub fn collect_series<S: ResourceSampler + ?Sized>(
    sampler: &S,
    logs: &[String],
) -> ReportResult<SeriesByLog> {
    let mut series = SeriesByLog::new();
    for log in logs {
        let sampled = sampler
            .sample(log)
            .map_err(|e| ReportError::collaborator("resource sampler", log, &e))?;
        match sampled {
            Some(s) if s.values().any(|v| !v.is_empty()) => {
                series.insert(log.clone(), s);
            }
            _ => debug!("no resource samples in {log}"),
        }
    }
    Ok(series)
}

/// Renders one plot per entry of [`METRIC_PLOTS`], dropping the ones that produced nothing.
pub fn render_metric_plots<R: PlotRenderer + ?Sized>(
    renderer: &R,
    series: &SeriesByLog,
    dataset: &str,
    bin_count: u32,
) -> ReportResult<Vec<String>> {
    let mut paths = Vec::new();
    for plot in &METRIC_PLOTS {
        let rendered = renderer
            .render(series, dataset, (TIME_METRIC, plot.metric), &plot.options(bin_count))
            .map_err(|e| ReportError::collaborator("plot renderer", dataset, &e))?;
        match rendered {
            Some(path) if !path.is_empty() => paths.push(path),
            _ => warn!("no {} plot rendered for {dataset}", plot.metric),
        }
    }
    Ok(paths)
}
