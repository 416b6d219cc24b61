use crate::{
    config::Config,
    engine::python::PythonEngine,
    pipeline::{Pipeline, RunPaths},
    publish::DirPublisher,
    report::task_dataset,
    store,
    util::{ensure_dir, epoch_to_rfc3339, expand_tilde},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Batch job status reporter (task aggregation + failure diagnosis + dashboard merge)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./taskboard.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the log-parsing and plotting helpers.
    Doctor {},
    /// Print this run's task reports without touching the persisted report.
    Aggregate {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        no_plots: bool,
    },
    /// Aggregate, merge into the persisted report and publish it.
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        webdir: Option<PathBuf>,
        #[arg(long)]
        no_publish: bool,
        #[arg(long)]
        no_plots: bool,
    },
    /// Print a completion table of the persisted report.
    Show {
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg).as_deref())?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Aggregate { input, no_plots } => {
            if *no_plots {
                cfg.plots.enabled = false;
            }
            aggregate(&cfg, input.as_deref())
        }
        Command::Run {
            input,
            report,
            webdir,
            no_publish,
            no_plots,
        } => {
            if *no_plots {
                cfg.plots.enabled = false;
            }
            if *no_publish {
                cfg.publish.enabled = false;
            }
            let paths = RunPaths {
                summary: input
                    .clone()
                    .unwrap_or_else(|| expand_tilde(&cfg.paths.summary_file)),
                report: report
                    .clone()
                    .unwrap_or_else(|| expand_tilde(&cfg.paths.report_file)),
                dashboard_dir: cfg.publish.enabled.then(|| {
                    webdir
                        .clone()
                        .unwrap_or_else(|| expand_tilde(&cfg.paths.dashboard_dir))
                }),
            };
            run(&cfg, &paths)
        }
        Command::Show { report } => {
            let path = report
                .clone()
                .unwrap_or_else(|| expand_tilde(&cfg.paths.report_file));
            show(&path)
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    ["taskboard.toml", "taskboard.example.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(expand_tilde(&cfg.logging.file_path));
    }
    Some(PathBuf::from("taskboard.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = PythonEngine::new(cfg);
    let diag = engine.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn aggregate(cfg: &Config, input: Option<&Path>) -> Result<()> {
    let input = input
        .map(PathBuf::from)
        .unwrap_or_else(|| expand_tilde(&cfg.paths.summary_file));
    let datasets = store::load_summary(&input)?;
    let pipeline = Pipeline::new(cfg, PythonEngine::new(cfg));
    let tasks = pipeline.aggregate_all(&datasets)?;
    println!("{}", serde_json::to_string_pretty(&tasks)?);
    Ok(())
}

fn run(cfg: &Config, paths: &RunPaths) -> Result<()> {
    let engine = PythonEngine::new(cfg);
    let pipeline = Pipeline::new(cfg, engine);
    let publisher = DirPublisher {
        copy_plots: cfg.publish.copy_plots,
    };

    info!(
        "summary={} report={}",
        paths.summary.display(),
        paths.report.display()
    );
    let out = pipeline
        .run(paths, &publisher)
        .with_context(|| format!("reporting on {}", paths.summary.display()))?;

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "report": out.report_path,
                "new_tasks": out.new_tasks,
                "total_tasks": out.report.tasks.len(),
                "published": out.published,
                "last_updated": epoch_to_rfc3339(out.report.last_updated),
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn show(path: &Path) -> Result<()> {
    let report = store::load_report(path)?
        .ok_or_else(|| anyhow!("no report at {}", path.display()))?;

    println!("last updated {}", epoch_to_rfc3339(report.last_updated));
    println!(
        "{:<60} {:>11} {:>19} {:>7} {:>5}",
        "dataset", "jobs", "events", "done%", "bad"
    );
    for task in &report.tasks {
        let num = |ptr: &str| task.pointer(ptr).and_then(serde_json::Value::as_f64).unwrap_or(0.0);
        let (done, total) = (num("/general/nevents_done"), num("/general/nevents_total"));
        let fraction = if total > 0.0 { done / total } else { 0.0 };
        let bad = task
            .pointer("/bad/jobs_not_done")
            .and_then(serde_json::Value::as_object)
            .map_or(0, |m| m.len());
        println!(
            "{:<60} {:>5}/{:<5} {:>9}/{:<9} {:>6.1}% {:>5}",
            task_dataset(task).unwrap_or_default(),
            num("/general/njobs_done"),
            num("/general/njobs_total"),
            done,
            total,
            100.0 * fraction,
            bad
        );
    }
    Ok(())
}
