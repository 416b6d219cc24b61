use super::{types::*, ErrorClassifier, PlotRenderer, ResourceSampler};
use crate::{config::Config, util::expand_tilde};
use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const LOG_PARSER_SCRIPT: &str = "log_parser.py";
const PLOTTER_SCRIPT: &str = "plotter.py";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Drives the log-parsing and plotting helper scripts over JSON stdin/stdout.
///
/// Scripts are looked up when a request first needs one, so runs that never consult a helper
/// work without them.
pub struct PythonEngine {
    cfg: Config,
    scripts_dir: PathBuf,
    python_exe: PathBuf,
}

impl PythonEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            scripts_dir: expand_tilde(&cfg.paths.scripts_dir),
            python_exe: expand_tilde(cfg.engine.python_exe.trim()),
        }
    }

    pub fn doctor(&self) -> Result<HelperDiag> {
        self.call(LOG_PARSER_SCRIPT, &json!({"cmd": "doctor"}))
    }

    fn script(&self, name: &str) -> Result<PathBuf> {
        let path = self.scripts_dir.join(name);
        if !path.is_file() {
            bail!("missing script: {}", path.display());
        }
        Ok(path)
    }

    /// Sends one request to a helper and decodes its reply.
    fn call<O: DeserializeOwned>(&self, script_name: &str, request: &Value) -> Result<O> {
        let script = self.script(script_name)?;
        let limit = match self.cfg.engine.call_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        debug!("helper {} cmd={} limit={limit:?}", script.display(), request["cmd"]);

        let mut child = Command::new(&self.python_exe)
            .arg(&script)
            .envs(&self.cfg.engine.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning {} {}", self.python_exe.display(), script.display()))?;

        // Dropping the handle closes stdin so the helper sees EOF.
        let mut stdin = child.stdin.take().ok_or_else(|| anyhow!("helper stdin unavailable"))?;
        stdin
            .write_all(&serde_json::to_vec(request)?)
            .with_context(|| format!("writing request to {}", script.display()))?;
        drop(stdin);

        let output = wait_for(child, limit)?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            bail!("{} exited with {}: {}", script.display(), output.status, stderr.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("helper stderr {}: {}", script.display(), stderr.trim());
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("decoding reply from {}", script.display()))
    }
}

impl ErrorClassifier for PythonEngine {
    fn infer_error(&self, log_ref: &str) -> Result<String> {
        if !Path::new(log_ref).exists() {
            debug!("log not found, no error inferred: {log_ref}");
            return Ok(String::new());
        }
        let out: InferErrorOut =
            self.call(LOG_PARSER_SCRIPT, &json!({"cmd": "infer_error", "log": log_ref}))?;
        if !out.ok {
            return Err(anyhow!(out.error.unwrap_or_else(|| "infer_error failed".into())));
        }
        Ok(out.error_class)
    }
}

impl ResourceSampler for PythonEngine {
    fn sample(&self, log_ref: &str) -> Result<Option<ResourceSeries>> {
        if !Path::new(log_ref).exists() {
            debug!("log not found, no samples: {log_ref}");
            return Ok(None);
        }
        let out: SampleOut = self.call(LOG_PARSER_SCRIPT, &json!({"cmd": "sample", "log": log_ref}))?;
        if !out.ok {
            return Err(anyhow!(out.error.unwrap_or_else(|| "sample failed".into())));
        }
        Ok(out.dstat)
    }
}

impl PlotRenderer for PythonEngine {
    fn render(
        &self,
        series: &SeriesByLog,
        dataset: &str,
        metrics: (&str, &str),
        options: &PlotOptions,
    ) -> Result<Option<String>> {
        let out: PlotOut = self.call(
            PLOTTER_SCRIPT,
            &json!({
                "cmd": "plot_2d_hist",
                "series": series,
                "dataset": dataset,
                "x": metrics.0,
                "y": metrics.1,
                "options": options,
                "out_dir": expand_tilde(&self.cfg.paths.plots_dir),
            }),
        )?;
        if !out.ok {
            warn!(
                "plotter declined {dataset} {}: {}",
                metrics.1,
                out.error.as_deref().unwrap_or("no detail")
            );
            return Ok(None);
        }
        Ok(out.path.filter(|p| !p.is_empty()))
    }
}

/// Waits for the helper to exit, killing it once `limit` passes. Both pipes are drained on
/// their own threads so a chatty helper never blocks on a full buffer.
fn wait_for(mut child: Child, limit: Option<Duration>) -> Result<Output> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = limit.map(|l| Instant::now() + l);

    let status = loop {
        if let Some(status) = child.try_wait().context("polling helper")? {
            break status;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("helper timed out after {limit:?}, killing it");
            let _ = child.kill();
            child.wait().context("reaping helper")?;
            let stderr = collect(stderr)?;
            bail!(
                "helper exceeded {limit:?}; stderr: {}",
                String::from_utf8_lossy(&stderr).trim()
            );
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    reader
        .join()
        .map_err(|_| anyhow!("helper pipe reader panicked"))?
        .context("reading helper output")
}
