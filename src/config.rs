use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub plots: Plots,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub publish: Publish,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub summary_file: String,
    pub report_file: String,
    pub dashboard_dir: String,
    pub scripts_dir: String,
    pub plots_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            summary_file: "summary.json".into(),
            report_file: "web_summary.json".into(),
            dashboard_dir: "~/public_html/dump/metis_test/".into(),
            scripts_dir: "scripts".into(),
            plots_dir: "plots".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Tag naming the job-execution backend, written as `general.type`.
    pub task_type: String,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            task_type: "CMSSW".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plots {
    pub enabled: bool,
    pub bin_count: u32,
}
impl Default for Plots {
    fn default() -> Self {
        Self {
            enabled: true,
            bin_count: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    pub python_exe: String,
    pub call_timeout_seconds: u64,
    #[serde(default)]
    pub env: std::collections::BTreeMap<String, String>,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            python_exe: "python3".into(),
            call_timeout_seconds: 120,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publish {
    pub enabled: bool,
    pub copy_plots: bool,
}
impl Default for Publish {
    fn default() -> Self {
        Self {
            enabled: true,
            copy_plots: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
