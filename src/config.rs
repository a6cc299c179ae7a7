use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_TIMEOUT_SECS: f64 = 15.0;
const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub chat_model: String,
    pub embedding_model: String,
    pub optimization_mode: String,
    pub focus_mode: String,
    pub history_limit: usize,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_url: String,
    chat_model: String,
    embedding_model: String,
    optimization_mode: String,
    focus_mode: String,
    timeout: Option<f64>,
    history_limit: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(raw).context("Failed to parse config JSON")?;

        Ok(Self {
            base_url: raw.base_url.trim().to_string(),
            timeout: parse_timeout(raw.timeout),
            chat_model: raw.chat_model,
            embedding_model: raw.embedding_model,
            optimization_mode: raw.optimization_mode,
            focus_mode: raw.focus_mode,
            history_limit: parse_history_limit(raw.history_limit),
        })
    }
}

/// Location of the config file, from `ASKWEB_CONFIG` or `config.json`.
pub fn config_path() -> PathBuf {
    config_path_with(|key| env::var(key).ok())
}

fn config_path_with(mut get_var: impl FnMut(&str) -> Option<String>) -> PathBuf {
    get_var("ASKWEB_CONFIG")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn parse_timeout(raw: Option<f64>) -> Duration {
    let default = Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS);
    let Some(secs) = raw else {
        return default;
    };

    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => timeout,
        _ => {
            warn!(timeout = secs, "ignoring out-of-range timeout, using default");
            default
        }
    }
}

fn parse_history_limit(raw: Option<usize>) -> usize {
    match raw {
        Some(0) => {
            warn!("ignoring zero history_limit, using default");
            DEFAULT_HISTORY_LIMIT
        }
        Some(limit) => limit,
        None => DEFAULT_HISTORY_LIMIT,
    }
}
