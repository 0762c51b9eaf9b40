use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "ONDEMAND";
const CONFIG_FILE: &str = "ondemand";
const COMBINED_FILE_NAME: &str = "combined_series.json";

/// Runtime settings. Layered: defaults < `ondemand.toml` < `ONDEMAND_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Max simultaneous in-flight requests across the whole run.
    pub max_concurrency: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Listing entries are only collected after the entry with this title.
    pub listing_marker: String,
    pub categories_file: PathBuf,
    pub output_dir: PathBuf,
    /// Unset: `combined_series.json` next to the categories file.
    pub combined_file: Option<PathBuf>,
    pub channels_input: PathBuf,
    pub channels_output: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("base_url", "https://pluto.tv")?
            .set_default("user_agent", "python-requests/2.32.3")?
            .set_default("timeout_secs", 30_i64)?
            .set_default("max_concurrency", 8_i64)?
            .set_default("max_retries", 2_i64)?
            .set_default("retry_backoff_ms", 500_i64)?
            .set_default("listing_marker", "Series para Maratonear")?
            .set_default("categories_file", "categories.json")?
            .set_default("output_dir", "Series")?
            .set_default("channels_input", "resultados.json")?
            .set_default("channels_output", "resultados_actualizados.json")?)
    }

    pub fn combined_path(&self) -> PathBuf {
        self.combined_file.clone().unwrap_or_else(|| {
            self.categories_file
                .parent()
                .unwrap_or(Path::new(""))
                .join(COMBINED_FILE_NAME)
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
impl Default for Settings {
    fn default() -> Self {
        Self::builder()
            .and_then(|b| Ok(b.build()?.try_deserialize()?))
            .expect("built-in defaults deserialize")
    }
}
