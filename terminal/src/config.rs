//! Terminal configuration

use std::path::PathBuf;
use std::time::Duration;

use algo_client::ApiConfig;
use color_eyre::eyre::{OptionExt, Result};
use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum LogFormat {
    #[default]
    #[serde(alias = "compact")]
    Compact,
    #[serde(alias = "pretty")]
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    /// Base URL of the REST API, eg. `https://algotrade.io/api`
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "Api::default_timeout")]
    pub timeout_secs: u64,
}

impl Api {
    fn default_timeout() -> u64 {
        30
    }
}

impl From<Api> for ApiConfig {
    fn from(api: Api) -> Self {
        ApiConfig::new(api.base_url).with_timeout(Duration::from_secs(api.timeout_secs))
    }
}

/// Where the session is kept between runs
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Storage {
    /// State file, defaults to `algo-terminal/state.json` in the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Storage {
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let dir = dirs::data_dir().ok_or_eyre("No data directory, set storage.path explicitly")?;
        Ok(dir.join("algo-terminal").join("state.json"))
    }
}

/// Top level terminal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend connection
    pub api: Api,

    /// Session storage
    #[serde(default)]
    pub storage: Storage,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}
