use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_RATE_TABLE_URL: &str = "http://www.nbp.pl/kursy/xml/a019z180126.xml";
pub const DEFAULT_LOCAL_CURRENCY: &str = "PLN";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateTableConfig {
    #[serde(default = "default_rate_table_url")]
    pub url: String,
    #[serde(default = "default_local_currency")]
    pub local_currency: CurrencyCode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RateTableConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RateTableConfig {
    fn default() -> Self {
        RateTableConfig {
            url: default_rate_table_url(),
            local_currency: default_local_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_rate_table_url() -> String {
    DEFAULT_RATE_TABLE_URL.to_string()
}

fn default_local_currency() -> CurrencyCode {
    CurrencyCode::new(DEFAULT_LOCAL_CURRENCY)
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticBaseCurrencyConfig {
    pub code: CurrencyCode,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteBaseCurrencyConfig {
    pub url: String,
}

/// Where the base currency comes from: a fixed code or a remote lookup.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum BaseCurrencyConfig {
    Static(StaticBaseCurrencyConfig),
    Remote(RemoteBaseCurrencyConfig),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_table: RateTableConfig,
    pub base_currency: BaseCurrencyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "exch-rates", "exch-rates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
