use serde::Deserialize;
use std::{fs, time::Duration};

use crate::cache::RefreshPolicy;

pub const DEFAULT_REGION: &str = "US-TOTAL";

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_history_window")]
    pub history_window: i64,
    pub max_age_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_age_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn refresh_policy(&self) -> RefreshPolicy {
        match self.max_age_secs {
            Some(secs) => RefreshPolicy::MaxAge(Duration::from_secs(secs)),
            None => RefreshPolicy::Never,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_renewable_fuel_types")]
    pub renewable_fuel_types: Vec<String>,
    #[serde(default = "default_min_history_points")]
    pub min_history_points: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            renewable_fuel_types: default_renewable_fuel_types(),
            min_history_points: default_min_history_points(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("ENERGY_CONFIG").unwrap_or_else(|_| "energy-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let mut cfg = Self::from_toml_str(&contents)?;

        if let Ok(key) = env::var("EIA_API_KEY") {
            cfg.upstream.api_key = key;
        }
        if cfg.upstream.api_key.is_empty() {
            tracing::warn!("no EIA api key configured; upstream requests will be rejected");
        }

        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.page_size == 0 {
            anyhow::bail!("upstream.page_size must be greater than zero");
        }
        if self.cache.history_window <= 0 {
            anyhow::bail!("cache.history_window must be greater than zero");
        }
        if self.forecast.renewable_fuel_types.is_empty() {
            anyhow::bail!("forecast.renewable_fuel_types must not be empty");
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.eia.gov/v2/electricity/electric-power-operational-data/data".to_string()
}

fn default_frequency() -> String {
    "monthly".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_history_window() -> i64 {
    100
}

fn default_renewable_fuel_types() -> Vec<String> {
    vec!["WND".to_string(), "SUN".to_string()]
}

fn default_min_history_points() -> usize {
    2
}
