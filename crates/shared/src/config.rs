//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Omie ERP configuration.
    pub omie: OmieConfig,
    /// Sync tuning configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Omie ERP API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OmieConfig {
    /// Base URL of the Omie API.
    #[serde(default = "default_omie_base_url")]
    pub base_url: String,
    /// Application key issued by Omie.
    pub app_key: String,
    /// Application secret issued by Omie.
    pub app_secret: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_omie_timeout")]
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient failures.
    #[serde(default = "default_omie_max_retries")]
    pub max_retries: u32,
    /// Safety cap on pages fetched per listing call.
    #[serde(default = "default_omie_page_cap")]
    pub page_cap: u32,
}

fn default_omie_base_url() -> String {
    "https://app.omie.com.br/api/v1".to_string()
}

fn default_omie_timeout() -> u64 {
    30
}

fn default_omie_max_retries() -> u32 {
    3
}

fn default_omie_page_cap() -> u32 {
    200
}

/// Sync tuning configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Records requested per page from the ERP.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    500
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LASTRO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
