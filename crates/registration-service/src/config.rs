//! Configuration for the registration service.

use crate::error::RegistrationError;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Service configuration.
///
/// The four platform settings are flat environment variables
/// (`PLATFORM_DOMAIN`, `VENDOR_ID`, `API_KEY`, `TABLE_NAME`). Everything else
/// is nested with a `__` separator, e.g. `SERVER__PORT`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Partner platform base URL or host
    #[serde(default)]
    pub platform_domain: Option<String>,

    /// Vendor identifier sent with every registration
    #[serde(default)]
    pub vendor_id: Option<String>,

    /// Platform API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// User table name
    #[serde(default)]
    pub table_name: Option<String>,

    /// Platform client configuration
    #[serde(default)]
    pub platform: PlatformConfig,

    /// User store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Request timeout for the registration call
    #[serde(default = "default_platform_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Storage backend
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Partition key attribute of the user table
    #[serde(default = "default_partition_key")]
    pub partition_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

// Default implementations
impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            timeout: default_platform_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            partition_key: default_partition_key(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_platform_timeout() -> Duration {
    platform_client::DEFAULT_TIMEOUT
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::DynamoDb
}

fn default_partition_key() -> String {
    "safeWalkAppId".into()
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".into()
}

/// Validated settings the registration workflow needs.
#[derive(Debug, Clone)]
pub struct RegistrationSettings {
    pub platform_domain: String,
    pub vendor_id: String,
    pub table_name: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Check that every required platform setting is present.
    ///
    /// Empty values count as missing. All missing variables are reported at once.
    pub fn registration_settings(&self) -> Result<RegistrationSettings, RegistrationError> {
        let mut missing = Vec::new();

        let platform_domain = required(&self.platform_domain, "PLATFORM_DOMAIN", &mut missing);
        let vendor_id = required(&self.vendor_id, "VENDOR_ID", &mut missing);
        let table_name = required(&self.table_name, "TABLE_NAME", &mut missing);
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .cloned();
        if api_key.is_none() {
            missing.push("API_KEY".to_string());
        }

        match (platform_domain, vendor_id, table_name, api_key) {
            (Some(platform_domain), Some(vendor_id), Some(table_name), Some(api_key)) => {
                Ok(RegistrationSettings {
                    platform_domain,
                    vendor_id,
                    table_name,
                    api_key,
                    timeout: self.platform.timeout,
                })
            }
            _ => Err(RegistrationError::Configuration { missing }),
        }
    }
}

fn required(value: &Option<String>, name: &str, missing: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(name.to_string());
            None
        }
    }
}
