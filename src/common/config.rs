//! # Configuration Utilities
//!
//! Configuration structures for the web server and the TOML loader shared by
//! both binaries.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::login::AccountRecord;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: AppConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Complete web server configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerInfo,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Accounts the login check cross-references cards against
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
}

/// Where and how the HTTP API listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Listen address (e.g., "127.0.0.1:3000")
    pub address: String,
    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Login attempt limits, applied per client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Attempts allowed inside one window
    pub max_attempts: u32,
    /// Window length (seconds)
    pub window_secs: u64,
    /// Upper bound on tracked clients; the oldest entry is evicted past it
    pub max_tracked_keys: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
            max_tracked_keys: 10_000,
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    /// Load the web server configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}
