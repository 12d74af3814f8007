//! Singer-style JSON config file.

use super::connection::{ConnectionConfig, DEFAULT_ODBC_DRIVER};
use crate::Result;
use crate::error::TapDb2Error;
use crate::security::Credentials;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use zeroize::Zeroize;

/// The tap's config file.
///
/// ```json
/// {
///   "host": "ibmi.example.com",
///   "database": "S1234",
///   "username": "QUSER",
///   "password": "secret"
/// }
/// ```
///
/// Use [`TapConfig::into_parts`] to split it into a credential-free
/// [`ConnectionConfig`] and [`Credentials`].
#[derive(Clone, Deserialize, Zeroize)]
#[zeroize(drop)]
#[serde(deny_unknown_fields)]
pub struct TapConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_driver() -> String {
    DEFAULT_ODBC_DRIVER.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_fetch_batch_size() -> usize {
    1000
}

fn default_max_text_length() -> usize {
    4096
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("driver", &self.driver)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("fetch_batch_size", &self.fetch_batch_size)
            .field("max_text_length", &self.max_text_length)
            .finish()
    }
}

impl TapConfig {
    /// Parses a config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TapDb2Error::Serialization {
            context: "Failed to parse config file".to_string(),
            source: e,
        })
    }

    /// Reads and parses a config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = zeroize::Zeroizing::new(tokio::fs::read_to_string(path).await.map_err(
            |e| TapDb2Error::Io {
                context: format!("Failed to read config file {}", path.display()),
                source: e,
            },
        )?);
        Self::from_json_str(&json)
    }

    /// Splits the config into connection settings and credentials.
    ///
    /// # Errors
    /// Returns error if the resulting connection settings are invalid.
    pub fn into_parts(mut self) -> Result<(ConnectionConfig, Credentials)> {
        let username = self.username.clone();
        let credentials = Credentials::new(
            username.clone().unwrap_or_default(),
            std::mem::take(&mut self.password),
        );

        let config = ConnectionConfig {
            host: std::mem::take(&mut self.host),
            port: self.port,
            database: self.database.take(),
            username,
            driver: std::mem::take(&mut self.driver),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            fetch_batch_size: self.fetch_batch_size,
            max_text_length: self.max_text_length,
        };
        config.validate()?;

        Ok((config, credentials))
    }
}
