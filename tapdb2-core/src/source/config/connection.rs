//! Database connection configuration.

use crate::security::Credentials;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeroize::Zeroizing;

/// Driver name registered by IBM i Access Client Solutions.
pub const DEFAULT_ODBC_DRIVER: &str = "IBM i Access ODBC Driver";

/// Configuration for catalog connections.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
///
/// # Example
/// ```rust
/// use tapdb2_core::source::ConnectionConfig;
///
/// let config = ConnectionConfig::new("ibmi.example.com".to_string())
///     .with_database("S1234".to_string())
///     .with_username("QSECOFR".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// IBM i system name or address
    pub host: String,
    /// Optional port number
    pub port: Option<u16>,
    /// Optional relational database name
    pub database: Option<String>,
    /// Optional username (password handled separately)
    pub username: Option<String>,
    /// ODBC driver name
    pub driver: String,
    /// Login timeout
    pub connect_timeout: Duration,
    /// Rows fetched per round trip
    pub fetch_batch_size: usize,
    /// Longest text value fetched, in bytes
    pub max_text_length: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            driver: DEFAULT_ODBC_DRIVER.to_string(),
            connect_timeout: Duration::from_secs(30),
            fetch_batch_size: 1000,
            max_text_length: 4096,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.host,
            self.port.map_or_else(String::new, |p| format!(":{}", p)),
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
        // Username is omitted on purpose
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::error::TapDb2Error::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == Some(0) {
            return Err(crate::error::TapDb2Error::configuration(
                "port must be greater than 0",
            ));
        }

        if self.driver.trim().is_empty() {
            return Err(crate::error::TapDb2Error::configuration(
                "driver cannot be empty",
            ));
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(crate::error::TapDb2Error::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.fetch_batch_size == 0 {
            return Err(crate::error::TapDb2Error::configuration(
                "fetch_batch_size must be greater than 0",
            ));
        }

        if self.fetch_batch_size > 100_000 {
            return Err(crate::error::TapDb2Error::configuration(
                "fetch_batch_size should not exceed 100000",
            ));
        }

        if self.max_text_length == 0 {
            return Err(crate::error::TapDb2Error::configuration(
                "max_text_length must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Creates a new connection config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Builder method to set the ODBC driver name.
    pub fn with_driver(mut self, driver: String) -> Self {
        self.driver = driver;
        self
    }

    /// Builds the ODBC connection string, credentials included.
    ///
    /// The result holds the password and is wiped on drop; never log it.
    pub fn odbc_connection_string(&self, credentials: &Credentials) -> Zeroizing<String> {
        let mut conn = Zeroizing::new(String::new());
        conn.push_str(&format!("Driver={{{}}};", self.driver.replace('}', "}}")));
        conn.push_str(&format!("System={};", odbc_value(&self.host)));
        if let Some(port) = self.port {
            conn.push_str(&format!("Port={};", port));
        }
        if let Some(database) = &self.database {
            conn.push_str(&format!("Database={};", odbc_value(database)));
        }
        let username = if credentials.username().is_empty() {
            self.username.as_deref().unwrap_or_default()
        } else {
            credentials.username()
        };
        if !username.is_empty() {
            conn.push_str(&format!("UID={};", odbc_value(username)));
        }
        if let Some(password) = credentials.password() {
            let value = Zeroizing::new(odbc_value(password));
            conn.push_str("PWD=");
            conn.push_str(&value);
            conn.push(';');
        }
        conn
    }
}

/// Quotes an ODBC attribute value when it contains separators.
fn odbc_value(value: &str) -> String {
    let needs_braces = value.contains([';', '{', '}'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if needs_braces {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}
