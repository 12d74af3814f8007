//! Configuration types for catalog sources.
//!
//! - `ConnectionConfig`: connection settings without credentials
//! - `TapConfig`: the JSON config file handed to the tap
//!
//! # Security
//! `ConnectionConfig` intentionally does NOT store passwords. Credentials
//! travel separately in [`crate::security::Credentials`].

mod connection;
mod file;

pub use connection::{ConnectionConfig, DEFAULT_ODBC_DRIVER};
pub use file::TapConfig;
