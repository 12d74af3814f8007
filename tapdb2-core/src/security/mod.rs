//! Credential protection.
//!
//! - `credentials`: credential container with automatic memory zeroing
//! - `connection`: `db2://` URL parsing with credential extraction
//!
//! Passwords are kept in `Zeroizing` containers, never stored in
//! [`crate::source::ConnectionConfig`], and redacted from logs and errors.

mod connection;
mod credentials;

pub use connection::{SUPPORTED_SCHEMES, parse_connection_string};
pub use credentials::Credentials;
