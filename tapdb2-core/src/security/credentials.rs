//! Credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password live in `Zeroizing` containers
//! - Memory is cleared when credentials go out of scope
//! - `Debug` output never shows the password

use zeroize::{Zeroize, Zeroizing};

/// Login for the IBM i system, zeroed on drop.
///
/// # Example
///
/// ```rust
/// use tapdb2_core::security::Credentials;
///
/// let creds = Credentials::new("QUSER".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "QUSER");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates credentials; both values are zeroed on drop.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password, for building the driver connection string only.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Returns a copy with `password` set, keeping the username.
    pub fn with_password(&self, password: String) -> Self {
        Self::new(self.username.to_string(), Some(password))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
