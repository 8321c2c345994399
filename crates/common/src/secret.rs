//! Secret types for passwords and tokens handled by the harness.
//!
//! Re-exports [`secrecy`] and defines [`Credentials`], the email/password
//! pair used for CLI user creation and login. Passwords and bearer tokens
//! never appear in `Debug` output or tracing events.
//!
//! ```rust
//! use common::secret::{Credentials, ExposeSecret};
//!
//! let creds = Credentials::new("foo@bar.com", "1234youseeme");
//! assert_eq!(creds.password.expose_secret(), "1234youseeme");
//! assert!(!format!("{creds:?}").contains("1234youseeme"));
//! ```

use serde::Deserialize;

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// Login credentials of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}
