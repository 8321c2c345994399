//! Basic auth header for user login.

use base64::{engine::general_purpose::URL_SAFE, Engine};

/// Build a `Basic` credential for the login endpoint.
///
/// Encodes `username:password` with the URL-safe alphabet, keeping the `=`
/// padding.
pub fn make_basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", URL_SAFE.encode(format!("{username}:{password}")))
}
