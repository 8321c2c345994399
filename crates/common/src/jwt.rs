//! Token wire format shared by the forge, the identity parser and the tests.
//!
//! This module provides:
//! - Claim names and constants used by useradm tokens
//! - The [`Claims`] structure carried in the token payload
//! - [`decompose`], which splits any three-part token into header, claims
//!   and raw signature without verifying anything
//!
//! # Decoding rules
//!
//! - Each segment is re-padded with `=` to a multiple of four and decoded
//!   with the URL-safe alphabet; non-canonical trailing bits are accepted
//! - Claims must be a JSON object
//! - A header that does not look like JSON is kept as opaque bytes (the
//!   forge's placeholder header is not JSON)
//! - The signature is never interpreted
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{decompose, CLAIM_TENANT};
//!
//! let parts = decompose(&token)?;
//! assert_eq!(parts.tenant(), Some("tenant1id"));
//! ```

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Issuer written into every forged token.
pub const ISSUER: &str = "Mender";

/// Claim carrying the tenant identifier.
pub const CLAIM_TENANT: &str = "mender.tenant";

/// Claim marking a token as issued to a user (as opposed to a device).
pub const CLAIM_USER: &str = "mender.user";

/// Claim carrying the space-separated scopes.
pub const CLAIM_SCOPE: &str = "scp";

/// Lifetime of forged tokens (7 days).
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// URL-safe engine that tolerates non-canonical trailing bits and padding.
///
/// Placeholder segments such as `bogus_sign` are not canonical base64, yet
/// they must still decode to raw bytes.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// =============================================================================
// Error Types
// =============================================================================

/// Which part of a token failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Claims,
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Header => "header",
            Segment::Claims => "claims",
            Segment::Signature => "signature",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while decomposing a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtDecodeError {
    /// Token does not have exactly three `.`-separated segments.
    #[error("Malformed token: expected 3 segments, got {segments}")]
    MalformedToken { segments: usize },

    /// A segment is not valid URL-safe base64.
    #[error("Token {segment} is not valid base64: {reason}")]
    Base64 { segment: Segment, reason: String },

    /// A segment is not valid UTF-8 JSON.
    #[error("Token {segment} is not valid JSON: {reason}")]
    Json { segment: Segment, reason: String },

    /// A segment decoded to JSON that is not an object.
    #[error("Token {segment} is not a JSON object")]
    NotAnObject { segment: Segment },
}

// =============================================================================
// Claims Types
// =============================================================================

/// Claims carried by useradm tokens.
///
/// Claims other than the standard ones are kept in `extra` and serialized
/// after them. The `sub` field is redacted in Debug output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Unique token identifier.
    pub jti: String,

    /// Subject identifier (a UUID string).
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Tenant the subject belongs to.
    #[serde(
        rename = "mender.tenant",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant: Option<String>,

    /// Any additional claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("jti", &self.jti)
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("exp", &self.exp)
            .field("tenant", &self.tenant)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Decomposed Token
// =============================================================================

/// Decoded token header.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    /// A JSON object header, as issued by a real signer.
    Json(Map<String, Value>),

    /// Raw bytes of a header that is not JSON (e.g. a placeholder).
    Opaque(Vec<u8>),
}

impl Header {
    /// The header as a JSON object, if it is one.
    #[must_use]
    pub fn as_json(&self) -> Option<&Map<String, Value>> {
        match self {
            Header::Json(map) => Some(map),
            Header::Opaque(_) => None,
        }
    }

    /// Look up a header field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|map| map.get(key))
    }
}

/// A token split into its three decoded parts.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParts {
    pub header: Header,
    pub claims: Map<String, Value>,
    pub signature: Vec<u8>,
}

impl TokenParts {
    /// Look up a claim by name.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// The `sub` claim, if present and a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    /// The `mender.tenant` claim, if present and a string.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.claim(CLAIM_TENANT).and_then(Value::as_str)
    }

    /// Deserialize the claims into the typed [`Claims`] structure.
    ///
    /// # Errors
    ///
    /// Returns `JwtDecodeError::Json` if a standard claim is missing or has
    /// the wrong type.
    pub fn typed_claims(&self) -> Result<Claims, JwtDecodeError> {
        serde_json::from_value(Value::Object(self.claims.clone())).map_err(|e| {
            JwtDecodeError::Json {
                segment: Segment::Claims,
                reason: e.to_string(),
            }
        })
    }

    /// Split into a `(header, claims, signature)` tuple.
    #[must_use]
    pub fn into_parts(self) -> (Header, Map<String, Value>, Vec<u8>) {
        (self.header, self.claims, self.signature)
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Pad a base64 string with `=` until its length is a multiple of four.
#[must_use]
pub fn b64pad(data: &str) -> String {
    let missing = (4 - data.len() % 4) % 4;
    let mut padded = String::with_capacity(data.len() + missing);
    padded.push_str(data);
    padded.extend(std::iter::repeat('=').take(missing));
    padded
}

/// Decode one URL-safe base64 segment, tolerating stripped padding.
///
/// # Errors
///
/// Returns `JwtDecodeError::Base64` if the segment cannot be decoded.
pub fn decode_segment(data: &str, segment: Segment) -> Result<Vec<u8>, JwtDecodeError> {
    LENIENT_URL_SAFE.decode(b64pad(data)).map_err(|e| {
        tracing::debug!(
            target: "common.jwt",
            %segment,
            error = %e,
            "Failed to decode token segment base64"
        );
        JwtDecodeError::Base64 {
            segment,
            reason: e.to_string(),
        }
    })
}

fn parse_object(bytes: &[u8], segment: Segment) -> Result<Map<String, Value>, JwtDecodeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(
            target: "common.jwt",
            %segment,
            error = %e,
            "Failed to parse token segment JSON"
        );
        JwtDecodeError::Json {
            segment,
            reason: e.to_string(),
        }
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(JwtDecodeError::NotAnObject { segment }),
    }
}

fn parse_header(bytes: Vec<u8>) -> Result<Header, JwtDecodeError> {
    let looks_like_json = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');

    if looks_like_json {
        parse_object(&bytes, Segment::Header).map(Header::Json)
    } else {
        Ok(Header::Opaque(bytes))
    }
}

/// Split a token into decoded header, claims and signature.
///
/// No signature verification is performed.
///
/// # Errors
///
/// - `MalformedToken` - segment count is not exactly three
/// - `Base64` - any segment is not URL-safe base64
/// - `Json` / `NotAnObject` - the claims (or a JSON-looking header) are not
///   a JSON object
///
/// # Example
///
/// ```rust,ignore
/// let (header, claims, signature) = decompose(&token)?.into_parts();
/// assert_eq!(claims["iss"], "Mender");
/// ```
pub fn decompose(token: &str) -> Result<TokenParts, JwtDecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, claims, signature] = segments.as_slice() else {
        tracing::debug!(
            target: "common.jwt",
            segments = segments.len(),
            "Token rejected: invalid segment count"
        );
        return Err(JwtDecodeError::MalformedToken {
            segments: segments.len(),
        });
    };

    let header = parse_header(decode_segment(header, Segment::Header)?)?;
    let claims = parse_object(&decode_segment(claims, Segment::Claims)?, Segment::Claims)?;
    let signature = decode_segment(signature, Segment::Signature)?;

    Ok(TokenParts {
        header,
        claims,
        signature,
    })
}

// =============================================================================
// Tests
// =============================================================================
