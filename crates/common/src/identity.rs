//! Identity extraction from bearer tokens.
//!
//! This is the consuming side of forged tokens: it reads the subject and
//! tenant out of an `Authorization` header the way the useradm identity
//! middleware does in a test deployment.
//!
//! No signature is ever checked here. Accepting a token therefore requires
//! the caller to opt in with [`TrustMode::UnsignedForTesting`]; the default
//! [`TrustMode::Verified`] refuses every token.

use crate::jwt::{decompose, JwtDecodeError, CLAIM_SCOPE, CLAIM_TENANT, CLAIM_USER};
use serde_json::Value;
use thiserror::Error;

/// Scope granting every action within the tenant.
pub const SCOPE_TENANT_ADMIN: &str = "mender.*";

/// Scope granting only the creation of the initial user.
pub const SCOPE_INITIAL_USER: &str = "mender.users.initial.create";

/// Resource path of the initial user endpoint (path past the API version).
pub const RESOURCE_INITIAL_USER: &str = "users:initial";

/// Maximum accepted token size in bytes (8KB).
///
/// Checked before any base64 or JSON work is done.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Identity parsing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Missing or empty Authorization header")]
    MissingToken,

    #[error("Unsigned tokens are only accepted in test mode")]
    SignatureVerificationRequired,

    #[error("Token of {size} bytes exceeds the {max} byte limit")]
    TokenTooLarge { size: usize, max: usize },

    #[error("Token has no subject claim")]
    MissingSubject,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtDecodeError),

    #[error("Unauthorized")]
    Unauthorized,
}

/// Whether unsigned tokens may be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustMode {
    /// Tokens must be signature-verified; nothing here can do that, so every
    /// token is refused.
    #[default]
    Verified,

    /// Claims are trusted without looking at the signature. Only valid in a
    /// test deployment without a gateway.
    UnsignedForTesting,
}

impl TrustMode {
    /// Map the `trust_unsigned` configuration flag to a mode.
    #[must_use]
    pub fn from_flag(trust_unsigned: bool) -> Self {
        if trust_unsigned {
            TrustMode::UnsignedForTesting
        } else {
            TrustMode::Verified
        }
    }
}

/// Identity read from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub tenant: Option<String>,
    pub scopes: Vec<String>,
    pub is_user: bool,
}

impl Identity {
    /// Check if the identity carries a scope.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Strip the bearer prefix from an `Authorization` header value.
///
/// Returns `None` when nothing is left.
#[must_use]
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let trimmed = header_value.trim();
    let token = trimmed
        .strip_prefix("Bearer")
        .or_else(|| trimmed.strip_prefix("bearer"))
        .unwrap_or(trimmed)
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Parses identities out of bearer tokens under a fixed [`TrustMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityParser {
    mode: TrustMode,
}

impl IdentityParser {
    #[must_use]
    pub fn new(mode: TrustMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn mode(&self) -> TrustMode {
        self.mode
    }

    /// Parse an identity from a full `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` for an empty header, otherwise the errors of
    /// [`IdentityParser::parse_token`].
    pub fn parse_header(&self, header_value: &str) -> Result<Identity, IdentityError> {
        let token = extract_bearer_token(header_value).ok_or(IdentityError::MissingToken)?;
        self.parse_token(token)
    }

    /// Parse an identity from a raw token.
    ///
    /// # Errors
    ///
    /// - `SignatureVerificationRequired` - the parser is in `Verified` mode
    /// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
    /// - `InvalidToken` - the token cannot be decomposed
    /// - `MissingSubject` - the claims carry no string `sub`
    pub fn parse_token(&self, token: &str) -> Result<Identity, IdentityError> {
        if self.mode == TrustMode::Verified {
            tracing::debug!(
                target: "common.identity",
                "Token rejected: unsigned tokens not trusted outside test mode"
            );
            return Err(IdentityError::SignatureVerificationRequired);
        }

        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "common.identity",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(IdentityError::TokenTooLarge {
                size: token.len(),
                max: MAX_JWT_SIZE_BYTES,
            });
        }

        let parts = decompose(token)?;

        let subject = parts
            .subject()
            .filter(|s| !s.is_empty())
            .ok_or(IdentityError::MissingSubject)?
            .to_string();

        let scopes = parts
            .claim(CLAIM_SCOPE)
            .and_then(Value::as_str)
            .map(|s| s.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default();

        let is_user = parts
            .claim(CLAIM_USER)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let tenant = parts
            .claim(CLAIM_TENANT)
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Ok(Identity {
            subject,
            tenant,
            scopes,
            is_user,
        })
    }
}

/// Authorize an action on a resource.
///
/// `resource` is the request path past the API version with `/` replaced by
/// `:` (e.g. `users:initial`); `action` is the HTTP method.
///
/// # Errors
///
/// Returns `IdentityError::Unauthorized` unless a scope grants the action.
pub fn authorize(identity: &Identity, resource: &str, action: &str) -> Result<(), IdentityError> {
    if identity.has_scope(SCOPE_TENANT_ADMIN) {
        return Ok(());
    }

    if identity.has_scope(SCOPE_INITIAL_USER)
        && action.eq_ignore_ascii_case("POST")
        && resource == RESOURCE_INITIAL_USER
    {
        return Ok(());
    }

    tracing::debug!(
        target: "common.identity",
        resource = resource,
        action = action,
        "Authorization denied"
    );
    Err(IdentityError::Unauthorized)
}

/// Turn a URL path into a resource id: segments past the API version joined
/// with `:`.
///
/// `/api/0.1.0/users/initial` becomes `users:initial`.
#[must_use]
pub fn resource_id(path: &str) -> String {
    path.split('/').skip(3).collect::<Vec<_>>().join(":")
}
