//! Bogus token forge
//!
//! Fabricates unsigned three-part tokens that the useradm identity
//! middleware accepts in the test deployment, where no gateway verifies
//! signatures. Only the claims segment carries data; the header and
//! signature are fixed placeholders.
//!
//! Tokens built here must never be accepted by a verifying deployment; no
//! real signing is done, and none should be added.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use common::jwt::{Claims, CLAIM_TENANT, DEFAULT_TOKEN_LIFETIME, ISSUER};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Placeholder header segment.
pub const BOGUS_HEADER: &str = "bogus_header";

/// Placeholder signature segment.
pub const BOGUS_SIGNATURE: &str = "bogus_sign";

/// Name of the header carrying credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// Namespace for deriving subject ids from arbitrary labels.
pub const SUBJECT_NAMESPACE: Uuid = Uuid::NAMESPACE_OID;

/// Claims that only the builder's own setters may write.
const RESERVED_CLAIMS: [&str; 5] = ["jti", "sub", "iss", "exp", CLAIM_TENANT];

/// HTTP headers to attach to a request.
pub type AuthHeaders = HashMap<String, String>;

/// Map a subject label to a UUID.
///
/// A label that already parses as a UUID is kept (in hyphenated lowercase
/// form); anything else is derived with UUID v5 under [`SUBJECT_NAMESPACE`],
/// so the same label always yields the same id.
pub fn derive_subject_id(subject: &str) -> Uuid {
    Uuid::parse_str(subject)
        .unwrap_or_else(|_| Uuid::new_v5(&SUBJECT_NAMESPACE, subject.as_bytes()))
}

/// Build an `Authorization: Bearer <token>` header map.
pub fn bearer_headers(token: &str) -> AuthHeaders {
    HashMap::from([(AUTHORIZATION.to_string(), format!("Bearer {token}"))])
}

/// Builder for forged tokens
///
/// # Example
/// ```rust,ignore
/// let token = BogusTokenBuilder::new()
///     .for_subject("foo")
///     .for_tenant("tenant1id")
///     .with_claim("mender.user", true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct BogusTokenBuilder {
    subject: String,
    tenant: Option<String>,
    exp: i64,
    extra: Map<String, Value>,
}

impl BogusTokenBuilder {
    /// Create a new builder expiring [`DEFAULT_TOKEN_LIFETIME`] from now
    pub fn new() -> Self {
        Self {
            subject: "test-subject".to_string(),
            tenant: None,
            exp: (Utc::now() + Duration::seconds(DEFAULT_TOKEN_LIFETIME.as_secs() as i64))
                .timestamp(),
            extra: Map::new(),
        }
    }

    /// Set the subject label (a UUID or any string to derive one from)
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Add the `mender.tenant` claim
    pub fn for_tenant(mut self, tenant: &str) -> Self {
        self.tenant = Some(tenant.to_string());
        self
    }

    /// Set an optional tenant
    pub fn with_tenant(mut self, tenant: Option<&str>) -> Self {
        self.tenant = tenant.map(ToString::to_string);
        self
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set an absolute expiration timestamp
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Attach an additional claim
    ///
    /// Standard claims (`jti`, `sub`, `iss`, `exp`, `mender.tenant`) are
    /// ignored here; use the dedicated setters.
    pub fn with_claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        if RESERVED_CLAIMS.contains(&name) {
            tracing::warn!(
                target: "useradm_test_utils.forge",
                claim = name,
                "Ignoring attempt to override a standard claim"
            );
            return self;
        }
        self.extra.insert(name.to_string(), value.into());
        self
    }

    /// Build the claims
    ///
    /// Every call draws a fresh `jti`.
    pub fn claims(&self) -> Claims {
        let subject_id = derive_subject_id(&self.subject);

        tracing::debug!(
            target: "useradm_test_utils.forge",
            subject_id = %subject_id,
            tenant = self.tenant.as_deref(),
            "Forged token claims"
        );

        Claims {
            jti: Uuid::new_v4().to_string(),
            sub: subject_id.to_string(),
            iss: ISSUER.to_string(),
            exp: self.exp,
            tenant: self.tenant.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Build the token string
    ///
    /// Standard claims are serialized first, in declaration order, followed
    /// by the extra claims.
    pub fn build(&self) -> String {
        let json = serde_json::to_string(&self.claims())
            .expect("claims with string keys always serialize");
        let payload = URL_SAFE_NO_PAD.encode(json);
        format!("{BOGUS_HEADER}.{payload}.{BOGUS_SIGNATURE}")
    }

    /// Build the `Authorization` header map carrying the token
    pub fn headers(&self) -> AuthHeaders {
        bearer_headers(&self.build())
    }
}

impl Default for BogusTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fabricate an unsigned token for `subject`, optionally in `tenant`.
pub fn fabricate(subject: &str, tenant: Option<&str>) -> String {
    BogusTokenBuilder::new()
        .for_subject(subject)
        .with_tenant(tenant)
        .build()
}

/// Fabricate a token and wrap it in an `Authorization: Bearer` header map.
///
/// # Example
/// ```rust,ignore
/// let users = mgmt.get_users(Some(&make_auth("foo", Some("tenant1id")))).await?;
/// ```
pub fn make_auth(subject: &str, tenant: Option<&str>) -> AuthHeaders {
    bearer_headers(&fabricate(subject, tenant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::jwt::{decompose, Header};
    use serde_json::json;

    const DAY: i64 = 24 * 60 * 60;

    #[test]
    fn test_uuid_subject_used_verbatim() {
        let subject = "8a4b6f32-1d2e-4c5b-9a7f-0e1d2c3b4a59";
        let parts = decompose(&fabricate(subject, None)).unwrap();
        assert_eq!(parts.subject(), Some(subject));
    }

    #[test]
    fn test_label_subject_is_derived_deterministically() {
        let first = decompose(&fabricate("foo", None)).unwrap();
        let second = decompose(&fabricate("foo", None)).unwrap();

        assert_eq!(first.subject(), second.subject());
        assert_eq!(
            first.subject().unwrap(),
            Uuid::new_v5(&Uuid::NAMESPACE_OID, b"foo").to_string()
        );
    }

    #[test]
    fn test_different_labels_derive_different_ids() {
        assert_ne!(derive_subject_id("foo"), derive_subject_id("bar"));
        assert_ne!(derive_subject_id("user-1@foo.com"), derive_subject_id("user-2@foo.com"));
    }

    #[test]
    fn test_derived_id_is_version_5() {
        assert_eq!(derive_subject_id("foo").get_version_num(), 5);
    }

    #[test]
    fn test_jti_is_fresh_per_token() {
        let a = decompose(&fabricate("foo", None)).unwrap();
        let b = decompose(&fabricate("foo", None)).unwrap();

        assert_ne!(a.claim("jti"), b.claim("jti"));
        assert_ne!(fabricate("foo", None), fabricate("foo", None));
    }

    #[test]
    fn test_tenant_claim_present_only_when_given() {
        let with_tenant = decompose(&fabricate("foo", Some("tenant1id"))).unwrap();
        let without_tenant = decompose(&fabricate("foo", None)).unwrap();

        assert_eq!(with_tenant.tenant(), Some("tenant1id"));
        assert!(without_tenant.claim(CLAIM_TENANT).is_none());
    }

    #[test]
    fn test_make_auth_concrete_scenario() {
        let before = Utc::now().timestamp();
        let headers = make_auth("foo", Some("tenant1id"));
        let after = Utc::now().timestamp();

        assert_eq!(headers.len(), 1);
        let value = &headers[AUTHORIZATION];
        let token = value.strip_prefix("Bearer ").unwrap();
        assert!(token.starts_with("bogus_header."));
        assert!(token.ends_with(".bogus_sign"));
        assert!(!token.contains('='));

        let parts = decompose(token).unwrap();
        let claims = parts.typed_claims().unwrap();
        assert_eq!(claims.iss, "Mender");
        assert_eq!(claims.tenant.as_deref(), Some("tenant1id"));
        assert_eq!(claims.sub, derive_subject_id("foo").to_string());
        assert!(claims.exp >= before + 7 * DAY && claims.exp <= after + 7 * DAY);
        assert!(matches!(parts.header, Header::Opaque(_)));
    }

    #[test]
    fn test_round_trip_for_awkward_subjects() {
        for subject in ["", " ", "ünïcödé", "a.b.c", "Bearer x", "{\"sub\":1}"] {
            let parts = decompose(&fabricate(subject, None));
            assert!(parts.is_ok(), "subject {subject:?} failed: {parts:?}");
        }
    }

    #[test]
    fn test_builder_extra_claims_and_expiry() {
        let token = BogusTokenBuilder::new()
            .for_subject("alice")
            .with_claim("mender.user", true)
            .with_claim("sub", "hijack")
            .expires_at(42)
            .build();

        let parts = decompose(&token).unwrap();
        assert_eq!(parts.claim("mender.user"), Some(&Value::Bool(true)));
        assert_eq!(parts.subject().unwrap(), derive_subject_id("alice").to_string());
        assert_eq!(parts.claim("exp"), Some(&json!(42)));
    }

    #[test]
    fn test_builder_default() {
        let claims = BogusTokenBuilder::default().claims();
        assert_eq!(claims.sub, derive_subject_id("test-subject").to_string());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.tenant, None);
    }

    #[test]
    fn test_expires_in() {
        let now = Utc::now().timestamp();
        let claims = BogusTokenBuilder::new().expires_in(60).claims();
        assert!((claims.exp - (now + 60)).abs() <= 5);
    }

    #[test]
    fn test_uuid_subject_is_normalized() {
        let expected = "8a4b6f32-1d2e-4c5b-9a7f-0e1d2c3b4a59";

        for subject in [
            "8A4B6F32-1D2E-4C5B-9A7F-0E1D2C3B4A59",
            "8a4b6f321d2e4c5b9a7f0e1d2c3b4a59",
        ] {
            assert_eq!(derive_subject_id(subject).to_string(), expected);
            let parts = decompose(&fabricate(subject, None)).unwrap();
            assert_eq!(parts.subject(), Some(expected));
        }
    }

    #[test]
    fn test_large_tenant_round_trips() {
        let tenant = "t".repeat(7000);
        let parts = decompose(&fabricate("foo", Some(&tenant))).unwrap();
        assert_eq!(parts.tenant(), Some(tenant.as_str()));
    }

    #[test]
    fn test_extra_claims_follow_standard_claims() {
        let token = BogusTokenBuilder::new()
            .for_tenant("tenant1id")
            .with_claim("aaa", 1)
            .build();

        let payload = token.split('.').nth(1).unwrap();
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

        let position = |key: &str| json.find(&format!("\"{key}\":")).unwrap();
        assert!(position("jti") < position("sub"));
        assert!(position("sub") < position("iss"));
        assert!(position("iss") < position("exp"));
        assert!(position("exp") < position(CLAIM_TENANT));
        assert!(position(CLAIM_TENANT) < position("aaa"));
    }
}
