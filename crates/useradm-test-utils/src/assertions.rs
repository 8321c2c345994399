//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over decomposed tokens, both forged ones
//! and the ones returned by the login endpoint.

use crate::forge::derive_subject_id;
use common::jwt::{decompose, TokenParts, CLAIM_TENANT};
use std::time::Duration;

/// Allowed clock skew when checking expiry windows.
const CLOCK_TOLERANCE_SECS: i64 = 5;

fn explode(token: &str) -> TokenParts {
    match decompose(token) {
        Ok(parts) => parts,
        Err(e) => panic!("Failed to decompose token: {e}"),
    }
}

/// Custom assertions for tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_token()
///     .assert_tenant("tenant1id")
///     .assert_issuer("Mender");
/// ```
pub trait TokenAssertions {
    /// Assert that the token has three decodable segments and JSON claims
    fn assert_valid_token(&self) -> &Self;

    /// Assert that the `sub` claim equals `subject_id`
    fn assert_subject(&self, subject_id: &str) -> &Self;

    /// Assert that the `sub` claim is the id derived from `label`
    fn assert_subject_label(&self, label: &str) -> &Self;

    /// Assert that the `mender.tenant` claim equals `tenant`
    fn assert_tenant(&self, tenant: &str) -> &Self;

    /// Assert that there is no `mender.tenant` claim
    fn assert_no_tenant(&self) -> &Self;

    /// Assert the `iss` claim
    fn assert_issuer(&self, issuer: &str) -> &Self;

    /// Assert that `exp` lies between now and now + `window`
    fn assert_expires_within(&self, window: Duration) -> &Self;

    /// Assert that the header is JSON naming the given `alg`
    fn assert_header_alg(&self, alg: &str) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_token(&self) -> &Self {
        let segments = self.split('.').count();
        assert_eq!(
            segments, 3,
            "Token must have 3 parts (header.claims.signature), got {}",
            segments
        );

        let result = decompose(self);
        assert!(result.is_ok(), "Failed to decompose token: {:?}", result.err());

        self
    }

    fn assert_subject(&self, subject_id: &str) -> &Self {
        let parts = explode(self);
        assert_eq!(
            parts.subject(),
            Some(subject_id),
            "Expected subject '{}', got {:?}",
            subject_id,
            parts.subject()
        );

        self
    }

    fn assert_subject_label(&self, label: &str) -> &Self {
        self.assert_subject(&derive_subject_id(label).to_string())
    }

    fn assert_tenant(&self, tenant: &str) -> &Self {
        let parts = explode(self);
        assert_eq!(
            parts.tenant(),
            Some(tenant),
            "Expected {} claim '{}', got {:?}",
            CLAIM_TENANT,
            tenant,
            parts.claim(CLAIM_TENANT)
        );

        self
    }

    fn assert_no_tenant(&self) -> &Self {
        let parts = explode(self);
        assert!(
            parts.claim(CLAIM_TENANT).is_none(),
            "Expected no {} claim, got {:?}",
            CLAIM_TENANT,
            parts.claim(CLAIM_TENANT)
        );

        self
    }

    fn assert_issuer(&self, issuer: &str) -> &Self {
        let parts = explode(self);
        let actual = parts.claim("iss").and_then(|v| v.as_str());
        assert_eq!(
            actual,
            Some(issuer),
            "Expected issuer '{}', got {:?}",
            issuer,
            actual
        );

        self
    }

    fn assert_expires_within(&self, window: Duration) -> &Self {
        let parts = explode(self);
        let exp = parts
            .claim("exp")
            .and_then(|v| v.as_i64())
            .expect("Token has no integer exp claim");

        let now = chrono::Utc::now().timestamp();
        let latest = now + window.as_secs() as i64 + CLOCK_TOLERANCE_SECS;
        assert!(
            exp >= now - CLOCK_TOLERANCE_SECS && exp <= latest,
            "Expected exp within [{}, {}], got {}",
            now,
            latest,
            exp
        );

        self
    }

    fn assert_header_alg(&self, alg: &str) -> &Self {
        let parts = explode(self);
        let actual = parts.header.get("alg").and_then(|v| v.as_str());
        assert_eq!(
            actual,
            Some(alg),
            "Expected header alg '{}', got {:?}",
            alg,
            parts.header
        );

        self
    }
}

impl TokenAssertions for String {
    fn assert_valid_token(&self) -> &Self {
        self.as_str().assert_valid_token();
        self
    }

    fn assert_subject(&self, subject_id: &str) -> &Self {
        self.as_str().assert_subject(subject_id);
        self
    }

    fn assert_subject_label(&self, label: &str) -> &Self {
        self.as_str().assert_subject_label(label);
        self
    }

    fn assert_tenant(&self, tenant: &str) -> &Self {
        self.as_str().assert_tenant(tenant);
        self
    }

    fn assert_no_tenant(&self) -> &Self {
        self.as_str().assert_no_tenant();
        self
    }

    fn assert_issuer(&self, issuer: &str) -> &Self {
        self.as_str().assert_issuer(issuer);
        self
    }

    fn assert_expires_within(&self, window: Duration) -> &Self {
        self.as_str().assert_expires_within(window);
        self
    }

    fn assert_header_alg(&self, alg: &str) -> &Self {
        self.as_str().assert_header_alg(alg);
        self
    }
}
