//! # useradm Test Utilities
//!
//! Shared test utilities for the user-administration service harness.
//!
//! This crate provides:
//! - The bogus token forge (`fabricate`, `make_auth`, `BogusTokenBuilder`)
//! - Basic auth headers for login (`make_basic_auth`)
//! - Fixed test IDs (tenants, subjects, seed users)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use useradm_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     // Forge an identity in a tenant
//!     let auth = make_auth(TEST_SUBJECT_FOO, Some(TEST_TENANT_1));
//!
//!     // Decompose tokens returned by login
//!     token.assert_valid_token().assert_tenant(TEST_TENANT_1);
//! }
//! ```

pub mod assertions;
pub mod basic_auth;
pub mod forge;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use basic_auth::*;
pub use common::jwt::{decompose, JwtDecodeError, TokenParts};
pub use forge::*;
pub use test_ids::*;
