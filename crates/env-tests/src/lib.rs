//! useradm Integration Test Suite
//!
//! Drives a running user-administration deployment through its
//! administrative CLI and its management/internal HTTP APIs, using forged
//! identities from `useradm-test-utils`.
//!
//! # Features
//!
//! - `smoke`: Service health checks
//! - `cli`: User creation via CLI and login
//! - `multitenant`: Tenant isolation and tenant claims in login tokens
//! - `all`: Enable all test categories
//!
//! # Prerequisites
//!
//! 1. useradm running in multi-tenant test mode (no gateway, identity taken
//!    from unsigned tokens)
//! 2. `USERADM_MGMT_URL` / `USERADM_INTERNAL_URL` pointing at it
//! 3. `USERADM_CLI` able to run the useradm binary (e.g.
//!    `docker exec mender-useradm useradm`)
//! 4. For `multitenant`: useradm's tenantadm address pointing at
//!    `USERADM_FAKE_TENANTADM_ADDR`
//!
//! # Usage
//!
//! ```bash
//! # From repo root - runs 0 live env-tests (no default features)
//! cargo test
//!
//! # Smoke tests only
//! cargo test -p env-tests --features smoke
//!
//! # Full suite
//! cargo test -p env-tests --features all
//! ```

pub mod connection;
pub mod fixtures;
pub mod logging;
pub mod sanitize;
