//! P0 Smoke Tests: Service Health
//!
//! These tests validate that useradm is reachable. All other tests depend on
//! these passing.

#![cfg(feature = "smoke")]

use env_tests::connection::ServiceConnection;
use env_tests::logging::init_test_tracing;
use std::time::Duration;

/// Helper to create a service connection for tests.
fn connection() -> ServiceConnection {
    let connection = ServiceConnection::from_env()
        .expect("Failed to load harness configuration - check USERADM_* variables");
    init_test_tracing(&connection.config().observability);
    connection
}

#[tokio::test]
async fn test_health_endpoint() {
    let connection = connection();

    connection
        .wait_until_healthy(Duration::from_secs(30))
        .await
        .expect("useradm health endpoint should respond");
}

#[tokio::test]
async fn test_alive_endpoint() {
    let connection = connection();

    connection
        .internal()
        .alive()
        .await
        .expect("useradm alive endpoint should respond");
}

#[tokio::test]
async fn test_users_listing_accepts_forged_identity() {
    let connection = connection();

    connection
        .mgmt()
        .get_users(None)
        .await
        .expect("useradm should trust the forged identity in test mode");
}
