//! CLI Tests: User Creation
//!
//! Users created through the administrative CLI must be listed by the
//! management API and able to log in.

#![cfg(feature = "cli")]

use common::secret::Credentials;
use env_tests::connection::ServiceConnection;
use env_tests::logging::init_test_tracing;
use useradm_test_utils::{TokenAssertions, TEST_PASSWORD};
use uuid::Uuid;

/// Helper to create a service connection for tests.
fn connection() -> ServiceConnection {
    let connection = ServiceConnection::from_env()
        .expect("Failed to load harness configuration - check USERADM_* variables");
    init_test_tracing(&connection.config().observability);
    connection
}

/// Credentials with a unique email, so runs do not collide in the store.
fn unique_credentials() -> Credentials {
    Credentials::new(format!("foo-{}@bar.com", Uuid::new_v4()), TEST_PASSWORD)
}

#[tokio::test]
async fn test_create_user() {
    let connection = connection();
    let creds = unique_credentials();

    connection
        .cli()
        .create_user(&creds, None, None)
        .await
        .expect("CLI user creation should succeed");

    let users = connection.mgmt().get_users(None).await.unwrap();
    assert!(
        users.iter().any(|u| u.email == creds.email),
        "Created user {} should be listed",
        creds.email
    );
}

#[tokio::test]
async fn test_create_user_login() {
    let connection = connection();
    let creds = unique_credentials();

    connection
        .cli()
        .create_user(&creds, None, None)
        .await
        .expect("CLI user creation should succeed");

    let response = connection
        .mgmt()
        .login(&creds)
        .await
        .expect("Login should succeed for a CLI-created user");

    assert_eq!(response.status, 200);
    assert!(!response.token.is_empty());
    response.token.assert_valid_token().assert_no_tenant();
}

#[tokio::test]
async fn test_create_user_with_id() {
    let connection = connection();
    let creds = unique_credentials();
    let user_id = Uuid::new_v4().to_string();

    connection
        .cli()
        .create_user(&creds, Some(&user_id), None)
        .await
        .expect("CLI user creation with id should succeed");

    let users = connection.mgmt().get_users(None).await.unwrap();
    assert!(
        users
            .iter()
            .any(|u| u.email == creds.email && u.id == user_id),
        "User {} should be listed with id {}",
        creds.email,
        user_id
    );
}

#[tokio::test]
async fn test_login_with_wrong_password_rejected() {
    let connection = connection();
    let creds = unique_credentials();

    connection
        .cli()
        .create_user(&creds, None, None)
        .await
        .unwrap();

    let wrong = Credentials::new(creds.email.clone(), "not-the-password");
    let err = connection
        .mgmt()
        .login(&wrong)
        .await
        .expect_err("Login with a wrong password should fail");

    assert_eq!(err.status(), Some(401), "got: {err}");
}
