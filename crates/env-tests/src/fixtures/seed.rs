//! User seeding.
//!
//! Creates batches of users through the CLI, optionally per tenant, and
//! reads them back through the management API under a forged identity.

use crate::fixtures::cli::{CliClient, CliError};
use crate::fixtures::mgmt_client::{ApiClientError, ManagementApiClient, User};
use common::secret::Credentials;
use std::collections::HashMap;
use thiserror::Error;
use useradm_test_utils::{make_auth, seed_email, SEED_PASSWORD, TEST_SUBJECT_FOO};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("User creation failed: {0}")]
    Cli(#[from] CliError),

    #[error("User listing failed: {0}")]
    Api(#[from] ApiClientError),
}

/// Credentials of the `count` users seeded for `tenant`.
pub fn seed_credentials(tenant: Option<&str>, count: usize) -> Vec<Credentials> {
    (0..count)
        .map(|i| Credentials::new(seed_email(i, tenant), SEED_PASSWORD))
        .collect()
}

/// Create `count` users via the CLI, optionally in `tenant`.
///
/// Users left over from an earlier run count as seeded.
pub async fn seed_users(
    cli: &CliClient,
    tenant: Option<&str>,
    count: usize,
) -> Result<Vec<Credentials>, CliError> {
    let credentials = seed_credentials(tenant, count);
    for creds in &credentials {
        match cli.create_user(creds, None, tenant).await {
            Ok(()) => {}
            Err(CliError::CommandFailed { stderr, .. }) if is_duplicate_user(&stderr) => {
                tracing::debug!(
                    target: "env_tests.seed",
                    email = %creds.email,
                    "User already exists, keeping it"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(credentials)
}

fn is_duplicate_user(stderr: &str) -> bool {
    stderr.contains("already exists")
}

/// Seed `count` users into each tenant and list every tenant's users as
/// seen by a forged identity in that tenant.
pub async fn seed_tenant_users(
    cli: &CliClient,
    mgmt: &ManagementApiClient,
    tenants: &[&str],
    count: usize,
) -> Result<HashMap<String, Vec<User>>, SeedError> {
    let mut tenant_users = HashMap::new();

    for tenant in tenants {
        seed_users(cli, Some(tenant), count).await?;
        let users = mgmt
            .get_users(Some(&make_auth(TEST_SUBJECT_FOO, Some(tenant))))
            .await?;
        tenant_users.insert((*tenant).to_string(), users);
    }

    Ok(tenant_users)
}
