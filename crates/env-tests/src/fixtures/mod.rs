//! Test fixtures for interacting with the useradm deployment.

pub mod cli;
pub mod fake_tenantadm;
pub mod internal_client;
pub mod mgmt_client;
pub mod seed;

pub use cli::CliClient;
pub use fake_tenantadm::FakeTenantadm;
pub use internal_client::InternalApiClient;
pub use mgmt_client::{ApiClientError, LoginResponse, ManagementApiClient, User};
