//! Internal API client fixture.

use crate::fixtures::mgmt_client::{ensure_success, ApiClientError};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Path prefix of the internal API.
pub const INTERNAL_API_PREFIX: &str = "/api/internal/v1/useradm";

/// Body of the tenant creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewTenant {
    pub tenant_id: String,
}

/// Client for the useradm internal API.
#[derive(Debug, Clone)]
pub struct InternalApiClient {
    base_url: String,
    http_client: Client,
}

impl InternalApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, INTERNAL_API_PREFIX, path)
    }

    /// Check the service health endpoint.
    pub async fn health(&self) -> Result<(), ApiClientError> {
        let response = self.http_client.get(self.url("/health")).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Check the liveness endpoint.
    pub async fn alive(&self) -> Result<(), ApiClientError> {
        let response = self.http_client.get(self.url("/alive")).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Provision a tenant (creates and migrates its database).
    pub async fn create_tenant(&self, tenant_id: &str) -> Result<StatusCode, ApiClientError> {
        tracing::info!(target: "env_tests.internal", tenant_id = tenant_id, "Creating tenant");

        let body = NewTenant {
            tenant_id: tenant_id.to_string(),
        };

        let response = self
            .http_client
            .post(self.url("/tenants"))
            .json(&body)
            .send()
            .await?;

        Ok(ensure_success(response).await?.status())
    }

    /// Ask the service to verify a token for a forwarded request.
    ///
    /// Returns the status code whether or not verification succeeded, so
    /// tests can assert on rejections.
    pub async fn verify(
        &self,
        token: &str,
        forwarded_uri: &str,
        forwarded_method: &str,
    ) -> Result<StatusCode, ApiClientError> {
        let response = self
            .http_client
            .post(self.url("/auth/verify"))
            .header("Authorization", format!("Bearer {}", token))
            .header("X-Forwarded-Uri", forwarded_uri)
            .header("X-Forwarded-Method", forwarded_method)
            .send()
            .await?;

        Ok(response.status())
    }
}
