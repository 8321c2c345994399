//! Connection to the deployment under test.
//!
//! `ServiceConnection` replaces session-wide fixtures: it is created once
//! per test from [`HarnessConfig`], owns the shared HTTP client, and hands
//! out the fixture clients.

use crate::fixtures::{CliClient, InternalApiClient, ManagementApiClient};
use common::config::{ConfigError, HarnessConfig};
use common::identity::{IdentityParser, TrustMode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid harness configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Service health check failed: {message}")]
    HealthCheckFailed { message: String },
}

/// Handle to the useradm deployment.
pub struct ServiceConnection {
    config: HarnessConfig,
    http_client: reqwest::Client,
}

impl ServiceConnection {
    /// Connect using configuration from the environment.
    pub fn from_env() -> Result<Self, ConnectionError> {
        Self::new(HarnessConfig::from_env()?)
    }

    /// Connect using an explicit configuration.
    pub fn new(config: HarnessConfig) -> Result<Self, ConnectionError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Get the HTTP client for making requests.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn mgmt(&self) -> ManagementApiClient {
        ManagementApiClient::with_client(&self.config.mgmt_url, self.http_client.clone())
    }

    pub fn internal(&self) -> InternalApiClient {
        InternalApiClient::with_client(&self.config.internal_url, self.http_client.clone())
    }

    pub fn cli(&self) -> CliClient {
        CliClient::new(self.config.cli_command.clone())
    }

    /// Identity parser honoring the configured trust mode.
    pub fn identity_parser(&self) -> IdentityParser {
        IdentityParser::new(TrustMode::from_flag(self.config.trust_unsigned))
    }

    /// Check if the service health endpoint is responding.
    pub async fn check_health(&self) -> Result<(), ConnectionError> {
        self.internal()
            .health()
            .await
            .map_err(|e| ConnectionError::HealthCheckFailed {
                message: e.to_string(),
            })
    }

    /// Poll the health endpoint until it succeeds or `timeout` elapses.
    ///
    /// Retries with exponential backoff starting at 250ms, capped at 2s.
    pub async fn wait_until_healthy(&self, timeout: Duration) -> Result<(), ConnectionError> {
        let deadline = Instant::now() + timeout;
        let mut delay = Duration::from_millis(250);

        loop {
            match self.check_health().await {
                Ok(()) => return Ok(()),
                Err(e) if Instant::now() + delay >= deadline => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        target: "env_tests.connection",
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Service not healthy yet"
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(2));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(uri: &str) -> HarnessConfig {
        HarnessConfig {
            mgmt_url: uri.to_string(),
            internal_url: uri.to_string(),
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_identity_parser_follows_config() {
        let trusting = ServiceConnection::new(HarnessConfig::default()).unwrap();
        assert_eq!(trusting.identity_parser().mode(), TrustMode::UnsignedForTesting);

        let strict = ServiceConnection::new(HarnessConfig {
            trust_unsigned: false,
            ..HarnessConfig::default()
        })
        .unwrap();
        assert_eq!(strict.identity_parser().mode(), TrustMode::Verified);
    }

    #[tokio::test]
    async fn test_check_health_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/internal/v1/useradm/health"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let connection = ServiceConnection::new(config_for(&server.uri())).unwrap();
        connection.check_health().await.expect("health should pass");
    }

    #[tokio::test]
    async fn test_wait_until_healthy_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/internal/v1/useradm/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let connection = ServiceConnection::new(config_for(&server.uri())).unwrap();
        let result = connection
            .wait_until_healthy(Duration::from_millis(600))
            .await;

        assert!(matches!(
            result,
            Err(ConnectionError::HealthCheckFailed { message }) if message.contains("503")
        ));
    }
}
