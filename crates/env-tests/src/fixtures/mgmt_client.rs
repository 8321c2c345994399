//! Management API client fixture.
//!
//! Covers login with basic auth and user listing/creation under forged
//! bearer identities.

use crate::sanitize::sanitize_error_body;
use common::secret::{Credentials, ExposeSecret};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use useradm_test_utils::{make_auth, make_basic_auth, AuthHeaders, TEST_SUBJECT_FOO};

/// Path prefix of the management API.
pub const MGMT_API_PREFIX: &str = "/api/management/v1/useradm";

/// API client errors, shared by the management and internal clients.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ApiClientError {
    /// HTTP status of a failed request, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::RequestFailed { status, .. } => Some(*status),
            ApiClientError::HttpError(e) => e.status().map(|s| s.as_u16()),
            ApiClientError::JsonError(_) => None,
        }
    }
}

/// Successful login: the raw token returned by the service.
#[derive(Clone)]
pub struct LoginResponse {
    pub status: u16,
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("status", &self.status)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// A user as listed by the management API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub created_ts: Option<String>,
    #[serde(default)]
    pub updated_ts: Option<String>,
}

/// Attach every header of `auth` to a request.
pub(crate) fn with_headers(mut request: RequestBuilder, auth: &AuthHeaders) -> RequestBuilder {
    for (name, value) in auth {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

/// Turn a non-success response into `RequestFailed` with a sanitized body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiClientError::RequestFailed {
        status: status.as_u16(),
        body: sanitize_error_body(&body),
    })
}

/// Client for the useradm management API.
#[derive(Debug, Clone)]
pub struct ManagementApiClient {
    base_url: String,
    http_client: Client,
}

impl ManagementApiClient {
    /// Create a new management client with its own HTTP client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a management client sharing an existing HTTP client.
    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, MGMT_API_PREFIX, path)
    }

    /// Log in with basic auth, returning the raw response.
    pub async fn raw_login(&self, credentials: &Credentials) -> Result<Response, ApiClientError> {
        let authorization = make_basic_auth(
            &credentials.email,
            credentials.password.expose_secret(),
        );

        let response = self
            .http_client
            .post(self.url("/auth/login"))
            .header("Authorization", authorization)
            .send()
            .await?;

        Ok(response)
    }

    /// Log in with basic auth and return the issued token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiClientError> {
        tracing::info!(target: "env_tests.mgmt", email = %credentials.email, "Logging in");

        let response = ensure_success(self.raw_login(credentials).await?).await?;
        let status = response.status().as_u16();
        let token = response.text().await?;

        Ok(LoginResponse { status, token })
    }

    /// List users visible to `auth`.
    ///
    /// Without `auth`, a forged identity for subject `foo` in no tenant is
    /// used.
    pub async fn get_users(&self, auth: Option<&AuthHeaders>) -> Result<Vec<User>, ApiClientError> {
        let default_auth;
        let auth = match auth {
            Some(auth) => auth,
            None => {
                default_auth = make_auth(TEST_SUBJECT_FOO, None);
                &default_auth
            }
        };

        let request = with_headers(self.http_client.get(self.url("/users")), auth);
        let response = ensure_success(request.send().await?).await?;

        let body = response.text().await?;
        let users: Vec<User> = serde_json::from_str(&body)?;
        Ok(users)
    }

    /// Create a user through the API.
    pub async fn create_user(
        &self,
        auth: &AuthHeaders,
        credentials: &Credentials,
    ) -> Result<StatusCode, ApiClientError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let request = with_headers(self.http_client.post(self.url("/users")), auth).json(&body);
        let response = ensure_success(request.send().await?).await?;

        Ok(response.status())
    }
}
