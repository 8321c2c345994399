//! Harness configuration loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default base URL of the useradm service in the compose test setup.
pub const DEFAULT_SERVICE_URL: &str = "http://mender-useradm:8080";

/// Default administrative CLI command.
pub const DEFAULT_CLI_COMMAND: &str = "useradm";

/// Default listen address of the fake tenantadm service.
pub const DEFAULT_FAKE_TENANTADM_ADDR: &str = "0.0.0.0:9999";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid boolean for {name}: {value}")]
    InvalidBool { name: String, value: String },

    #[error("Invalid integer for {name}: {value}")]
    InvalidInteger { name: String, value: String },

    #[error("{0} must not be empty")]
    Empty(String),
}

/// Observability settings for the harness process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` expression)
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Where the service under test lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the management API
    pub mgmt_url: String,
    /// Base URL of the internal API
    pub internal_url: String,
    /// Administrative CLI command, program first
    pub cli_command: Vec<String>,
    /// Accept unsigned tokens when parsing identities
    pub trust_unsigned: bool,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Address the fake tenantadm listens on (useradm is configured to
    /// resolve tenants there)
    pub fake_tenantadm_addr: String,
    pub observability: ObservabilityConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mgmt_url: DEFAULT_SERVICE_URL.to_string(),
            internal_url: DEFAULT_SERVICE_URL.to_string(),
            cli_command: vec![DEFAULT_CLI_COMMAND.to_string()],
            trust_unsigned: true,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            fake_tenantadm_addr: DEFAULT_FAKE_TENANTADM_ADDR.to_string(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn parse_bool(
    vars: &HashMap<String, String>,
    name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name: name.to_string(),
                value: v,
            }),
        },
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// See [`HarnessConfig::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a boolean or integer variable cannot be
    /// parsed, or the CLI command is blank.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mgmt_url = vars
            .get("USERADM_MGMT_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        let internal_url = vars
            .get("USERADM_INTERNAL_URL")
            .cloned()
            .unwrap_or_else(|| mgmt_url.clone());

        let cli_command: Vec<String> = match vars.get("USERADM_CLI") {
            Some(cmd) => cmd.split_whitespace().map(ToString::to_string).collect(),
            None => vec![DEFAULT_CLI_COMMAND.to_string()],
        };
        if cli_command.is_empty() {
            return Err(ConfigError::Empty("USERADM_CLI".to_string()));
        }

        let trust_unsigned = parse_bool(vars, "USERADM_TRUST_UNSIGNED", true)?;

        let http_timeout_secs = match vars.get("USERADM_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidInteger {
                    name: "USERADM_HTTP_TIMEOUT_SECS".to_string(),
                    value: v.clone(),
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let fake_tenantadm_addr = vars
            .get("USERADM_FAKE_TENANTADM_ADDR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FAKE_TENANTADM_ADDR.to_string());

        let observability = ObservabilityConfig {
            log_level: vars
                .get("HARNESS_LOG")
                .cloned()
                .unwrap_or_else(|| ObservabilityConfig::default().log_level),
            json_logs: parse_bool(vars, "HARNESS_LOG_JSON", false)?,
        };

        Ok(HarnessConfig {
            mgmt_url: mgmt_url.trim_end_matches('/').to_string(),
            internal_url: internal_url.trim_end_matches('/').to_string(),
            cli_command,
            trust_unsigned,
            http_timeout: Duration::from_secs(http_timeout_secs),
            fake_tenantadm_addr,
            observability,
        })
    }
}
