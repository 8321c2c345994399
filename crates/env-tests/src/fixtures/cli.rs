//! Administrative CLI fixture.
//!
//! Runs the useradm binary (or whatever command wraps it, e.g.
//! `docker exec mender-useradm useradm`) to create users directly in the
//! store, bypassing the HTTP APIs.

use common::secret::{Credentials, ExposeSecret};
use thiserror::Error;
use tokio::process::Command;

/// CLI fixture errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to spawn CLI command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("CLI command is empty")]
    EmptyCommand,

    #[error("CLI command `{subcommand}` failed with status {status:?}: {stderr}")]
    CommandFailed {
        subcommand: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// Client for the useradm administrative CLI.
#[derive(Debug, Clone)]
pub struct CliClient {
    command: Vec<String>,
}

impl CliClient {
    /// Create a client running `command` (program first, then fixed args).
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Create a user.
    ///
    /// `user_id` forces the id of the new user; `tenant_id` creates it in
    /// that tenant's database.
    pub async fn create_user(
        &self,
        credentials: &Credentials,
        user_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> Result<(), CliError> {
        tracing::info!(
            target: "env_tests.cli",
            email = %credentials.email,
            user_id = user_id,
            tenant_id = tenant_id,
            "Creating user via CLI"
        );

        let args = create_user_args(credentials, user_id, tenant_id);
        self.run("create-user", &args).await
    }

    /// Run database migrations, optionally for a single tenant.
    pub async fn migrate(&self, tenant_id: Option<&str>) -> Result<(), CliError> {
        let mut args = Vec::new();
        if let Some(tenant) = tenant_id {
            args.push("--tenant".to_string());
            args.push(tenant.to_string());
        }
        self.run("migrate", &args).await
    }

    async fn run(&self, subcommand: &str, args: &[String]) -> Result<(), CliError> {
        let (program, fixed_args) = self.command.split_first().ok_or(CliError::EmptyCommand)?;

        let output = Command::new(program)
            .args(fixed_args)
            .arg(subcommand)
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                target: "env_tests.cli",
                subcommand = subcommand,
                status = ?output.status.code(),
                "CLI command failed"
            );
            return Err(CliError::CommandFailed {
                subcommand: subcommand.to_string(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}

/// Arguments of `create-user`, without the subcommand itself.
fn create_user_args(
    credentials: &Credentials,
    user_id: Option<&str>,
    tenant_id: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "--username".to_string(),
        credentials.email.clone(),
        "--password".to_string(),
        credentials.password.expose_secret().to_string(),
    ];

    if let Some(id) = user_id {
        args.push("--user-id".to_string());
        args.push(id.to_string());
    }

    if let Some(tenant) = tenant_id {
        args.push("--tenant-id".to_string());
        args.push(tenant.to_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_args_minimal() {
        let creds = Credentials::new("foo@bar.com", "1234youseeme");
        let args = create_user_args(&creds, None, None);

        assert_eq!(
            args,
            vec!["--username", "foo@bar.com", "--password", "1234youseeme"]
        );
    }

    #[test]
    fn test_create_user_args_with_id_and_tenant() {
        let creds = Credentials::new("foo@bar.com", "pw");
        let args = create_user_args(&creds, Some("123456"), Some("tenant1id"));

        assert_eq!(
            args,
            vec![
                "--username",
                "foo@bar.com",
                "--password",
                "pw",
                "--user-id",
                "123456",
                "--tenant-id",
                "tenant1id"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let cli = CliClient::new(Vec::new());
        let result = cli.migrate(None).await;
        assert!(matches!(result, Err(CliError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command() {
        // `true create-user ...` ignores its arguments and exits 0
        let cli = CliClient::new(vec!["true".to_string()]);
        let creds = Credentials::new("foo@bar.com", "pw");

        cli.create_user(&creds, None, None)
            .await
            .expect("`true` should succeed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_reports_status() {
        let cli = CliClient::new(vec!["false".to_string()]);
        let result = cli.migrate(Some("tenant1id")).await;

        match result {
            Err(CliError::CommandFailed {
                subcommand, status, ..
            }) => {
                assert_eq!(subcommand, "migrate");
                assert_eq!(status, Some(1));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let cli = CliClient::new(vec!["/nonexistent/useradm-cli-binary".to_string()]);
        let result = cli.migrate(None).await;
        assert!(matches!(result, Err(CliError::Spawn(_))));
    }
}
