//! SSO session gate: validate credentials through the aws CLI, and run
//! `aws sso login` when they are missing or expired.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::SessionError;

async fn credentials_valid(profile: &str) -> bool {
    match Command::new("aws")
        .args(["sts", "get-caller-identity", "--profile", profile])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

/// Validate the profile's SSO session, starting an interactive login
/// when the current credentials do not work. Login failure is fatal to
/// the whole program.
pub async fn ensure_logged_in(profile: &str) -> Result<(), SessionError> {
    if credentials_valid(profile).await {
        debug!(profile, "existing SSO credentials are valid");
        return Ok(());
    }

    println!("SSO session for '{profile}' is missing or expired, starting login...");
    let status = Command::new("aws")
        .args(["sso", "login", "--profile", profile])
        .status()
        .await
        .map_err(|_| SessionError::LoginFailed(profile.to_string()))?;

    if !status.success() {
        return Err(SessionError::LoginFailed(profile.to_string()));
    }
    Ok(())
}
