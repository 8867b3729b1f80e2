use thiserror::Error;

/// Failures that abort the whole program. Everything else is reported
/// at the call site and the session continues.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("profile '{0}' not found in ~/.aws/config")]
    ProfileNotFound(String),

    #[error("SSO login failed for profile '{0}'")]
    LoginFailed(String),

    #[error("could not read AWS config file: {0}")]
    ConfigRead(#[from] std::io::Error),
}
