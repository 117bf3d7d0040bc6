//! Session error types

use thiserror::Error;

/// Interactive-flow failures, each carrying the message shown to the user.
///
/// Restore failures do not appear here: a token the profile check rejects
/// degrades silently to `Anonymous`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    RegistrationFailed(String),

    #[error("{0}")]
    VerificationFailed(String),

    /// The OAuth redirect never produced a stored token, or the session it
    /// set up did not pass the profile check.
    #[error("OAuth login did not complete")]
    OAuthFailed,

    #[error("Storage error: {0}")]
    Storage(#[from] credential_store::CredentialError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
