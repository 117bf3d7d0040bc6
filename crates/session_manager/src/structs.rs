//! Session state types

use amsterdam_client::models::User;

/// Where the session currently stands.
///
/// `Unknown` only exists between construction and the first `restore` call;
/// UI must not trust the Anonymous/Authenticated distinction before then.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// The current user profile, when authenticated.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// What a successful registration produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// The server logged the user in immediately.
    LoggedIn(User),
    /// The server wants the email verified first; keep the id for
    /// [`crate::SessionManager::verify_email`].
    VerificationRequired { user_id: i64 },
}

/// Registration form data.
#[derive(Debug, Clone)]
pub struct RegisterProfile {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

/// Out-of-band notifications for the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The API rejected the stored token mid-session. Local state has been
    /// cleared; the UI should return to its login entry point.
    Unauthorized,
}
