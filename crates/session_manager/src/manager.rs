//! Session Manager service

use std::sync::Arc;
use std::time::Duration;

use amsterdam_client::models::{
    AuthResponse, LoginRequest, RegisterRequest, RegisteredUser, User, VerifyEmailRequest,
};
use amsterdam_client::{AmsterdamClient, ApiError, UnauthorizedEvent};
use credential_store::CredentialStore;
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::error::{Result, SessionError};
use crate::structs::{RegisterOutcome, RegisterProfile, SessionEvent, SessionState};

/// How long the OAuth callback waits for the redirect's cookie side effect.
const OAUTH_COOKIE_WAIT: Duration = Duration::from_secs(1);
const OAUTH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the current session state and every transition into or out of it.
///
/// One instance per client process, shared behind an `Arc`. The credential
/// store is only ever written from here; the transport reads it to attach
/// the bearer header and reports 401s through the unauthorized channel.
pub struct SessionManager {
    client: Arc<AmsterdamClient>,
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    events_tx: Option<UnboundedSender<SessionEvent>>,
}

impl SessionManager {
    /// Create a new SessionManager in the `Unknown` state.
    ///
    /// `events_tx`, when set, receives [`SessionEvent`]s the embedding UI
    /// should react to (currently only `Unauthorized`).
    pub fn new(
        client: Arc<AmsterdamClient>,
        store: Arc<dyn CredentialStore>,
        events_tx: Option<UnboundedSender<SessionEvent>>,
    ) -> Self {
        Self {
            client,
            store,
            state: RwLock::new(SessionState::Unknown),
            events_tx,
        }
    }

    /// The current state, cloned.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Re-establish the session from a previously stored token.
    ///
    /// Runs once at startup. A missing token, an expired one, or a profile
    /// check that errors for whatever reason all degrade silently to
    /// `Anonymous`; a rejected token is cleared from the store.
    pub async fn restore(&self) -> SessionState {
        if self.store.load().await.is_none() {
            let mut state = self.state.write().await;
            *state = SessionState::Anonymous;
            return state.clone();
        }

        match self.client.profile().await {
            Ok(user) => {
                info!("Session restored for {}", user.email);
                let mut state = self.state.write().await;
                *state = SessionState::Authenticated(user);
                state.clone()
            }
            Err(e) => {
                debug!("Stored token rejected, dropping it: {e}");
                if let Err(e) = self.store.clear().await {
                    warn!("Failed to clear rejected token: {e}");
                }
                let mut state = self.state.write().await;
                *state = SessionState::Anonymous;
                state.clone()
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On failure the state is left as it was and the error carries the
    /// API's message, or "Login failed" when the payload had none.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .login(&request)
            .await
            .map_err(|e| SessionError::AuthenticationFailed(flow_message(e, "Login failed")))?;

        self.establish(response).await
    }

    /// Register a new account.
    ///
    /// The server either logs the user in immediately or answers with only
    /// a pending user id, in which case the state stays `Anonymous` until
    /// [`Self::verify_email`] succeeds.
    pub async fn register(&self, profile: RegisterProfile) -> Result<RegisterOutcome> {
        let request = RegisterRequest {
            email: profile.email,
            password: profile.password,
            first_name: profile.first_name,
            last_name: profile.last_name,
            age: profile.age,
        };
        let response = self
            .client
            .register(&request)
            .await
            .map_err(|e| SessionError::RegistrationFailed(flow_message(e, "Registration failed")))?;

        match (response.access_token, response.user) {
            (Some(access_token), RegisteredUser::Full(user)) => {
                let user = self.establish(AuthResponse { access_token, user }).await?;
                Ok(RegisterOutcome::LoggedIn(user))
            }
            // No token means verification pending, whatever the user shape.
            (_, RegisteredUser::Full(user)) => {
                Ok(RegisterOutcome::VerificationRequired { user_id: user.id })
            }
            (_, RegisteredUser::Pending { id }) => {
                Ok(RegisterOutcome::VerificationRequired { user_id: id })
            }
        }
    }

    /// Exchange a pending user id and the emailed 6-digit code for a
    /// session. The code is not validated locally; the server decides.
    pub async fn verify_email(&self, user_id: i64, verification_code: &str) -> Result<User> {
        let request = VerifyEmailRequest {
            user_id,
            verification_code: verification_code.to_string(),
        };
        let response = self.client.verify_email(&request).await.map_err(|e| {
            SessionError::VerificationFailed(flow_message(e, "Email verification failed"))
        })?;

        self.establish(response).await
    }

    /// Log out.
    ///
    /// Local state clears first and unconditionally; the remote logout
    /// notification is best effort and its failure is swallowed.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored token on logout: {e}");
        }
        *self.state.write().await = SessionState::Anonymous;

        if let Err(e) = self.client.logout().await {
            debug!("Remote logout failed (ignored): {e}");
        }
    }

    /// React to the transport reporting a 401: drop the stored token and the
    /// in-memory state together, then tell the UI.
    pub async fn handle_unauthorized(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored token after 401: {e}");
        }
        *self.state.write().await = SessionState::Anonymous;
        self.emit(SessionEvent::Unauthorized);
    }

    /// Forward 401 reports from the transport into [`Self::handle_unauthorized`].
    /// The task ends when the sending side of the channel is dropped.
    pub fn spawn_unauthorized_listener(
        self: &Arc<Self>,
        mut rx: UnboundedReceiver<UnauthorizedEvent>,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                manager.handle_unauthorized().await;
            }
        })
    }

    /// Finish a Google OAuth login after the provider redirect, waiting up
    /// to one second for the token cookie to land.
    pub async fn complete_oauth_login(&self) -> Result<User> {
        self.complete_oauth_login_within(OAUTH_COOKIE_WAIT).await
    }

    /// Finish a Google OAuth login, waiting up to `wait` for the token.
    ///
    /// The server sets the token as a side effect of the redirect, so this
    /// polls the credential store until the token shows up, then confirms
    /// the session against the profile endpoint. On timeout the state
    /// settles at `Anonymous`.
    pub async fn complete_oauth_login_within(&self, wait: Duration) -> Result<User> {
        let deadline = Instant::now() + wait;
        while self.store.load().await.is_none() {
            if Instant::now() >= deadline {
                *self.state.write().await = SessionState::Anonymous;
                return Err(SessionError::OAuthFailed);
            }
            sleep(OAUTH_POLL_INTERVAL).await;
        }

        match self.restore().await {
            SessionState::Authenticated(user) => Ok(user),
            _ => Err(SessionError::OAuthFailed),
        }
    }

    /// Store the token and switch to `Authenticated` in one step, keeping
    /// the stored token and the in-memory state in lockstep.
    async fn establish(&self, response: AuthResponse) -> Result<User> {
        self.store.save(&response.access_token).await?;
        *self.state.write().await = SessionState::Authenticated(response.user.clone());
        Ok(response.user)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events_tx {
            // The UI may have shut down already; dropped events are fine.
            let _ = tx.send(event);
        }
    }
}

/// The API's error message when it sent one, otherwise `fallback`.
fn flow_message(error: ApiError, fallback: &str) -> String {
    match error.api_message() {
        Some(message) => message.to_string(),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amsterdam_client::ClientConfig;
    use credential_store::MemoryCredentialStore;

    fn offline_manager() -> (Arc<SessionManager>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let config = ClientConfig::with_api_base("http://localhost:59999/api");
        let client = AmsterdamClient::new(
            &config,
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            None,
        )
        .expect("client");
        let manager = Arc::new(SessionManager::new(Arc::new(client), store.clone(), None));
        (manager, store)
    }

    #[tokio::test]
    async fn test_initial_state_is_unknown() {
        let (manager, _store) = offline_manager();
        assert_eq!(manager.state().await, SessionState::Unknown);
    }

    #[tokio::test]
    async fn test_restore_without_token_goes_anonymous() {
        // No token stored, so restore must not touch the network at all.
        let (manager, _store) = offline_manager();

        let state = manager.restore().await;

        assert_eq!(state, SessionState::Anonymous);
        assert_eq!(manager.state().await, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_handle_unauthorized_clears_both_sides() {
        let (manager, store) = offline_manager();
        store.save("tok1").await.unwrap();

        manager.handle_unauthorized().await;

        assert_eq!(manager.state().await, SessionState::Anonymous);
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_oauth_times_out_without_token() {
        let (manager, _store) = offline_manager();

        let result = manager
            .complete_oauth_login_within(Duration::from_millis(50))
            .await;

        assert!(matches!(result, Err(SessionError::OAuthFailed)));
        assert_eq!(manager.state().await, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_flow_message_fallback() {
        let error = ApiError::Api {
            status: amsterdam_client::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(flow_message(error, "Login failed"), "Login failed");

        let error = ApiError::Unauthorized {
            message: Some("Invalid email or password".to_string()),
        };
        assert_eq!(
            flow_message(error, "Login failed"),
            "Invalid email or password"
        );
    }
}
