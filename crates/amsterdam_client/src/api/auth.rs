//! Authentication endpoints.

use crate::api::client::AmsterdamClient;
use crate::api::models::{
    AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, RegisterResponse, User,
    VerifyEmailRequest,
};
use crate::error::Result;

impl AmsterdamClient {
    /// POST /auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.post_json("/auth/register", request).await
    }

    /// POST /auth/verify-email
    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<AuthResponse> {
        self.post_json("/auth/verify-email", request).await
    }

    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.post_json("/auth/login", request).await
    }

    /// POST /auth/logout. The response body carries nothing of interest.
    pub async fn logout(&self) -> Result<()> {
        self.post_empty("/auth/logout").await
    }

    /// GET /auth/profile, unwrapping the `{user}` envelope.
    pub async fn profile(&self) -> Result<User> {
        let response: ProfileResponse = self.get_json("/auth/profile").await?;
        Ok(response.user)
    }

    /// The Google OAuth entry point. Opening it in a browser starts the
    /// provider redirect; the server finishes by setting the token cookie.
    pub fn google_auth_url(&self) -> String {
        self.endpoint("/auth/google")
    }
}
