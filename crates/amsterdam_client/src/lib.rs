//! HTTP client for the Amsterdam website API.
//!
//! Wraps reqwest with retry and bearer-auth middleware and exposes typed
//! wrappers for the auth, calculator, content and admin endpoints. The
//! bearer token is read from a [`credential_store::CredentialStore`] on
//! every request; 401 responses are reported to the session layer over a
//! channel instead of being handled here.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;

pub use api::client::AmsterdamClient;
pub use api::models;
pub use config::ClientConfig;
pub use error::ApiError;
pub use middleware::UnauthorizedEvent;
pub use reqwest::StatusCode;
