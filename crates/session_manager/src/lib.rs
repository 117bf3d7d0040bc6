//! # Session Manager
//!
//! Owns the authenticated-user state machine for the Amsterdam client:
//! restore-on-startup, login, registration, email verification, logout and
//! OAuth callback reconciliation. All token mutation is routed through this
//! crate, so the in-memory state and the stored token cannot diverge; the
//! transport only reads the store and reports 401s over a channel.

pub mod error;
pub mod manager;
pub mod structs;

// Re-exports
pub use error::SessionError;
pub use manager::SessionManager;
pub use structs::{RegisterOutcome, RegisterProfile, SessionEvent, SessionState};

// Re-export the profile model for convenience
pub use amsterdam_client::models::User;
