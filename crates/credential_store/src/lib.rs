//! # Credential Store
//!
//! Durable client-side storage for the API bearer token. A saved token stays
//! valid for one day, matching the lifetime of the cookie the website sets,
//! after which `load` treats it as absent.

pub mod error;
pub mod store;

pub use error::CredentialError;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, TOKEN_TTL_SECS};
