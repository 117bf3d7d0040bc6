//! Bearer-auth middleware.
//!
//! Attaches the stored token to every outgoing request and reports 401
//! responses to the session layer. The middleware never mutates the store;
//! reconciling state after a rejected token is the session manager's job.

use std::sync::Arc;

use credential_store::CredentialStore;
use http::Extensions;
use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use tokio::sync::mpsc::UnboundedSender;

/// Sent once per 401 response so the session layer can reconcile its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnauthorizedEvent;

pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
    unauthorized_tx: Option<UnboundedSender<UnauthorizedEvent>>,
}

impl BearerAuth {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        unauthorized_tx: Option<UnboundedSender<UnauthorizedEvent>>,
    ) -> Self {
        Self {
            store,
            unauthorized_tx,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Some(token) = self.store.load().await {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    req.headers_mut().insert(AUTHORIZATION, value);
                }
                Err(e) => warn!("Stored token is not a valid header value: {e}"),
            }
        }

        let response = next.run(req, extensions).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Got 401 from {}, notifying session layer", response.url());
            if let Some(tx) = &self.unauthorized_tx {
                // The receiver may be gone during shutdown; nothing to do then.
                let _ = tx.send(UnauthorizedEvent);
            }
        }

        Ok(response)
    }
}
