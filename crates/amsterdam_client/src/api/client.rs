//! Client construction and the shared request helpers.

use std::sync::Arc;
use std::time::Duration;

use credential_store::CredentialStore;
use log::info;
use reqwest::{Client, Method, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use crate::api::models::Health;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::middleware::{BearerAuth, UnauthorizedEvent};

/// Error payload the API uses on failures. The message is optional because
/// some responses (proxies, crashes) carry no JSON body at all.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the Amsterdam website API.
///
/// Every request goes through retry middleware for transient failures and
/// bearer-auth middleware that attaches the stored token.
pub struct AmsterdamClient {
    http: ClientWithMiddleware,
    api_base: String,
}

impl AmsterdamClient {
    /// Build a client against `config.api_base`.
    ///
    /// `unauthorized_tx`, when set, receives one event per 401 response;
    /// the session layer listens on the other end.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        unauthorized_tx: Option<UnboundedSender<UnauthorizedEvent>>,
    ) -> Result<Self> {
        let api_base = config.api_base.trim_end_matches('/').to_string();
        Url::parse(&api_base)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let http = Self::build_middleware_client(client, store, unauthorized_tx);

        Ok(AmsterdamClient { http, api_base })
    }

    fn build_middleware_client(
        client: Client,
        store: Arc<dyn CredentialStore>,
        unauthorized_tx: Option<UnboundedSender<UnauthorizedEvent>>,
    ) -> ClientWithMiddleware {
        // Exponential backoff with jitter, transient failures only
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(BearerAuth::new(store, unauthorized_tx))
            .build()
    }

    /// The base URL requests are issued against, without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// GET /health
    pub async fn health(&self) -> Result<Health> {
        self.get_json("/health").await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// POST with no request body and no interest in the response body.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        let response = self.execute(Method::POST, path, None::<&()>).await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&B>,
    ) -> Result<Response> {
        let url = self.endpoint(path);
        let mut request = self.http.request(method.clone(), url.as_str());
        if let Some(body) = json_body {
            request = request.json(body);
        }

        info!("Sending {method} request to {url}");
        let response = request.send().await?;
        info!("Got response from {url} with status {}", response.status());

        Ok(response)
    }

    /// Map non-success statuses to [`ApiError`], extracting the `{"error"}`
    /// message when the body has one.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { message });
        }
        Err(ApiError::Api { status, message })
    }
}
