use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401. Any `{"error": ...}` message is kept; the
    /// unauthorized event has already been signaled by the middleware.
    #[error("unauthorized: {}", message.as_deref().unwrap_or("token rejected"))]
    Unauthorized { message: Option<String> },

    /// The server answered with another non-success status.
    #[error("api error ({status}): {}", message.as_deref().unwrap_or("no error message"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// Building the client or decoding a response body failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The human-readable message from the API's `{"error": ...}` payload,
    /// when one was present.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Api { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Whether this error came from a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
