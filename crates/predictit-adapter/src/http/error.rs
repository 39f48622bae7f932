/*
[INPUT]:  Error sources (HTTP, API, serialization, auth, WebSocket feeds)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the PredictIt adapter
#[derive(Error, Debug)]
pub enum PredictItError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// A feed connection ended without a transport error
    #[error("{feed} feed closed by server")]
    FeedClosed { feed: &'static str },

    /// The dispatch loop is gone and can no longer accept events
    #[error("dispatch queue closed")]
    QueueClosed,

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PredictItError {
    /// Check if the error is worth restarting the client for
    pub fn is_retryable(&self) -> bool {
        match self {
            PredictItError::Http(_)
            | PredictItError::WebSocket(_)
            | PredictItError::FeedClosed { .. }
            | PredictItError::InvalidResponse(_) => true,
            PredictItError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        match self {
            PredictItError::Authentication { .. } => true,
            PredictItError::Api { code, .. } => *code == 401 || *code == 403,
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        PredictItError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for PredictItError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        PredictItError::WebSocket(err.to_string())
    }
}

/// Result type alias for PredictIt operations
pub type Result<T> = std::result::Result<T, PredictItError>;
