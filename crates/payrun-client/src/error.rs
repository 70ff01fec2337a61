use payrun_core::CoreError;
use thiserror::Error;

/// Errors produced by the HTTP clients before they cross the gateway seam
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    /// The service answered with a non-success status or payload
    #[error("Service reported failure: {0}")]
    ServiceFailure(String),

    /// Login or token exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => CoreError::TransportError(e.to_string()),
            ClientError::MalformedResponse(msg) => CoreError::TransportError(msg),
            ClientError::ServiceFailure(msg) => CoreError::ServiceError(msg),
            ClientError::Authentication(msg) => CoreError::AuthenticationError(msg),
        }
    }
}
