use shelter_core::BackendFailure;
use thiserror::Error;

/// Errors returned by the shelter backend HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl ClientError {
    /// Collapses the client error into the engine-facing failure taxonomy.
    #[must_use]
    pub fn into_failure(self, endpoint: &str) -> BackendFailure {
        let endpoint = endpoint.to_owned();
        match self {
            ClientError::UnexpectedStatus { status, .. } => {
                BackendFailure::NonSuccessStatus { endpoint, status }
            }
            ClientError::Http(e) => match e.status() {
                Some(status) => BackendFailure::NonSuccessStatus {
                    endpoint,
                    status: status.as_u16(),
                },
                None => BackendFailure::RequestFailed {
                    endpoint,
                    reason: e.to_string(),
                },
            },
            ClientError::Deserialize { source, .. } => BackendFailure::InvalidResponse {
                endpoint,
                reason: source.to_string(),
            },
            ClientError::InvalidBaseUrl { reason, .. } => BackendFailure::RequestFailed {
                endpoint,
                reason,
            },
        }
    }
}
