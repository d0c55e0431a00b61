use paracord_util::validation::ValidationError;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
///
/// The core never inspects or retries these; they reach the caller as-is.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request to {path} returned {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing permission: {permission}")]
    PermissionDenied { permission: &'static str },
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
