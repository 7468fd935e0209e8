//! Error types for the service adapters.

use reqwest::StatusCode;
use thiserror::Error;

/// Problems with the local configuration. All of them are fatal at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing credential: set {0} in the environment or a .env file")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Failures talking to the Pinecone control or data plane.
#[derive(Error, Debug)]
pub enum PineconeError {
    #[error("authentication rejected ({status}): {body}")]
    Unauthorized { status: StatusCode, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server error ({status}): {body}")]
    Server { status: StatusCode, body: String },

    #[error("request rejected ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("vector for record '{id}' has dimension {actual}, index expects {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("index '{0}' did not become ready in time")]
    NotReady(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PineconeError {
    /// Whether resending the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PineconeError::RateLimited(_) | PineconeError::Server { .. } => true,
            PineconeError::Transport(err) => !err.is_builder() && !err.is_decode(),
            _ => false,
        }
    }

    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                PineconeError::Unauthorized { status, body }
            }
            StatusCode::NOT_FOUND => PineconeError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => PineconeError::RateLimited(body),
            s if s.is_server_error() => PineconeError::Server { status, body },
            _ => PineconeError::Status { status, body },
        }
    }
}

/// Failures reading the question dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to download dataset: {0}")]
    Download(#[from] reqwest::Error),

    #[error("line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: record has no usable id")]
    MissingId { line: usize },
}
