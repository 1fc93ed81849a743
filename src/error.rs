//! Error types for connect-warden
//!
//! Two layers: `ClientError` for failures talking to the connector
//! management API, and `WardenError` for everything else in the runtime.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for the warden runtime
pub type Result<T> = std::result::Result<T, WardenError>;

/// Result type alias for management-API operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Main error type for the warden runtime
#[derive(Error, Debug)]
pub enum WardenError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Management-API client error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl WardenError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors returned by the connector management-API client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure reaching the management API
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Management API rejected the request; the remote body is embedded
    /// so callers can act on the diagnostic
    #[error("management API returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// Response body exceeded the in-memory cap
    #[error("response body exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

impl ClientError {
    /// Create a rejection error from a status code and response body
    pub fn rejected(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Check if this error is the absence of the connector resource
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Rejected {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }

    /// Check if this error is a transport-level failure (server unreachable)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
