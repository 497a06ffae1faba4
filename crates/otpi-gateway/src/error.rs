//! Error types for the gateway client.

use thiserror::Error;

/// Errors that can occur while talking to the authentication service.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The service answered with a non-2xx status
    #[error("{endpoint} rejected with status {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected {
        /// Endpoint path
        endpoint: &'static str,
        /// HTTP status code
        status: u16,
        /// The service's `detail` field, if any
        detail: Option<String>,
    },

    /// Network error (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body could not be decoded
    #[error("failed to parse response from {endpoint}: {message}")]
    Parse {
        /// Endpoint path
        endpoint: &'static str,
        /// Error message
        message: String,
    },

    /// The HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl GatewayError {
    /// Server-provided detail for a rejected request.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status for a rejected request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened below the service's business logic.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
