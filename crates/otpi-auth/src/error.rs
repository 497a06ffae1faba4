//! Error types for the login flow.

use otpi_core::CoreError;
use otpi_gateway::GatewayError;
use thiserror::Error;

/// Errors returned by controller operations.
///
/// Every error has already been surfaced to the view as a message (except
/// [`AuthError::Stale`]) by the time the caller sees it.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was empty; no network call was made
    #[error("validation error: {0}")]
    Validation(#[from] CoreError),

    /// Resend requested while the current code is still valid
    #[error("resend is only available once the code has expired")]
    ResendUnavailable,

    /// A view change that requires being signed out
    #[error("already signed in")]
    AlreadySignedIn,

    /// The service answered with a non-2xx status
    #[error("service rejected the request (status {status}): {}", detail.as_deref().unwrap_or("no detail"))]
    ServiceRejected {
        /// HTTP status code
        status: u16,
        /// The service's `detail` field
        detail: Option<String>,
    },

    /// The code was checked and not accepted
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Network or decoding failure
    #[error("transport failure: {0}")]
    Transport(#[source] GatewayError),

    /// The response belonged to a challenge that was superseded or cancelled
    #[error("response discarded: challenge superseded or cancelled")]
    Stale,
}

impl From<GatewayError> for AuthError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, detail, .. } => Self::ServiceRejected { status, detail },
            other => Self::Transport(other),
        }
    }
}

/// Result type for login flow operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_rejection_maps_to_service_rejected() {
        let err: AuthError = GatewayError::Rejected {
            endpoint: "/request-otp",
            status: 429,
            detail: Some("too many requests".to_string()),
        }
        .into();
        assert!(matches!(
            err,
            AuthError::ServiceRejected { status: 429, .. }
        ));
        assert_eq!(
            err.to_string(),
            "service rejected the request (status 429): too many requests"
        );
    }

    #[test]
    fn test_gateway_transport_maps_to_transport() {
        let err: AuthError = GatewayError::Client("tls backend unavailable".to_string()).into();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[test]
    fn test_validation_from_core() {
        let err: AuthError = CoreError::MissingField("code").into();
        assert_eq!(
            err.to_string(),
            "validation error: missing required field: code"
        );
    }
}
