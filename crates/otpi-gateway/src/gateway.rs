//! The gateway trait and its response types.

use crate::error::Result;
use async_trait::async_trait;
use otpi_core::{Email, OtpCode};
use serde::{Deserialize, Serialize};

/// Contract between the login flow and the remote authentication service.
///
/// Implementations should be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Ask the service to mail a one-time code to `email`.
    async fn request_otp(&self, email: &Email) -> Result<OtpRequested>;

    /// Submit a code. A 2xx answer may still report `login: false`.
    async fn verify_otp(&self, email: &Email, code: &OtpCode) -> Result<VerifyOutcome>;

    /// Create an account.
    async fn register(&self, name: &str, email: &Email) -> Result<Registered>;

    /// Look up the session attached to the stored credentials.
    ///
    /// Returns `Ok(None)` when the service reports no active session.
    async fn check_session(&self) -> Result<Option<SessionUser>>;

    /// End the remote session.
    async fn logout(&self) -> Result<LogoutOutcome>;
}

/// Body of a successful code request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRequested {
    /// Confirmation text to show the user
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a 2xx verification answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Whether the code was accepted and a session established
    #[serde(default)]
    pub login: bool,
    /// Display name of the signed-in user
    #[serde(default)]
    pub name: Option<String>,
    /// Email of the signed-in user
    #[serde(default)]
    pub email: Option<String>,
    /// Explanation when `login` is false
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    /// Registered display name
    #[serde(default)]
    pub name: Option<String>,
    /// Registered email
    #[serde(default)]
    pub email: Option<String>,
}

impl Registered {
    /// The name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
    }
}

/// The user attached to an active remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Display name
    pub name: String,
    /// Email, when the service includes it
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a logout call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The service acknowledged the logout
    Confirmed,
    /// The service answered with a non-2xx status
    Unconfirmed {
        /// HTTP status code
        status: u16,
    },
}
