//! OTPi Core - Foundation crate for the OTPi login client.
//!
//! This crate provides shared types, error handling, and configuration
//! management that the timer, gateway, and auth crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Validated newtypes (`Email`, `OtpCode`), the `Tab` enum, and `Timestamp`
//!
//! # Example
//!
//! ```rust
//! use otpi_core::{AppConfig, Email};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//! assert_eq!(config.otp.duration_secs, 90);
//!
//! let email = Email::parse("  user@example.com ")?;
//! assert_eq!(email.as_str(), "user@example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, GatewayConfig, LoggingConfig, OtpConfig, UiConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{Email, OtpCode, Tab, Timestamp};
