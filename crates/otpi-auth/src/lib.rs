//! OTPi Auth - One-time-code login flow.
//!
//! [`OtpController`] is the state machine behind the login screen. It asks an
//! [`otpi_gateway::AuthGateway`] to send and check codes, runs the validity
//! countdown, and tells a [`ViewCoordinator`] what to show.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --request_code--> Pending --countdown ends--> Expired --resend--> Pending
//!                           |
//!                           +--verify_code (login)--> Verified --> signed-in Session
//! ```
//!
//! Logout, a tab switch, and `cancel` return the challenge to `Idle`. Every
//! gateway call captures the controller's epoch before awaiting; a response
//! that arrives after a newer request or a cancel is discarded with
//! [`AuthError::Stale`] and never reaches the view.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod controller;
pub mod error;
pub mod messages;
pub mod session;
pub mod view;

pub use controller::{ControllerSettings, OtpController};
pub use error::{AuthError, Result};
pub use messages::MessageKind;
pub use session::{OtpSession, OtpStatus, Session};
pub use view::{CountdownDisplay, ViewCoordinator};
