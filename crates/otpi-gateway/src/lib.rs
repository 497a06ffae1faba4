//! OTPi Gateway - request/response mediator for the remote authentication service.
//!
//! The login flow depends only on the [`AuthGateway`] trait; [`HttpAuthGateway`]
//! implements it over HTTPS with a cookie store so session-bearing calls carry
//! the service's credentials.
//!
//! # Endpoints
//!
//! | Operation | Request | Success body |
//! |---|---|---|
//! | `POST /request-otp` | `{email}` | `{message}` |
//! | `POST /verify-otp` | `{email, code}` | `{login, name?, message?}` |
//! | `POST /register` | `{name, email}` | `{name?, email?}` |
//! | `GET /me` | - | `{name}` |
//! | `POST /logout` | - | any |
//!
//! Non-2xx responses become [`GatewayError::Rejected`] carrying the service's
//! `detail` field, except for `/me` (reported as "no session") and `/logout`
//! (reported as [`LogoutOutcome::Unconfirmed`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod gateway;
pub mod http;

pub use error::{GatewayError, Result};
pub use gateway::{
    AuthGateway, LogoutOutcome, OtpRequested, Registered, SessionUser, VerifyOutcome,
};
pub use http::HttpAuthGateway;
