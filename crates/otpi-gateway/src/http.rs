//! HTTP implementation of [`AuthGateway`].

use crate::error::{GatewayError, Result};
use crate::gateway::{
    AuthGateway, LogoutOutcome, OtpRequested, Registered, SessionUser, VerifyOutcome,
};
use async_trait::async_trait;
use otpi_core::{Email, GatewayConfig, OtpCode};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const REQUEST_OTP_PATH: &str = "/request-otp";
const VERIFY_OTP_PATH: &str = "/verify-otp";
const REGISTER_PATH: &str = "/register";
const ME_PATH: &str = "/me";
const LOGOUT_PATH: &str = "/logout";

/// Maximum number of raw body characters surfaced as an error detail.
const MAX_DETAIL_CHARS: usize = 200;

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
}

/// Gateway backed by a `reqwest` client with a cookie store.
///
/// The cookie store keeps the session cookie set by `/verify-otp` and sends it
/// on `/me` and `/logout`, which is the native-client equivalent of a browser
/// request made with credentials included.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: Client,
    base_url: String,
}

impl HttpAuthGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a gateway for `base_url` with default settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let config = GatewayConfig {
            base_url: base_url.into(),
            ..GatewayConfig::default()
        };
        Self::new(&config)
    }

    /// The base URL endpoint paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &'static str, body: &B) -> Result<Response> {
        tracing::debug!("POST {}", path);
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// Decode a 2xx body or convert a non-2xx answer into `Rejected`.
    async fn expect_success<T: DeserializeOwned>(
        path: &'static str,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!("{} answered {}", path, status);
            return Err(GatewayError::Rejected {
                endpoint: path,
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        decode(path, &body)
    }
}

/// Parse a success body; an empty body decodes as `{}`.
fn decode<T: DeserializeOwned>(path: &'static str, body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| GatewayError::Parse {
        endpoint: path,
        message: e.to_string(),
    })
}

/// Pull the service's `detail` out of an error body.
///
/// A string `detail` is returned verbatim and a structured one as compact
/// JSON. A JSON body without `detail` yields `None`; a non-JSON body is
/// returned as text, truncated.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        },
        Ok(_) => None,
        Err(_) => Some(trimmed.chars().take(MAX_DETAIL_CHARS).collect()),
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn request_otp(&self, email: &Email) -> Result<OtpRequested> {
        let body = EmailBody {
            email: email.as_str(),
        };
        let response = self.post_json(REQUEST_OTP_PATH, &body).await?;
        Self::expect_success(REQUEST_OTP_PATH, response).await
    }

    async fn verify_otp(&self, email: &Email, code: &OtpCode) -> Result<VerifyOutcome> {
        let body = VerifyBody {
            email: email.as_str(),
            code: code.expose(),
        };
        let response = self.post_json(VERIFY_OTP_PATH, &body).await?;
        Self::expect_success(VERIFY_OTP_PATH, response).await
    }

    async fn register(&self, name: &str, email: &Email) -> Result<Registered> {
        let body = RegisterBody {
            name,
            email: email.as_str(),
        };
        let response = self.post_json(REGISTER_PATH, &body).await?;
        Self::expect_success(REGISTER_PATH, response).await
    }

    async fn check_session(&self) -> Result<Option<SessionUser>> {
        tracing::debug!("GET {}", ME_PATH);
        let response = self.client.get(self.endpoint(ME_PATH)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered {}, treating as logged out", ME_PATH, status);
            return Ok(None);
        }

        let body = response.text().await?;
        decode(ME_PATH, &body).map(Some)
    }

    async fn logout(&self) -> Result<LogoutOutcome> {
        tracing::debug!("POST {}", LOGOUT_PATH);
        let response = self.client.post(self.endpoint(LOGOUT_PATH)).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(LogoutOutcome::Confirmed)
        } else {
            tracing::warn!("{} answered {}", LOGOUT_PATH, status);
            Ok(LogoutOutcome::Unconfirmed {
                status: status.as_u16(),
            })
        }
    }
}
