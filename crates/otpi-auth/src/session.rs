//! The one-time-code challenge and the authenticated session.

use otpi_core::{Email, Timestamp};
use otpi_timer::RunId;
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle of a one-time-code challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OtpStatus {
    /// No challenge in flight
    #[default]
    Idle,
    /// A code was sent and the countdown is running
    Pending,
    /// The countdown reached zero; only resend is offered
    Expired,
    /// The code was accepted
    Verified,
}

/// One in-flight challenge.
#[derive(Debug, Clone, Default)]
pub struct OtpSession {
    email: Option<Email>,
    status: OtpStatus,
    remaining_seconds: u32,
    deadline: Option<Instant>,
    generation: u64,
    run: Option<RunId>,
}

impl OtpSession {
    /// A session with no challenge.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn pending(email: Email, duration_secs: u32, generation: u64, run: RunId) -> Self {
        Self {
            email: Some(email),
            status: OtpStatus::Pending,
            remaining_seconds: duration_secs,
            deadline: Some(Instant::now() + Duration::from_secs(u64::from(duration_secs))),
            generation,
            run: Some(run),
        }
    }

    /// The identity the code was requested for.
    #[must_use]
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> OtpStatus {
        self.status
    }

    /// Seconds left before the code expires.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// When the code expires, on the runtime's clock.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Tag of the request that created this challenge.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `run` is the countdown driving this challenge.
    pub(crate) fn is_driven_by(&self, run: RunId) -> bool {
        self.status == OtpStatus::Pending && self.run == Some(run)
    }

    pub(crate) fn set_remaining(&mut self, remaining: u32) {
        self.remaining_seconds = remaining;
    }

    pub(crate) fn expire(&mut self) {
        self.status = OtpStatus::Expired;
        self.remaining_seconds = 0;
        self.run = None;
    }

    pub(crate) fn verify(&mut self) {
        self.status = OtpStatus::Verified;
        self.run = None;
    }

    /// Seconds between the tick value and the deadline-derived remaining time.
    #[must_use]
    pub fn drift_secs(&self, now: Instant, remaining: u32) -> u64 {
        let Some(deadline) = self.deadline else {
            return 0;
        };
        let left = deadline.saturating_duration_since(now);
        let expected = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        expected.abs_diff(u64::from(remaining))
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    name: String,
    email: Option<String>,
    signed_in_at: Timestamp,
}

impl Session {
    /// Create a session established now.
    #[must_use]
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email,
            signed_in_at: Timestamp::now(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email, when known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// When this client saw the session established.
    #[must_use]
    pub fn signed_in_at(&self) -> Timestamp {
        self.signed_in_at
    }
}
