//! The login flow state machine.

use crate::error::{AuthError, Result};
use crate::messages::{self, MessageKind};
use crate::session::{OtpSession, OtpStatus, Session};
use crate::view::{CountdownDisplay, ViewCoordinator};
use otpi_core::{AppConfig, Email, OtpCode, Tab};
use otpi_gateway::{AuthGateway, GatewayError, LogoutOutcome, Registered};
use otpi_timer::{format_mm_ss, CountdownListener, CountdownTimer, RunId, UrgencyThresholds};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::time::Instant;

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// How long a code stays valid
    pub otp_duration_secs: u32,
    /// When the countdown turns orange and red
    pub thresholds: UrgencyThresholds,
    /// Form shown when nobody is signed in
    pub initial_tab: Tab,
}

impl ControllerSettings {
    /// Settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            otp_duration_secs: config.otp.duration_secs,
            thresholds: UrgencyThresholds::new(
                config.otp.warning_threshold_secs,
                config.otp.critical_threshold_secs,
            ),
            initial_tab: config.ui.initial_tab,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            otp_duration_secs: 90,
            thresholds: UrgencyThresholds::default(),
            initial_tab: Tab::Login,
        }
    }
}

/// Largest tolerated gap between a tick and the deadline, in seconds.
const MAX_DRIFT_SECS: u64 = 1;

struct State {
    otp: OtpSession,
    session: Option<Session>,
    tab: Tab,
    timer: CountdownTimer,
    /// Bumped whenever an in-flight response would no longer apply
    epoch: u64,
    /// Tag of the most recent code request
    request_seq: u64,
}

struct Inner<V: ViewCoordinator> {
    gateway: Arc<dyn AuthGateway>,
    view: V,
    settings: ControllerSettings,
    state: Mutex<State>,
    listener: Arc<dyn CountdownListener>,
}

impl<V: ViewCoordinator> Inner<V> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_locked(&self, state: &mut State) {
        state.timer.stop();
        if state.otp.status() != OtpStatus::Idle {
            tracing::debug!(generation = state.otp.generation(), "challenge cancelled");
        }
        state.otp = OtpSession::idle();
        state.epoch += 1;
    }

    fn expire_locked(&self, state: &mut State) {
        state.timer.stop();
        state.otp.expire();
        tracing::info!(generation = state.otp.generation(), "one-time code expired");
        self.view.show_expired();
    }

    fn refuse_if_signed_in_locked(&self, state: &State) -> Result<()> {
        if state.session.is_some() {
            self.view
                .show_message(MessageKind::Warning, messages::ALREADY_SIGNED_IN);
            return Err(AuthError::AlreadySignedIn);
        }
        Ok(())
    }

    fn show_tab_locked(&self, state: &mut State, tab: Tab) {
        self.cancel_locked(state);
        state.tab = tab;
        self.view.hide_otp_entry();
        self.view.show_tab(tab);
    }
}

/// Drives the one-time-code login flow.
///
/// Owns the countdown timer and the current challenge, talks to the service
/// through an [`AuthGateway`], and tells a [`ViewCoordinator`] what to show.
/// Cloning yields another handle to the same controller.
pub struct OtpController<V: ViewCoordinator> {
    inner: Arc<Inner<V>>,
}

impl<V: ViewCoordinator> Clone for OtpController<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: ViewCoordinator> OtpController<V> {
    /// Create a controller with no challenge and nobody signed in.
    pub fn new(gateway: Arc<dyn AuthGateway>, view: V, settings: ControllerSettings) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<V>>| Inner {
            gateway,
            view,
            settings,
            state: Mutex::new(State {
                otp: OtpSession::idle(),
                session: None,
                tab: settings.initial_tab,
                timer: CountdownTimer::new(),
                epoch: 0,
                request_seq: 0,
            }),
            listener: Arc::new(TimerBridge {
                inner: weak.clone(),
            }),
        });
        Self { inner }
    }

    /// Check for an existing remote session and show the matching view.
    ///
    /// A failed check is not fatal: the login form is shown with a warning.
    pub async fn bootstrap(&self) -> Result<Option<Session>> {
        let result = self.inner.gateway.check_session().await;

        let inner = &self.inner;
        let mut state = inner.lock();
        match result {
            Ok(Some(user)) => {
                let session = Session::new(user.name, user.email);
                tracing::info!("existing session found");
                inner.cancel_locked(&mut state);
                inner.view.hide_otp_entry();
                inner.view.show_dashboard(&session);
                state.session = Some(session.clone());
                Ok(Some(session))
            }
            Ok(None) => {
                tracing::debug!("no active session");
                let tab = inner.settings.initial_tab;
                inner.show_tab_locked(&mut state, tab);
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session check failed");
                let tab = inner.settings.initial_tab;
                inner.show_tab_locked(&mut state, tab);
                inner
                    .view
                    .show_message(MessageKind::Warning, messages::BOOTSTRAP_FAILED);
                Err(err.into())
            }
        }
    }

    /// Ask the service to send a code to `email` and start the countdown.
    ///
    /// A request while a code is pending replaces that challenge.
    pub async fn request_code(&self, email: &str) -> Result<()> {
        self.send_code(email).await
    }

    /// Request a fresh code after the previous one expired.
    pub async fn resend(&self, email: &str) -> Result<()> {
        {
            let state = self.inner.lock();
            self.inner.refuse_if_signed_in_locked(&state)?;
            if state.otp.status() != OtpStatus::Expired {
                self.inner
                    .view
                    .show_message(MessageKind::Error, messages::RESEND_UNAVAILABLE);
                return Err(AuthError::ResendUnavailable);
            }
        }
        self.send_code(email).await
    }

    async fn send_code(&self, email: &str) -> Result<()> {
        let inner = &self.inner;
        inner.refuse_if_signed_in_locked(&inner.lock())?;
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(err) => {
                let _state = inner.lock();
                inner
                    .view
                    .show_message(MessageKind::Error, messages::EMAIL_REQUIRED);
                return Err(err.into());
            }
        };

        let (epoch, seq) = {
            let mut state = inner.lock();
            state.request_seq += 1;
            (state.epoch, state.request_seq)
        };

        tracing::debug!(epoch, seq, "requesting one-time code");
        let result = inner.gateway.request_otp(&email).await;

        let mut state = inner.lock();
        if state.epoch != epoch || state.request_seq != seq {
            tracing::debug!(epoch, seq, "discarding superseded code request response");
            return Err(AuthError::Stale);
        }

        // Only a new challenge invalidates in-flight verifications.
        match result {
            Ok(requested) => {
                state.epoch += 1;
                let generation = state.epoch;
                let duration = inner.settings.otp_duration_secs;
                let run = state.timer.start(duration, Arc::clone(&inner.listener));
                state.otp = OtpSession::pending(email, duration, generation, run);
                tracing::info!(generation, run = run.get(), "one-time code sent");

                inner.view.clear_otp_input();
                inner.view.reveal_otp_entry();
                inner.view.show_message(
                    MessageKind::Success,
                    requested.message.as_deref().unwrap_or(messages::OTP_SENT),
                );
                Ok(())
            }
            Err(err) => {
                let text = match &err {
                    GatewayError::Rejected { detail, .. } => {
                        messages::request_failed(detail.as_deref())
                    }
                    _ => messages::TRANSPORT_ERROR.to_string(),
                };
                log_gateway_failure("code request", &err);
                inner.view.show_message(MessageKind::Error, &text);
                Err(err.into())
            }
        }
    }

    /// Submit `code` for `email`.
    ///
    /// A rejected code leaves the countdown running so the user can retry.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<Session> {
        let inner = &self.inner;
        inner.refuse_if_signed_in_locked(&inner.lock())?;
        let parsed = Email::parse(email).and_then(|email| Ok((email, OtpCode::parse(code)?)));
        let (email, code) = match parsed {
            Ok(pair) => pair,
            Err(err) => {
                let _state = inner.lock();
                inner
                    .view
                    .show_message(MessageKind::Error, messages::EMAIL_AND_CODE_REQUIRED);
                return Err(err.into());
            }
        };

        let epoch = inner.lock().epoch;
        tracing::debug!(epoch, "verifying one-time code");
        let result = inner.gateway.verify_otp(&email, &code).await;

        let mut state = inner.lock();
        if state.epoch != epoch {
            tracing::debug!(epoch, "discarding superseded verification response");
            return Err(AuthError::Stale);
        }

        match result {
            Ok(outcome) if outcome.login => {
                state.timer.stop();
                state.otp.verify();
                tracing::info!(generation = state.otp.generation(), "one-time code verified");

                let name = outcome
                    .name
                    .filter(|name| !name.is_empty())
                    .or_else(|| outcome.email.clone())
                    .unwrap_or_else(|| email.to_string());
                let session = Session::new(name, outcome.email.or_else(|| Some(email.to_string())));

                state.otp = OtpSession::idle();
                state.epoch += 1;
                inner.view.hide_otp_entry();
                inner.view.show_dashboard(&session);
                inner.view.show_message(
                    MessageKind::Success,
                    &messages::login_succeeded(session.name()),
                );
                state.session = Some(session.clone());
                Ok(session)
            }
            Ok(outcome) => {
                let text = outcome
                    .message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| messages::INVALID_CODE.to_string());
                tracing::debug!("code not accepted");
                inner.view.show_message(MessageKind::Error, &text);
                Err(AuthError::AuthenticationRejected(text))
            }
            Err(err) => {
                let text = match &err {
                    GatewayError::Rejected { detail, .. } => {
                        messages::verify_failed(detail.as_deref())
                    }
                    _ => messages::TRANSPORT_ERROR.to_string(),
                };
                log_gateway_failure("verification", &err);
                inner.view.show_message(MessageKind::Error, &text);
                Err(err.into())
            }
        }
    }

    /// Expire the pending code now.
    ///
    /// Returns `false` when no code was pending.
    pub fn expire_now(&self) -> bool {
        let mut state = self.inner.lock();
        if state.otp.status() != OtpStatus::Pending {
            return false;
        }
        self.inner.expire_locked(&mut state);
        true
    }

    /// Stop the countdown and drop the current challenge.
    ///
    /// Responses to requests issued before the cancel are discarded.
    pub fn cancel(&self) {
        let mut state = self.inner.lock();
        self.inner.cancel_locked(&mut state);
    }

    /// Switch between the login and registration forms.
    pub fn switch_tab(&self, tab: Tab) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner.lock();
        inner.refuse_if_signed_in_locked(&state)?;

        tracing::debug!(%tab, "switching tab");
        inner.view.hide_message();
        inner.show_tab_locked(&mut state, tab);
        Ok(())
    }

    /// Create an account and move to the login form on success.
    pub async fn register(&self, name: &str, email: &str) -> Result<Registered> {
        let inner = &self.inner;
        inner.refuse_if_signed_in_locked(&inner.lock())?;
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(err) => {
                let _state = inner.lock();
                inner
                    .view
                    .show_message(MessageKind::Error, messages::EMAIL_REQUIRED);
                return Err(err.into());
            }
        };

        tracing::debug!("registering account");
        let result = inner.gateway.register(name.trim(), &email).await;

        let mut state = inner.lock();
        if state.session.is_some() {
            tracing::debug!("discarding registration response after sign-in");
            return Err(AuthError::Stale);
        }
        match result {
            Ok(registered) => {
                let who = registered
                    .display_name()
                    .unwrap_or(email.as_str())
                    .to_string();
                tracing::info!("account registered");
                inner.show_tab_locked(&mut state, Tab::Login);
                inner.view.prefill_login_email(&email);
                inner
                    .view
                    .show_message(MessageKind::Success, &messages::registered(&who));
                Ok(registered)
            }
            Err(err) => {
                let text = match &err {
                    GatewayError::Rejected { status, detail, .. } => {
                        messages::register_failed(Some(*status), detail.as_deref())
                    }
                    _ => messages::TRANSPORT_ERROR.to_string(),
                };
                log_gateway_failure("registration", &err);
                inner.view.show_message(MessageKind::Error, &text);
                Err(err.into())
            }
        }
    }

    /// End the session and return to the login form.
    ///
    /// The local session is dropped whatever the service answers.
    pub async fn logout(&self) -> Result<LogoutOutcome> {
        let inner = &self.inner;
        {
            let mut state = inner.lock();
            inner.cancel_locked(&mut state);
            inner.view.hide_otp_entry();
        }

        let result = inner.gateway.logout().await;

        let mut state = inner.lock();
        state.session = None;
        inner.show_tab_locked(&mut state, Tab::Login);

        match result {
            Ok(outcome) => {
                let text = match outcome {
                    LogoutOutcome::Confirmed => messages::LOGGED_OUT,
                    LogoutOutcome::Unconfirmed { .. } => messages::LOGGED_OUT_UNCONFIRMED,
                };
                tracing::info!(?outcome, "logged out");
                inner.view.show_message(MessageKind::Info, text);
                Ok(outcome)
            }
            Err(err) => {
                log_gateway_failure("logout", &err);
                inner
                    .view
                    .show_message(MessageKind::Error, messages::LOGOUT_TRANSPORT_ERROR);
                Err(err.into())
            }
        }
    }

    /// Snapshot of the current challenge.
    #[must_use]
    pub fn otp_session(&self) -> OtpSession {
        self.inner.lock().otp.clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    /// The form currently selected.
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.inner.lock().tab
    }

    /// Lifecycle state of the current challenge.
    #[must_use]
    pub fn status(&self) -> OtpStatus {
        self.inner.lock().otp.status()
    }

    /// Seconds left on the current code.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.inner.lock().otp.remaining_seconds()
    }

    /// Whether the countdown is ticking.
    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.inner.lock().timer.is_running()
    }

    /// The settings this controller was built with.
    #[must_use]
    pub fn settings(&self) -> ControllerSettings {
        self.inner.settings
    }

    /// The view being driven.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.inner.view
    }
}

fn log_gateway_failure(operation: &str, err: &GatewayError) {
    if err.is_transport() {
        tracing::error!(error = %err, "{} failed", operation);
    } else {
        tracing::warn!(status = ?err.status(), "{} rejected", operation);
    }
}

/// Routes countdown events back into the controller.
struct TimerBridge<V: ViewCoordinator> {
    inner: Weak<Inner<V>>,
}

impl<V: ViewCoordinator> CountdownListener for TimerBridge<V> {
    fn on_tick(&self, run: RunId, remaining: u32) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.lock();
        if !state.otp.is_driven_by(run) {
            tracing::trace!(run = run.get(), "ignoring tick from retired run");
            return;
        }
        if remaining == 0 {
            // The expiry callback follows immediately.
            return;
        }

        let drift = state.otp.drift_secs(Instant::now(), remaining);
        if drift > MAX_DRIFT_SECS {
            tracing::warn!(run = run.get(), remaining, drift, "countdown drifted from deadline");
        }

        state.otp.set_remaining(remaining);
        inner.view.render_countdown(&CountdownDisplay {
            remaining,
            text: messages::countdown_label(&format_mm_ss(remaining)),
            urgency: inner.settings.thresholds.classify(remaining),
        });
    }

    fn on_expire(&self, run: RunId) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.lock();
        if state.otp.is_driven_by(run) {
            inner.expire_locked(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.otp.duration_secs = 120;
        config.otp.warning_threshold_secs = 45;
        config.otp.critical_threshold_secs = 15;
        config.ui.initial_tab = Tab::Register;

        let settings = ControllerSettings::from_config(&config);
        assert_eq!(settings.otp_duration_secs, 120);
        assert_eq!(settings.thresholds, UrgencyThresholds::new(45, 15));
        assert_eq!(settings.initial_tab, Tab::Register);
    }

    #[test]
    fn test_default_settings_match_default_config() {
        assert_eq!(
            ControllerSettings::default(),
            ControllerSettings::from_config(&AppConfig::default())
        );
    }
}
