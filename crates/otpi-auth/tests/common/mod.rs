//! Shared fixtures for controller tests.

#![allow(dead_code)]

use async_trait::async_trait;
use otpi_auth::{
    ControllerSettings, CountdownDisplay, MessageKind, OtpController, Session, ViewCoordinator,
};
use otpi_core::{Email, OtpCode, Tab};
use otpi_gateway::{
    AuthGateway, GatewayError, LogoutOutcome, OtpRequested, Registered, SessionUser,
    VerifyOutcome,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const EMAIL: &str = "user@example.com";
pub const CODE: &str = "123456";

type GatewayResult<T> = Result<T, GatewayError>;

/// A call the controller made on the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestOtp(String),
    VerifyOtp(String, String),
    Register(String, String),
    CheckSession,
    Logout,
}

/// Gateway answering from queued results.
///
/// An empty queue yields a benign default: a sent code, `login: false`, an
/// empty registration, no session, and a confirmed logout.
#[derive(Default)]
pub struct FakeGateway {
    requests: Mutex<VecDeque<GatewayResult<OtpRequested>>>,
    verifies: Mutex<VecDeque<GatewayResult<VerifyOutcome>>>,
    registrations: Mutex<VecDeque<GatewayResult<Registered>>>,
    sessions: Mutex<VecDeque<GatewayResult<Option<SessionUser>>>>,
    logouts: Mutex<VecDeque<GatewayResult<LogoutOutcome>>>,
    calls: Mutex<Vec<Call>>,
    verify_gate: Mutex<Option<Arc<Notify>>>,
    logout_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_request(&self, result: GatewayResult<OtpRequested>) {
        self.requests.lock().expect("requests lock").push_back(result);
    }

    pub fn push_verify(&self, result: GatewayResult<VerifyOutcome>) {
        self.verifies.lock().expect("verifies lock").push_back(result);
    }

    pub fn push_register(&self, result: GatewayResult<Registered>) {
        self.registrations
            .lock()
            .expect("registrations lock")
            .push_back(result);
    }

    pub fn push_session(&self, result: GatewayResult<Option<SessionUser>>) {
        self.sessions.lock().expect("sessions lock").push_back(result);
    }

    pub fn push_logout(&self, result: GatewayResult<LogoutOutcome>) {
        self.logouts.lock().expect("logouts lock").push_back(result);
    }

    /// Make the next verifications wait until the returned handle is notified.
    pub fn hold_verify(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.verify_gate.lock().expect("gate lock") = Some(Arc::clone(&gate));
        gate
    }

    /// Make the next logouts wait until the returned handle is notified.
    pub fn hold_logout(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.logout_gate.lock().expect("gate lock") = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

fn pop<T>(queue: &Mutex<VecDeque<GatewayResult<T>>>, fallback: T) -> GatewayResult<T> {
    queue
        .lock()
        .expect("queue lock")
        .pop_front()
        .unwrap_or(Ok(fallback))
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn request_otp(&self, email: &Email) -> GatewayResult<OtpRequested> {
        self.record(Call::RequestOtp(email.to_string()));
        pop(&self.requests, OtpRequested::default())
    }

    async fn verify_otp(&self, email: &Email, code: &OtpCode) -> GatewayResult<VerifyOutcome> {
        self.record(Call::VerifyOtp(email.to_string(), code.expose().to_string()));
        let gate = self.verify_gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        pop(&self.verifies, VerifyOutcome::default())
    }

    async fn register(&self, name: &str, email: &Email) -> GatewayResult<Registered> {
        self.record(Call::Register(name.to_string(), email.to_string()));
        pop(&self.registrations, Registered::default())
    }

    async fn check_session(&self) -> GatewayResult<Option<SessionUser>> {
        self.record(Call::CheckSession);
        pop(&self.sessions, None)
    }

    async fn logout(&self) -> GatewayResult<LogoutOutcome> {
        self.record(Call::Logout);
        let gate = self.logout_gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        pop(&self.logouts, LogoutOutcome::Confirmed)
    }
}

pub fn rejected(endpoint: &'static str, status: u16, detail: Option<&str>) -> GatewayError {
    GatewayError::Rejected {
        endpoint,
        status,
        detail: detail.map(str::to_string),
    }
}

pub fn transport_error() -> GatewayError {
    GatewayError::Client("connection refused".to_string())
}

pub fn logged_in(name: &str) -> VerifyOutcome {
    VerifyOutcome {
        login: true,
        name: Some(name.to_string()),
        email: Some(EMAIL.to_string()),
        message: None,
    }
}

pub fn not_logged_in(message: Option<&str>) -> VerifyOutcome {
    VerifyOutcome {
        login: false,
        message: message.map(str::to_string),
        ..VerifyOutcome::default()
    }
}

/// Something the controller asked the view to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Tab(Tab),
    Dashboard(String),
    Message(MessageKind, String),
    HideMessage,
    RevealOtp,
    HideOtp,
    ClearOtpInput,
    Countdown(CountdownDisplay),
    Expired,
    Prefill(String),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().expect("view lock").clone()
    }

    /// Return and forget everything recorded so far.
    pub fn take_events(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.events.lock().expect("view lock"))
    }

    pub fn countdowns(&self) -> Vec<CountdownDisplay> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Countdown(display) => Some(display),
                _ => None,
            })
            .collect()
    }

    pub fn last_message(&self) -> Option<(MessageKind, String)> {
        self.events().into_iter().rev().find_map(|event| match event {
            ViewEvent::Message(kind, text) => Some((kind, text)),
            _ => None,
        })
    }

    pub fn count(&self, wanted: &ViewEvent) -> usize {
        self.events().iter().filter(|event| *event == wanted).count()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().expect("view lock").push(event);
    }
}

impl ViewCoordinator for RecordingView {
    fn show_tab(&self, tab: Tab) {
        self.push(ViewEvent::Tab(tab));
    }

    fn show_dashboard(&self, session: &Session) {
        self.push(ViewEvent::Dashboard(session.name().to_string()));
    }

    fn show_message(&self, kind: MessageKind, text: &str) {
        self.push(ViewEvent::Message(kind, text.to_string()));
    }

    fn hide_message(&self) {
        self.push(ViewEvent::HideMessage);
    }

    fn reveal_otp_entry(&self) {
        self.push(ViewEvent::RevealOtp);
    }

    fn hide_otp_entry(&self) {
        self.push(ViewEvent::HideOtp);
    }

    fn clear_otp_input(&self) {
        self.push(ViewEvent::ClearOtpInput);
    }

    fn render_countdown(&self, display: &CountdownDisplay) {
        self.push(ViewEvent::Countdown(display.clone()));
    }

    fn show_expired(&self) {
        self.push(ViewEvent::Expired);
    }

    fn prefill_login_email(&self, email: &Email) {
        self.push(ViewEvent::Prefill(email.to_string()));
    }
}

pub fn controller(gateway: &Arc<FakeGateway>) -> OtpController<RecordingView> {
    controller_with(gateway, ControllerSettings::default())
}

pub fn controller_with(
    gateway: &Arc<FakeGateway>,
    settings: ControllerSettings,
) -> OtpController<RecordingView> {
    let gateway: Arc<dyn AuthGateway> = gateway.clone();
    OtpController::new(gateway, RecordingView::default(), settings)
}
