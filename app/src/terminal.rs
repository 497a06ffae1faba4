//! Line-oriented rendering of the login flow.

use otpi_auth::{CountdownDisplay, MessageKind, OtpStatus, Session, ViewCoordinator};
use otpi_core::{Email, Tab};
use otpi_timer::Urgency;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Countdown values printed even when the urgency has not changed.
const COUNTDOWN_MILESTONES: [u32; 4] = [60, 30, 10, 5];

#[derive(Default)]
struct Screen {
    last_urgency: Option<Urgency>,
}

/// A [`ViewCoordinator`] that prints to a writer, normally stdout.
///
/// A countdown that ticks every second would drown the prompt, so only the
/// first value, urgency changes, and a few milestones are printed.
pub struct TerminalView<W: Write + Send + 'static> {
    out: Mutex<W>,
    screen: Mutex<Screen>,
}

impl TerminalView<io::Stdout> {
    /// A view printing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalView<W> {
    /// A view printing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            screen: Mutex::new(Screen::default()),
        }
    }

    /// Print a line that did not come from the controller.
    pub fn notice(&self, text: &str) {
        self.line(text);
    }

    /// Print a one-line summary of the controller state.
    pub fn print_status(
        &self,
        tab: Tab,
        status: OtpStatus,
        remaining: u32,
        session: Option<&Session>,
    ) {
        let text = match (session, status) {
            (Some(session), _) => format!(
                "signed in as {} since {}",
                session.name(),
                session.signed_in_at()
            ),
            (None, OtpStatus::Pending) => format!(
                "{tab} form, code pending ({})",
                otpi_timer::format_mm_ss(remaining)
            ),
            (None, OtpStatus::Expired) => format!("{tab} form, code expired"),
            (None, OtpStatus::Idle | OtpStatus::Verified) => format!("{tab} form"),
        };
        self.line(&text);
    }

    /// Consume the view and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }

    fn reset_countdown(&self) {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_urgency = None;
    }
}

fn message_tag(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Error => "[error]",
        MessageKind::Success => "[ok]",
        MessageKind::Info => "[info]",
        MessageKind::Warning => "[warn]",
    }
}

fn urgency_marker(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Normal => "",
        Urgency::Warning => " !",
        Urgency::Critical => " !!",
    }
}

impl<W: Write + Send + 'static> ViewCoordinator for TerminalView<W> {
    fn show_tab(&self, tab: Tab) {
        let hint = match tab {
            Tab::Login => "request <email>, then verify <email> <code>",
            Tab::Register => "register <email> [name]",
        };
        self.line(&format!("== {tab} == ({hint})"));
    }

    fn show_dashboard(&self, session: &Session) {
        let email = session.email().unwrap_or("-");
        self.line(&format!("== dashboard == {} <{email}>", session.name()));
    }

    fn show_message(&self, kind: MessageKind, text: &str) {
        self.line(&format!("{} {text}", message_tag(kind)));
    }

    fn hide_message(&self) {}

    fn reveal_otp_entry(&self) {
        self.reset_countdown();
        self.line("enter the code with: verify <email> <code>");
    }

    fn hide_otp_entry(&self) {
        self.reset_countdown();
    }

    fn clear_otp_input(&self) {}

    fn render_countdown(&self, display: &CountdownDisplay) {
        let changed = {
            let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = screen.last_urgency != Some(display.urgency);
            screen.last_urgency = Some(display.urgency);
            changed
        };
        if changed || COUNTDOWN_MILESTONES.contains(&display.remaining) {
            self.line(&format!("{}{}", display.text, urgency_marker(display.urgency)));
        }
    }

    fn show_expired(&self) {
        self.reset_countdown();
        self.line(&format!(
            "{} (resend <email>)",
            otpi_auth::messages::CODE_EXPIRED
        ));
    }

    fn prefill_login_email(&self, email: &Email) {
        self.line(&format!("login email set to {email}"));
    }
}
