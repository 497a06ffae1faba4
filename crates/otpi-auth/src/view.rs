//! The presentation seam driven by the controller.

use crate::messages::MessageKind;
use crate::session::Session;
use otpi_core::{Email, Tab};
use otpi_timer::Urgency;

/// A rendered countdown value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownDisplay {
    /// Seconds left
    pub remaining: u32,
    /// Label such as `"유효 시간: 01:30"`
    pub text: String,
    /// How close the code is to expiring
    pub urgency: Urgency,
}

/// Applies controller decisions to whatever is showing the login flow.
///
/// The controller calls these while holding its state lock, so
/// implementations must return promptly and must not call back into the
/// controller.
pub trait ViewCoordinator: Send + Sync + 'static {
    /// Show the login or registration form and hide the dashboard.
    fn show_tab(&self, tab: Tab);

    /// Hide the forms and show the signed-in dashboard.
    fn show_dashboard(&self, session: &Session);

    /// Show a banner message.
    fn show_message(&self, kind: MessageKind, text: &str);

    /// Hide the banner message.
    fn hide_message(&self);

    /// Show the code entry field and the live countdown.
    fn reveal_otp_entry(&self);

    /// Hide the code entry field, the countdown, and the resend affordance.
    fn hide_otp_entry(&self);

    /// Clear whatever code was typed previously.
    fn clear_otp_input(&self);

    /// Render one countdown value.
    fn render_countdown(&self, display: &CountdownDisplay);

    /// Replace the countdown with the expired label and offer resend.
    fn show_expired(&self);

    /// Fill the login form's email field.
    fn prefill_login_email(&self, email: &Email);
}
