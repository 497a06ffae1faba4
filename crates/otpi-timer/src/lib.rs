//! OTPi Timer - the countdown bound to one-time code expiry.
//!
//! A [`CountdownTimer`] owns at most one scheduled run. Each run ticks once
//! immediately, then once per second, and reports expiry exactly once when
//! the remaining time reaches zero.
//!
//! Runs are tagged with a [`RunId`]. Starting a new run retires the previous
//! id before the new task is spawned, so ticks from two runs never interleave
//! and nothing fires after [`CountdownTimer::stop`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod countdown;
pub mod display;

pub use countdown::{CountdownListener, CountdownTimer, RunId, TICK_PERIOD};
pub use display::{format_mm_ss, Urgency, UrgencyThresholds};
