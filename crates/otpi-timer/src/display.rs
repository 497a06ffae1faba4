//! Countdown presentation helpers.

/// Format remaining seconds as zero-padded `MM:SS`.
#[must_use]
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Visual urgency of the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    /// Plenty of time left (green)
    Normal,
    /// At or below the warning threshold (orange)
    Warning,
    /// At or below the critical threshold (red, pulsing)
    Critical,
}

/// Remaining-time thresholds at which the countdown changes urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyThresholds {
    /// Seconds at or below which the countdown is `Warning`
    pub warning_secs: u32,
    /// Seconds at or below which the countdown is `Critical`
    pub critical_secs: u32,
}

impl UrgencyThresholds {
    /// Create thresholds; `critical_secs` should not exceed `warning_secs`.
    #[must_use]
    pub fn new(warning_secs: u32, critical_secs: u32) -> Self {
        Self {
            warning_secs,
            critical_secs,
        }
    }

    /// Classify a remaining value.
    #[must_use]
    pub fn classify(&self, remaining: u32) -> Urgency {
        if remaining <= self.critical_secs {
            Urgency::Critical
        } else if remaining <= self.warning_secs {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self::new(30, 10)
    }
}
