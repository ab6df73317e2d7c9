//! Burn countdown bar.

use clap::builder::styling::{AnsiColor, Style};
use std::time::Duration;

pub const BAR_WIDTH: usize = 30;

/// Color band for the remaining share of the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressTone {
    Safe,
    Warning,
    Critical,
}

impl ProgressTone {
    #[must_use]
    pub fn for_progress(progress: f64) -> Self {
        if progress > 50.0 {
            Self::Safe
        } else if progress > 20.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    #[must_use]
    pub fn style(self) -> Style {
        match self {
            Self::Safe => AnsiColor::Green.on_default(),
            Self::Warning => AnsiColor::Yellow.on_default(),
            Self::Critical => AnsiColor::Red.on_default(),
        }
    }
}

/// Renders `progress` (100 down to 0) as a fixed-width bar.
#[must_use]
pub fn render_bar(progress: f64, width: usize) -> String {
    let clamped = progress.clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Seconds left in the countdown, for the label next to the bar.
#[must_use]
pub fn remaining(progress: f64, total: Duration) -> Duration {
    total.mul_f64(progress.clamp(0.0, 100.0) / 100.0)
}
