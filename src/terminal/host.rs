//! [`ViewHost`] backed by the terminal.

use super::{
    Console,
    progress::{BAR_WIDTH, ProgressTone, remaining, render_bar},
};
use crate::viewer::{Notice, Route, ViewHost};
use clap::builder::styling::{AnsiColor, Effects, Style};
use secrecy::{ExposeSecret, SecretString};
use std::{
    io::Write,
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::info;

pub struct TerminalHost {
    console: Console,
    route: Mutex<Option<Route>>,
}

impl TerminalHost {
    #[must_use]
    pub fn new(console: Console) -> Self {
        Self {
            console,
            route: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Last route requested through [`ViewHost::navigate`].
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        *self.route.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prints the revealed message inside a frame.
    pub fn show_message(&self, message: &SecretString) {
        let title = self.console.paint(
            AnsiColor::Cyan.on_default() | Effects::BOLD,
            "Secret message",
        );
        let hint = self.console.paint(
            Style::new() | Effects::DIMMED,
            "This message will be destroyed after viewing.",
        );
        self.console.write(|out| {
            writeln!(out, "\n{title}")?;
            writeln!(out, "{}", "-".repeat(BAR_WIDTH + 8))?;
            writeln!(out, "{}", message.expose_secret())?;
            writeln!(out, "{}", "-".repeat(BAR_WIDTH + 8))?;
            writeln!(out, "{hint}")
        });
    }

    /// Redraws the countdown bar in place.
    pub fn show_progress(&self, progress: f64, total: Duration) {
        let tone = ProgressTone::for_progress(progress);
        let bar = self.console.paint(tone.style(), &render_bar(progress, BAR_WIDTH));
        let left = remaining(progress, total).as_secs_f64();
        self.console.write(|out| write!(out, "\r{bar} {left:>4.1}s"));
    }
}

impl ViewHost for TerminalHost {
    fn notify(&self, notice: Notice) {
        self.console.notice(&notice);
    }

    fn navigate(&self, route: Route) {
        info!(route = route.path(), "navigating");
        *self.route.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
        self.console
            .write(|out| writeln!(out, "Returning to {}", route.path()));
    }

    fn burn_started(&self) {
        let label = self.console.paint(
            AnsiColor::Red.on_default() | Effects::BOLD,
            "Burning secret...",
        );
        self.console.write(|out| writeln!(out, "\n{label}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::testing::{buffer_console, contents};

    #[test]
    fn notices_are_printed_with_title() {
        let (console, buffer) = buffer_console();
        let host = TerminalHost::new(console);
        host.notify(Notice::error("Error", "The provided passphrase is incorrect"));
        assert_eq!(
            contents(&buffer),
            "Error: The provided passphrase is incorrect\n"
        );
    }

    #[test]
    fn navigation_is_recorded() {
        let (console, buffer) = buffer_console();
        let host = TerminalHost::new(console);
        assert_eq!(host.route(), None);
        host.navigate(Route::Create);
        assert_eq!(host.route(), Some(Route::Create));
        assert!(contents(&buffer).contains("Returning to /"));
    }

    #[test]
    fn progress_redraws_in_place() {
        let (console, buffer) = buffer_console();
        let host = TerminalHost::new(console);
        host.show_progress(50.0, Duration::from_millis(5000));
        let output = contents(&buffer);
        assert!(output.starts_with('\r'));
        assert!(output.ends_with(" 2.5s"));
    }

    #[test]
    fn message_is_framed() {
        let (console, buffer) = buffer_console();
        let host = TerminalHost::new(console);
        host.show_message(&SecretString::from("meet at dawn".to_string()));
        let output = contents(&buffer);
        assert!(output.contains("Secret message"));
        assert!(output.contains("meet at dawn"));
    }
}
