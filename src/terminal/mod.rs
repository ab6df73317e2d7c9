//! Terminal rendering for the CLI: notices, the burn progress bar, destruction
//! animations and clipboard access. Everything writes through a shared
//! [`Console`] so concurrent writers never interleave partial lines.

pub mod animation;
pub mod clipboard;
pub mod host;
pub mod input;
pub mod progress;

pub use animation::TerminalAnimation;
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use host::TerminalHost;
pub use progress::{ProgressTone, render_bar};

use crate::viewer::{Notice, NoticeLevel};
use clap::builder::styling::{AnsiColor, Effects, Style};
use std::{
    io::{self, IsTerminal, Write},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;

#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<dyn Write + Send>>,
    color: bool,
}

impl Console {
    /// Console on stderr, colored when stderr is a terminal.
    #[must_use]
    pub fn stderr() -> Self {
        let color = io::stderr().is_terminal();
        Self::new(Arc::new(Mutex::new(io::stderr())), color)
    }

    #[must_use]
    pub fn new(out: Arc<Mutex<dyn Write + Send>>, color: bool) -> Self {
        Self { out, color }
    }

    #[must_use]
    pub fn is_color(&self) -> bool {
        self.color
    }

    /// Runs `render` with exclusive access to the output. Write errors are
    /// logged and otherwise ignored.
    pub fn write(&self, render: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = render(&mut *out).and_then(|()| out.flush()) {
            debug!("terminal write failed: {err}");
        }
    }

    /// Prints a notice as `title: description`, colored by level.
    pub fn notice(&self, notice: &Notice) {
        let style = match notice.level {
            NoticeLevel::Info => AnsiColor::Blue.on_default(),
            NoticeLevel::Success => AnsiColor::Green.on_default(),
            NoticeLevel::Error => AnsiColor::Red.on_default(),
        } | Effects::BOLD;
        let title = self.paint(style, &notice.title);
        self.write(|out| writeln!(out, "{title}: {}", notice.description));
    }

    #[must_use]
    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{}{text}{}", style.render(), style.render_reset())
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Console;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Console backed by an in-memory buffer.
    pub fn buffer_console() -> (Console, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (Console::new(buffer.clone(), false), buffer)
    }

    pub fn contents(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&buffer.lock().unwrap_or_else(PoisonError::into_inner)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_is_plain_without_color() {
        let (console, _) = testing::buffer_console();
        assert_eq!(console.paint(AnsiColor::Red.on_default(), "boom"), "boom");
    }

    #[test]
    fn paint_wraps_text_when_colored() {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let console = Console::new(buffer, true);
        let painted = console.paint(AnsiColor::Green.on_default(), "ok");
        assert!(painted.contains("ok"));
        assert!(painted.starts_with('\u{1b}'));
    }

    #[test]
    fn write_goes_to_the_shared_buffer() {
        let (console, buffer) = testing::buffer_console();
        console.write(|out| writeln!(out, "hello"));
        assert_eq!(testing::contents(&buffer), "hello\n");
    }
}
