//! Line input from stdin.
//!
//! Lines are read on a dedicated OS thread and forwarded over a channel, so a
//! pending read never keeps the async runtime from shutting down.

use std::io::{self, BufRead};
use tokio::{io::AsyncReadExt, sync::mpsc};
use tracing::debug;

/// Forwards lines from `reader` until EOF, a read error, or the receiver is
/// dropped. Trailing `\r` is stripped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    let line = line.strip_suffix('\r').map(str::to_string).unwrap_or(line);
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    debug!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });
    receiver
}

#[must_use]
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}

/// Reads stdin to EOF.
///
/// # Errors
/// Returns an error if stdin cannot be read or is not UTF-8.
pub async fn read_stdin() -> io::Result<String> {
    let mut buffer = String::new();
    tokio::io::stdin().read_to_string(&mut buffer).await?;
    Ok(buffer)
}
