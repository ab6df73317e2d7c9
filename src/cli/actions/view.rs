use crate::{
    api::ApiClient,
    cli::commands::api,
    terminal::{Clipboard, Console, SystemClipboard, TerminalAnimation, TerminalHost, input},
    viewer::{Notice, Phase, ViewConfig, ViewController, ViewExit, ViewHandle, ViewHost, ViewSnapshot},
};
use anyhow::{Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::{future::Future, io::Write, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub api: api::Options,
    pub id: String,
    pub passphrase: Option<SecretString>,
    pub copy: bool,
    pub config: ViewConfig,
}

/// What the terminal has already shown for the current view.
#[derive(Default)]
struct Screen {
    /// Value of `submitted` when the passphrase prompt was last printed.
    prompted: Option<u32>,
    revealed: bool,
    copied: bool,
}

/// Terminal side of a running view.
struct Session<L> {
    host: Arc<TerminalHost>,
    preset: Option<SecretString>,
    open_lines: Option<L>,
    lines: Option<mpsc::UnboundedReceiver<String>>,
    copy: bool,
    total: Duration,
    /// Passphrases this session has submitted.
    submitted: u32,
    screen: Screen,
}

/// View a secret once, then wait out the burn and the animation.
/// # Errors
/// Returns an error if the secret cannot be retrieved or stdin closes while a
/// passphrase is needed.
pub async fn execute(args: Args) -> Result<()> {
    let client = Arc::new(ApiClient::new(&args.api.client)?);
    let console = Console::stderr();
    let host = Arc::new(TerminalHost::new(console.clone()));
    let animation =
        Arc::new(TerminalAnimation::new(console).with_hold(args.config.animation_hold));
    let total = args.config.burn_after;

    info!(id = %args.id, "viewing secret");
    let handle = ViewController::new(args.id, client, host.clone(), animation)
        .with_config(args.config)
        .spawn();

    let session = Session::new(host, args.passphrase, input::stdin_lines, args.copy, total);
    drive(handle, session, interrupted()).await
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be listened for.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        debug!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

impl<L> Session<L>
where
    L: FnOnce() -> mpsc::UnboundedReceiver<String>,
{
    fn new(
        host: Arc<TerminalHost>,
        preset: Option<SecretString>,
        open_lines: L,
        copy: bool,
        total: Duration,
    ) -> Self {
        Self {
            host,
            preset,
            open_lines: Some(open_lines),
            lines: None,
            copy,
            total,
            submitted: 0,
            screen: Screen::default(),
        }
    }

    /// The view waits for a passphrase and every earlier submission has been
    /// answered.
    fn ready_for_passphrase(&self, snapshot: &ViewSnapshot) -> bool {
        snapshot.phase == Phase::AwaitingPassphrase && snapshot.rejections >= self.submitted
    }

    fn submit(&mut self, handle: &ViewHandle, passphrase: SecretString) -> Result<()> {
        handle.submit_passphrase(passphrase)?;
        self.submitted += 1;
        Ok(())
    }

    /// Prompts on stdin once per unanswered round and opens the line reader on
    /// first use.
    fn prompt(&mut self) {
        if self.screen.prompted == Some(self.submitted) {
            return;
        }
        let text = if self.submitted == 0 {
            "This secret is protected. Enter the passphrase:"
        } else {
            "Enter the passphrase:"
        };
        self.screen.prompted = Some(self.submitted);
        self.host.console().write(|out| writeln!(out, "{text}"));

        if let Some(open) = self.open_lines.take() {
            self.lines = Some(open());
        }
    }
}

/// Follows the view until it finishes, feeding it passphrases from the preset
/// and then from stdin.
async fn drive<L>(
    handle: ViewHandle,
    mut session: Session<L>,
    interrupt: impl Future<Output = ()>,
) -> Result<()>
where
    L: FnOnce() -> mpsc::UnboundedReceiver<String>,
{
    let mut snapshots = handle.subscribe();
    tokio::pin!(interrupt);

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        render(&session.host, &mut session.screen, &snapshot, session.total);

        if copy_pending(session.copy, &session.screen) {
            if let Some(message) = snapshot.message() {
                session.screen.copied = true;
                copy_message(&session.host, message).await;
            }
        }

        let ready = session.ready_for_passphrase(&snapshot);
        if ready {
            if let Some(passphrase) = session.preset.take() {
                debug!("submitting passphrase from arguments");
                session.submit(&handle, passphrase)?;
                continue;
            }
            session.prompt();
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = next_line(&mut session.lines), if ready => {
                let Some(line) = line else {
                    debug!("stdin closed while waiting for a passphrase");
                    handle.teardown();
                    bail!("no passphrase entered");
                };
                session.submit(&handle, SecretString::from(line))?;
            }
            () = &mut interrupt => {
                session.host.console().write(|out| writeln!(out));
                handle.teardown();
                break;
            }
        }
    }

    match handle.finished().await {
        ViewExit::Redirected(route) => {
            debug!(route = route.path(), "view finished");
            Ok(())
        }
        ViewExit::Failed(reason) => bail!(reason),
        ViewExit::TornDown => {
            info!("view cancelled");
            Ok(())
        }
    }
}

fn copy_pending(copy: bool, screen: &Screen) -> bool {
    copy && screen.revealed && !screen.copied
}

async fn next_line(lines: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match lines {
        Some(lines) => lines.recv().await,
        None => std::future::pending().await,
    }
}

fn render(host: &TerminalHost, screen: &mut Screen, snapshot: &ViewSnapshot, total: Duration) {
    if let Some(message) = snapshot.message() {
        if !screen.revealed {
            screen.revealed = true;
            host.show_message(message);
        }
    }
    if snapshot.phase == Phase::RevealedCounting {
        host.show_progress(snapshot.progress, total);
    }
}

async fn copy_message(host: &TerminalHost, message: &SecretString) {
    match SystemClipboard::default().copy(message.expose_secret()).await {
        Ok(()) => host.notify(Notice::success("Copied", "Message copied to clipboard")),
        Err(err) => host.notify(Notice::error("Failed to copy message", err.to_string())),
    }
}
