//! One-shot secret view lifecycle.
//!
//! The controller runs as a single task that owns all state. The host talks to
//! it through a [`ViewHandle`]: actions go in over a channel, a
//! [`ViewSnapshot`] projection comes back over a `watch` channel. Phases:
//!
//! ```text
//! checking ──revealed──────────────────────────▶ revealed-counting ─▶ burning ─▶ animating ─▶ navigate("/")
//!    │                                                  ▲                 │
//!    ├─passphrase required─▶ awaiting-passphrase ◀─▶ loading              └─(none)─▶ navigate("/")
//!    └─failure─▶ error (terminal)
//! ```
//!
//! At most one retrieval is in flight: submissions arriving while a passphrase
//! request is pending are rejected with a notice, and submissions during the
//! initial probe are ignored. Teardown revokes a [`LiveGate`] before
//! anything else, so no host callback (notice, burn hook, animation, navigation)
//! can fire once [`ViewHandle::teardown`] returns.

use super::{
    AnimationTrigger, Countdown, DestructionAnimation, LiveGate, Notice, Retrieval,
    RevealedSecret, Route, SecretSource, ViewHost,
    animation::ANIMATION_HOLD,
    countdown::{BURN_DURATION, FRAME_INTERVAL},
};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{Instrument, debug, debug_span, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Checking,
    AwaitingPassphrase,
    Loading,
    RevealedCounting,
    Burning,
    Animating,
}

#[derive(Clone, Debug)]
pub struct ViewConfig {
    /// Countdown between reveal and burn.
    pub burn_after: Duration,
    /// How long the `animating` phase is held before redirecting.
    pub animation_hold: Duration,
    pub frame_interval: Duration,
    pub animations_enabled: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            burn_after: BURN_DURATION,
            animation_hold: ANIMATION_HOLD,
            frame_interval: FRAME_INTERVAL,
            animations_enabled: true,
        }
    }
}

/// Render-relevant projection of the view state.
#[derive(Clone, Debug)]
pub struct ViewSnapshot {
    pub id: String,
    pub phase: Phase,
    pub passphrase_required: bool,
    /// Terminal error; no further transitions happen once set.
    pub error: Option<String>,
    /// Set once on reveal and never cleared.
    pub secret: Option<Arc<RevealedSecret>>,
    /// Countdown progress from 100 down to 0.
    pub progress: f64,
    /// Passphrase submissions the backend has turned down so far.
    pub rejections: u32,
}

impl ViewSnapshot {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            phase: Phase::Checking,
            passphrase_required: false,
            error: None,
            secret: None,
            progress: 100.0,
            rejections: 0,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&SecretString> {
        self.secret.as_ref().map(|secret| &secret.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewExit {
    Redirected(Route),
    /// Discovery failed; the reason is also in the final snapshot.
    Failed(String),
    TornDown,
}

#[derive(Debug, Error)]
#[error("secret view is no longer running")]
pub struct ViewClosed;

enum Command {
    Input(SecretString),
    Submit(SecretString),
    Retry,
    Teardown,
}

pub struct ViewController<S, H, A> {
    id: String,
    source: Arc<S>,
    host: Arc<H>,
    animation: Arc<A>,
    config: ViewConfig,
}

impl<S, H, A> ViewController<S, H, A>
where
    S: SecretSource,
    H: ViewHost,
    A: AnimationTrigger,
{
    pub fn new(id: impl Into<String>, source: Arc<S>, host: Arc<H>, animation: Arc<A>) -> Self {
        Self {
            id: id.into(),
            source,
            host,
            animation,
            config: ViewConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts the lifecycle on the current runtime, beginning with the probe.
    #[must_use]
    pub fn spawn(self) -> ViewHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewSnapshot::new(&self.id));
        let gate = LiveGate::new();

        let task = ViewTask {
            id: self.id,
            source: self.source,
            host: self.host,
            animation: self.animation,
            config: self.config,
            commands: commands_rx,
            state: state_tx,
            gate: gate.clone(),
            passphrase_input: SecretString::default(),
            secret: None,
        };
        let task = tokio::spawn(task.run().instrument(debug_span!("secret.view")));

        ViewHandle {
            commands: commands_tx,
            state: state_rx,
            gate,
            task: Some(task),
        }
    }
}

/// Host-side handle to a running view. Dropping it tears the view down.
pub struct ViewHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ViewSnapshot>,
    gate: LiveGate,
    task: Option<JoinHandle<ViewExit>>,
}

impl ViewHandle {
    /// Replaces the passphrase being typed without submitting it.
    ///
    /// # Errors
    /// Returns `ViewClosed` once the view has finished.
    pub fn set_passphrase_input(&self, passphrase: SecretString) -> Result<(), ViewClosed> {
        self.send(Command::Input(passphrase))
    }

    /// Submits a passphrase; an empty one is sent as-is.
    ///
    /// # Errors
    /// Returns `ViewClosed` once the view has finished.
    pub fn submit_passphrase(&self, passphrase: SecretString) -> Result<(), ViewClosed> {
        self.send(Command::Submit(passphrase))
    }

    /// Resubmits the current passphrase input.
    ///
    /// # Errors
    /// Returns `ViewClosed` once the view has finished.
    pub fn retry_viewing(&self) -> Result<(), ViewClosed> {
        self.send(Command::Retry)
    }

    /// Cancels pending requests and timers. Once this returns no
    /// further host callback runs. Safe to call from inside a [`ViewHost`]
    /// callback, which then is the last one.
    pub fn teardown(&self) {
        self.gate.revoke();
        let _ = self.commands.send(Command::Teardown);
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.state.clone()
    }

    /// Waits for the lifecycle to end.
    pub async fn finished(mut self) -> ViewExit {
        let Some(task) = self.task.as_mut() else {
            return ViewExit::TornDown;
        };
        let exit = match task.await {
            Ok(exit) => exit,
            Err(err) if err.is_cancelled() => ViewExit::TornDown,
            Err(err) => ViewExit::Failed(format!("secret view task failed: {err}")),
        };
        self.task = None;
        exit
    }

    fn send(&self, command: Command) -> Result<(), ViewClosed> {
        self.commands.send(command).map_err(|_| ViewClosed)
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.gate.revoke();
            task.abort();
        }
    }
}

struct ViewTask<S, H, A> {
    id: String,
    source: Arc<S>,
    host: Arc<H>,
    animation: Arc<A>,
    config: ViewConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ViewSnapshot>,
    gate: LiveGate,
    passphrase_input: SecretString,
    secret: Option<Arc<RevealedSecret>>,
}

impl<S, H, A> ViewTask<S, H, A>
where
    S: SecretSource,
    H: ViewHost,
    A: AnimationTrigger,
{
    async fn run(mut self) -> ViewExit {
        debug!("probing secret");
        let Some(probe) = self.fetch(SecretString::default()).await else {
            return ViewExit::TornDown;
        };

        match probe {
            Retrieval::Revealed(secret) => self.reveal(secret),
            Retrieval::PassphraseRequired => {
                debug!("passphrase required");
                self.publish(|state| {
                    state.passphrase_required = true;
                    state.phase = Phase::AwaitingPassphrase;
                });
                if !self.await_passphrase().await {
                    return ViewExit::TornDown;
                }
            }
            Retrieval::Failure(reason) => {
                warn!(%reason, "secret discovery failed");
                self.publish(|state| state.error = Some(reason.clone()));
                return ViewExit::Failed(reason);
            }
        }

        self.burn().await
    }

    fn publish(&self, update: impl FnOnce(&mut ViewSnapshot)) {
        self.state.send_modify(update);
    }

    fn notify(&self, notice: Notice) {
        self.gate.run(|| self.host.notify(notice));
    }

    /// Runs one retrieval while still serving commands. Returns `None` on teardown.
    async fn fetch(&mut self, passphrase: SecretString) -> Option<Retrieval> {
        let Self {
            id,
            source,
            host,
            gate,
            commands,
            state,
            passphrase_input,
            ..
        } = self;
        let probing = state.borrow().phase == Phase::Checking;

        let retrieval = source.retrieve(id.as_str(), &passphrase);
        tokio::pin!(retrieval);

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    None | Some(Command::Teardown) => return None,
                    Some(Command::Input(value)) => *passphrase_input = value,
                    Some(Command::Submit(_) | Command::Retry) if probing => {
                        debug!("ignoring passphrase action before a passphrase is requested");
                    }
                    Some(Command::Submit(_) | Command::Retry) => {
                        debug!("rejecting submission while a request is in flight");
                        gate.run(|| {
                            host.notify(Notice::info(
                                "Please wait",
                                "A request is already in progress.",
                            ));
                        });
                    }
                },
                result = &mut retrieval => return Some(result),
            }
        }
    }

    /// Serves passphrase actions until a submission reveals the secret.
    /// Returns `false` on teardown.
    async fn await_passphrase(&mut self) -> bool {
        loop {
            let passphrase = match self.commands.recv().await {
                None | Some(Command::Teardown) => return false,
                Some(Command::Input(value)) => {
                    self.passphrase_input = value;
                    continue;
                }
                Some(Command::Submit(value)) => {
                    self.passphrase_input = value;
                    duplicate(&self.passphrase_input)
                }
                Some(Command::Retry) => duplicate(&self.passphrase_input),
            };

            self.publish(|state| state.phase = Phase::Loading);
            let Some(result) = self.fetch(passphrase).await else {
                return false;
            };

            match result {
                Retrieval::Revealed(secret) => {
                    self.notify(Notice::success(
                        "Success",
                        "Secret message retrieved successfully",
                    ));
                    self.reveal(secret);
                    return true;
                }
                Retrieval::PassphraseRequired => self.reject("Passphrase required"),
                Retrieval::Failure(reason) => self.reject(&reason),
            }
        }
    }

    fn reject(&self, reason: &str) {
        debug!("passphrase submission failed");
        self.notify(Notice::error("Error", reason));
        self.publish(|state| {
            state.phase = Phase::AwaitingPassphrase;
            state.rejections += 1;
        });
    }

    fn reveal(&mut self, secret: RevealedSecret) {
        if self.secret.is_some() {
            warn!("secret already revealed; ignoring second response");
            return;
        }
        let secret = Arc::new(secret);
        self.secret = Some(Arc::clone(&secret));
        info!(animation = %secret.animation, "secret revealed");
        self.publish(|state| {
            state.secret = Some(secret);
            state.phase = Phase::RevealedCounting;
            state.progress = 100.0;
        });
    }

    async fn burn(&mut self) -> ViewExit {
        let countdown = Countdown::start(self.config.burn_after);
        let (elapsed_tx, mut elapsed) = oneshot::channel();
        countdown.on_complete(move || {
            let _ = elapsed_tx.send(());
        });
        let timer = countdown.run(self.config.frame_interval);
        let mut progress = timer.subscribe();
        let mut progress_open = true;

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    None | Some(Command::Teardown) => return ViewExit::TornDown,
                    Some(_) => debug!("secret already revealed; ignoring passphrase action"),
                },
                _ = &mut elapsed => break,
                changed = progress.changed(), if progress_open => {
                    if changed.is_ok() {
                        let value = *progress.borrow_and_update();
                        self.publish(|state| state.progress = value);
                    } else {
                        progress_open = false;
                    }
                }
            }
        }
        drop(timer);

        self.publish(|state| {
            state.phase = Phase::Burning;
            state.progress = 0.0;
        });
        info!("burn started");
        self.gate.run(|| self.host.burn_started());

        let kind = self
            .secret
            .as_ref()
            .map_or(DestructionAnimation::None, |secret| secret.animation)
            .effective(self.config.animations_enabled);
        if kind == DestructionAnimation::None {
            return self.redirect();
        }

        let Some(animation) = self.gate.run(|| self.animation.play(kind)) else {
            return ViewExit::TornDown;
        };
        self.publish(|state| state.phase = Phase::Animating);

        let hold = sleep(self.config.animation_hold);
        tokio::pin!(hold);
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    None | Some(Command::Teardown) => return ViewExit::TornDown,
                    Some(_) => debug!("secret already revealed; ignoring passphrase action"),
                },
                () = &mut hold => break,
            }
        }
        drop(animation);

        self.redirect()
    }

    fn redirect(&self) -> ViewExit {
        let route = Route::Create;
        match self.gate.run(|| self.host.navigate(route)) {
            Some(()) => {
                info!(route = route.path(), "secret burned, redirecting");
                ViewExit::Redirected(route)
            }
            None => ViewExit::TornDown,
        }
    }
}

fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}
