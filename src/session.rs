//! Authenticated session bookkeeping for commands that act on behalf of a user.
//!
//! A session ends either when the backend token reaches its expiry or when the
//! user has been idle for longer than [`IDLE_TIMEOUT`]. Long-running commands
//! keep a [`SessionWatch`] alive to notice expiry while they wait on input.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info};

/// Inactivity window after which a session is treated as ended.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Default cadence for [`SessionContext::watch`].
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
    idle_timeout: Duration,
    last_activity: Mutex<Instant>,
}

impl SessionContext {
    #[must_use]
    pub fn new(token: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        Self::with_idle_timeout(token, expires_at, IDLE_TIMEOUT)
    }

    #[must_use]
    pub fn with_idle_timeout(
        token: SecretString,
        expires_at: Option<DateTime<Utc>>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                expires_at,
                idle_timeout,
                last_activity: Mutex::new(Instant::now()),
            }),
        }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.inner.token
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.expires_at
    }

    /// Records user activity, restarting the idle window.
    pub fn touch_activity(&self) {
        let mut last = self
            .inner
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Instant::now();
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_idle() || self.token_expired(Utc::now())
    }

    /// Time left before the backend token expires. `None` when the backend did
    /// not report an expiry; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_at(Utc::now())
    }

    fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.inner
            .expires_at
            .map(|expires_at| (expires_at - now).to_std().unwrap_or(Duration::ZERO))
    }

    fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.inner.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    fn is_idle(&self) -> bool {
        let last = *self
            .inner
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last.elapsed() >= self.inner.idle_timeout
    }

    /// Starts a background check every `interval`. The returned guard stops the
    /// check when dropped.
    #[must_use]
    pub fn watch(&self, interval: Duration) -> SessionWatch {
        let (sender, receiver) = watch::channel(false);
        let session = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if session.is_expired() {
                    info!("session expired");
                    sender.send_replace(true);
                    break;
                }
                debug!(remaining = ?session.remaining(), "session still active");
            }
        });
        SessionWatch {
            task,
            expired: receiver,
        }
    }
}

/// Handle to a running expiry check.
pub struct SessionWatch {
    task: JoinHandle<()>,
    expired: watch::Receiver<bool>,
}

impl SessionWatch {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        *self.expired.borrow()
    }

    /// Resolves once the session is observed to have expired.
    pub async fn expired(&mut self) {
        // The sender only drops after publishing expiry or on abort.
        let _ = self.expired.wait_for(|expired| *expired).await;
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
