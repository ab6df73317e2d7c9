//! Burn countdown driven by elapsed wall-clock time rather than frame count,
//! so a stalled render loop never stretches the total duration.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::debug;

/// Reference burn duration after a secret is revealed.
pub const BURN_DURATION: Duration = Duration::from_millis(5000);
/// Default delay between progress frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Progress in percent after `elapsed` of `total`: `max(0, (T - t) / T) * 100`.
#[must_use]
pub fn progress_at(total: Duration, elapsed: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    let remaining = total.saturating_sub(elapsed);
    remaining.as_secs_f64() / total.as_secs_f64() * 100.0
}

type Callback = Box<dyn FnOnce() + Send>;

enum Slot {
    Armed(Option<Callback>),
    Fired,
    Cancelled,
}

/// Replaceable completion callback shared by the frame loop and its owner.
///
/// The callback is invoked at most once, under the cell's lock; after
/// [`CompletionCell::cancel`] returns it never runs.
#[derive(Clone)]
pub struct CompletionCell(Arc<Mutex<Slot>>);

impl Default for CompletionCell {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Slot::Armed(None))))
    }
}

impl CompletionCell {
    /// Installs or replaces the callback. Returns `false` once fired or cancelled.
    pub fn set(&self, callback: impl FnOnce() + Send + 'static) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *slot {
            Slot::Armed(current) => {
                *current = Some(Box::new(callback));
                true
            }
            Slot::Fired | Slot::Cancelled => false,
        }
    }

    /// Fires the callback if still armed. Returns whether this call fired it.
    fn fire(&self) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, Slot::Fired) {
            Slot::Armed(callback) => {
                if let Some(callback) = callback {
                    callback();
                }
                true
            }
            previous => {
                *slot = previous;
                false
            }
        }
    }

    pub fn cancel(&self) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, Slot::Armed(_)) {
            *slot = Slot::Cancelled;
        }
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(
            *self.0.lock().unwrap_or_else(PoisonError::into_inner),
            Slot::Fired
        )
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            *self.0.lock().unwrap_or_else(PoisonError::into_inner),
            Slot::Cancelled
        )
    }
}

pub struct Countdown {
    total: Duration,
    started: Instant,
    completion: CompletionCell,
    progress: watch::Sender<f64>,
}

impl Countdown {
    /// Starts the clock now with progress at 100.
    #[must_use]
    pub fn start(total: Duration) -> Self {
        let (progress, _) = watch::channel(100.0);
        Self {
            total,
            started: Instant::now(),
            completion: CompletionCell::default(),
            progress,
        }
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Sets the callback fired when progress reaches zero.
    pub fn on_complete(&self, callback: impl FnOnce() + Send + 'static) -> bool {
        self.completion.set(callback)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.started + self.total
    }

    /// Recomputes progress for the current instant.
    pub fn update(&self) -> f64 {
        self.update_at(Instant::now())
    }

    /// Recomputes progress for `now`, publishing it and firing completion the
    /// first time it reaches zero. Does nothing once cancelled.
    pub fn update_at(&self, now: Instant) -> f64 {
        if self.completion.is_cancelled() {
            return *self.progress.borrow();
        }
        let value = progress_at(self.total, now.saturating_duration_since(self.started));
        self.progress.send_replace(value);
        if value <= 0.0 && self.completion.fire() {
            debug!(total_ms = self.total.as_millis(), "countdown elapsed");
        }
        value
    }

    pub fn cancel(&self) {
        self.completion.cancel();
    }

    /// Drives the countdown on the runtime, one update per `frame` and a final
    /// update exactly at the deadline.
    #[must_use]
    pub fn run(self, frame: Duration) -> CountdownHandle {
        let countdown = Arc::new(self);
        let driver = Arc::clone(&countdown);
        let frame = frame.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let deadline = driver.deadline();
            loop {
                let next = (Instant::now() + frame).min(deadline);
                sleep_until(next).await;
                if driver.update() <= 0.0 {
                    break;
                }
            }
        });

        CountdownHandle { countdown, task }
    }
}

/// Running countdown. Dropping it cancels the callback and stops the frame loop.
pub struct CountdownHandle {
    countdown: Arc<Countdown>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.countdown.subscribe()
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.countdown.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::advance;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&count);
        (count, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn progress_follows_remaining_ratio() {
        let total = BURN_DURATION;
        assert!((progress_at(total, Duration::ZERO) - 100.0).abs() < f64::EPSILON);
        assert!((progress_at(total, Duration::from_millis(1250)) - 75.0).abs() < 1e-9);
        assert!((progress_at(total, Duration::from_millis(2500)) - 50.0).abs() < 1e-9);
        assert!(progress_at(total, total).abs() < f64::EPSILON);
        assert!(progress_at(total, Duration::from_secs(60)).abs() < f64::EPSILON);
        assert!(progress_at(Duration::ZERO, Duration::ZERO).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_is_monotonically_non_increasing() {
        let mut last = f64::MAX;
        for ms in (0..=6000).step_by(125) {
            let value = progress_at(BURN_DURATION, Duration::from_millis(ms));
            assert!(value <= last, "progress rose at {ms}ms");
            last = value;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn update_fires_completion_exactly_once() {
        let countdown = Countdown::start(BURN_DURATION);
        let (count, hook) = counter();
        assert!(countdown.on_complete(hook));

        advance(Duration::from_millis(2500)).await;
        assert!((countdown.update() - 50.0).abs() < 1e-9);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        advance(Duration::from_millis(2500)).await;
        for _ in 0..5 {
            assert!(countdown.update().abs() < f64::EPSILON);
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!countdown.on_complete(|| {}));
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_callback_is_the_one_fired() {
        let countdown = Countdown::start(Duration::from_millis(100));
        let (first, first_hook) = counter();
        let (second, second_hook) = counter();
        countdown.on_complete(first_hook);
        countdown.on_complete(second_hook);

        advance(Duration::from_millis(100)).await;
        countdown.update();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_never_fires_or_publishes() {
        let countdown = Countdown::start(Duration::from_millis(100));
        let progress = countdown.subscribe();
        let (count, hook) = counter();
        countdown.on_complete(hook);

        advance(Duration::from_millis(40)).await;
        let before = countdown.update();
        countdown.cancel();

        advance(Duration::from_millis(200)).await;
        assert!((countdown.update() - before).abs() < f64::EPSILON);
        assert!((*progress.borrow() - before).abs() < f64::EPSILON);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_fires_at_deadline_despite_coarse_frames() {
        let countdown = Countdown::start(Duration::from_millis(5000));
        let (tx, rx) = tokio::sync::oneshot::channel();
        countdown.on_complete(move || {
            let _ = tx.send(Instant::now());
        });
        let started = Instant::now();
        let handle = countdown.run(Duration::from_millis(1500));

        let fired_at = rx.await.unwrap();
        assert_eq!(fired_at - started, Duration::from_millis(5000));
        assert!(handle.subscribe().borrow().abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_pending_completion() {
        let countdown = Countdown::start(Duration::from_millis(500));
        let (count, hook) = counter();
        countdown.on_complete(hook);
        let handle = countdown.run(FRAME_INTERVAL);

        advance(Duration::from_millis(200)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
