use std::{
    cell::Cell,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

thread_local! {
    /// Address of the gate whose callback is running on this thread, if any.
    static RUNNING: Cell<usize> = const { Cell::new(0) };
}

#[derive(Debug)]
struct Inner {
    live: AtomicBool,
    callbacks: Mutex<()>,
}

/// Validity flag shared between a running view and whoever may tear it down.
///
/// Callbacks run while the gate's lock is held, so once [`LiveGate::revoke`]
/// returns no further callback can start or still be running. A callback may
/// revoke its own gate: the call returns at once and the callback itself is the
/// last one to run.
#[derive(Clone, Debug)]
pub struct LiveGate(Arc<Inner>);

impl Default for LiveGate {
    fn default() -> Self {
        Self(Arc::new(Inner {
            live: AtomicBool::new(true),
            callbacks: Mutex::new(()),
        }))
    }
}

impl LiveGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` only while the gate is open.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let _callbacks = self.0.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_live() {
            return None;
        }

        let previous = RUNNING.with(|running| running.replace(self.address()));
        let _restore = Restore(previous);
        Some(f())
    }

    pub fn revoke(&self) {
        self.0.live.store(false, Ordering::SeqCst);
        if RUNNING.with(Cell::get) == self.address() {
            return;
        }
        // Waits out a callback running on another thread.
        drop(self.0.callbacks.lock().unwrap_or_else(PoisonError::into_inner));
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.0.live.load(Ordering::SeqCst)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

struct Restore(usize);

impl Drop for Restore {
    fn drop(&mut self) {
        RUNNING.with(|running| running.set(self.0));
    }
}

#[cfg(test)]
mod tests {
    use super::LiveGate;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
        time::Duration,
    };

    #[test]
    fn runs_until_revoked() {
        let gate = LiveGate::new();
        assert_eq!(gate.run(|| 1), Some(1));

        let other = gate.clone();
        other.revoke();

        assert!(!gate.is_live());
        assert_eq!(gate.run(|| 2), None);
    }

    #[test]
    fn callback_can_revoke_its_own_gate() {
        let gate = LiveGate::new();
        let inner = gate.clone();

        assert_eq!(gate.run(|| inner.revoke()), Some(()));
        assert!(!gate.is_live());
        assert_eq!(gate.run(|| 3), None);
    }

    #[test]
    fn callback_can_revoke_another_gate() {
        let outer = LiveGate::new();
        let other = LiveGate::new();

        outer.run(|| other.revoke());
        assert!(outer.is_live());
        assert!(!other.is_live());

        // The marker is restored once the callback returns.
        outer.run(|| ());
        outer.revoke();
        assert!(!outer.is_live());
    }

    #[test]
    fn revoke_waits_for_a_running_callback() {
        let gate = LiveGate::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let worker = {
            let gate = gate.clone();
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                gate.run(|| {
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(50));
                    finished.store(true, Ordering::SeqCst);
                });
            })
        };

        started_rx.recv().unwrap();
        gate.revoke();
        assert!(finished.load(Ordering::SeqCst));
        worker.join().unwrap();
    }
}
