//! Blocking checkpoint for human-in-the-loop recovery steps.
//!
//! The refill flow sometimes cannot proceed without an operator action
//! (depositing funds, broadcasting a transaction out of band). [`AckGate`]
//! is the suspension point for those steps: a condvar-backed gate the host
//! application opens from another thread, never a poll loop.

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct GateState {
    acknowledged: bool,
    cancelled: bool,
}

/// How a [`AckGate::wait`] call was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The operator acknowledged the pending action.
    Acknowledged,
    /// The gate was cancelled (host shutdown); the action did not happen.
    Cancelled,
}

/// A single-fire acknowledgment gate.
///
/// Each [`acknowledge`](Self::acknowledge) releases exactly one waiter;
/// the acknowledgment is consumed by the wait it releases, so every
/// checkpoint requires a fresh one. [`cancel`](Self::cancel) is sticky and
/// releases all current and future waiters, which is the shutdown path.
#[derive(Default)]
pub struct AckGate {
    state: Mutex<GateState>,
    condvar: Condvar,
}

impl AckGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the calling thread until acknowledged or cancelled.
    pub fn wait(&self) -> GateOutcome {
        let mut state = self.state.lock();
        while !state.acknowledged && !state.cancelled {
            self.condvar.wait(&mut state);
        }
        if state.cancelled {
            GateOutcome::Cancelled
        } else {
            state.acknowledged = false;
            GateOutcome::Acknowledged
        }
    }

    /// Release one pending (or the next) wait.
    pub fn acknowledge(&self) {
        let mut state = self.state.lock();
        state.acknowledged = true;
        self.condvar.notify_one();
    }

    /// Permanently release all waiters. Used on host shutdown.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        self.condvar.notify_all();
    }

    /// Whether the gate has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn pre_acknowledged_wait_returns_immediately() {
        let gate = AckGate::new();
        gate.acknowledge();
        assert_eq!(gate.wait(), GateOutcome::Acknowledged);
    }

    #[test]
    fn acknowledgment_is_consumed() {
        let gate = Arc::new(AckGate::new());
        gate.acknowledge();
        assert_eq!(gate.wait(), GateOutcome::Acknowledged);

        // A second wait blocks until a fresh acknowledgment arrives.
        let g = Arc::clone(&gate);
        let waiter = thread::spawn(move || g.wait());
        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        gate.acknowledge();
        assert_eq!(waiter.join().unwrap(), GateOutcome::Acknowledged);
    }

    #[test]
    fn acknowledge_releases_blocked_waiter() {
        let gate = Arc::new(AckGate::new());
        let g = Arc::clone(&gate);
        let waiter = thread::spawn(move || g.wait());
        thread::sleep(Duration::from_millis(50));
        gate.acknowledge();
        assert_eq!(waiter.join().unwrap(), GateOutcome::Acknowledged);
    }

    #[test]
    fn cancel_releases_all_waiters() {
        let gate = Arc::new(AckGate::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let g = Arc::clone(&gate);
                thread::spawn(move || g.wait())
            })
            .collect();
        thread::sleep(Duration::from_millis(50));
        gate.cancel();
        for w in waiters {
            assert_eq!(w.join().unwrap(), GateOutcome::Cancelled);
        }
    }

    #[test]
    fn cancel_is_sticky() {
        let gate = AckGate::new();
        gate.cancel();
        assert_eq!(gate.wait(), GateOutcome::Cancelled);
        assert_eq!(gate.wait(), GateOutcome::Cancelled);
        assert!(gate.is_cancelled());
    }
}
