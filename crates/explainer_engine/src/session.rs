use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug)]
struct SessionState {
    busy: AtomicBool,
    in_flight: AtomicUsize,
    busy_tx: watch::Sender<bool>,
}

/// Busy flag and in-flight counter shared between the orchestrator and observers.
///
/// Only a [`SessionGuard`] can set the flag, and dropping it is the only way
/// to clear it, so the flag resets however the run ends.
#[derive(Debug, Clone)]
pub struct FetchSession {
    state: Arc<SessionState>,
}

impl Default for FetchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchSession {
    pub fn new() -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            state: Arc::new(SessionState {
                busy: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                busy_tx,
            }),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::Acquire)
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::Acquire)
    }

    /// Watch the busy flag. The value flips to `false` once per finished run.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.busy_tx.subscribe()
    }

    /// Start a run, or `None` if one is already active.
    pub fn try_begin(&self) -> Option<SessionGuard> {
        self.state
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.state.busy_tx.send_replace(true);
        Some(SessionGuard {
            state: self.state.clone(),
        })
    }
}

/// Held for the duration of one run.
#[derive(Debug)]
pub struct SessionGuard {
    state: Arc<SessionState>,
}

impl SessionGuard {
    /// Count one entry task as in flight until the returned guard drops.
    pub fn track(&self) -> InFlightGuard {
        self.state.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            state: self.state.clone(),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::Release);
        self.state.busy_tx.send_replace(false);
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    state: Arc<SessionState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
