//! # Initialization signal gate.
//!
//! [`InitSignal`] is a single-slot, restartable completion primitive. The
//! orchestrator drives it; any other code holding a clone can await
//! "scene ready" without a reference to the orchestrator.
//!
//! ```text
//! notify_started()  ──► cancel pending cycle (if any) ──► install Pending
//!
//!            ┌──────────── notify_completed() ──► Completed
//! Pending ───┼──────────── notify_error(e)    ──► Failed(e)
//!            └─ notify_started() / cleanup()  ──► Cancelled
//! ```
//!
//! ## Rules
//! - Terminal states never change; resolving a terminal cycle is a no-op
//! - Each cycle lives in a `watch` channel: late waiters see the terminal
//!   state immediately, early waiters wake exactly once
//! - The slot mutex is held only for the read-modify-write of the slot, never
//!   across `.await`
//! - A waiter's own token only stops that waiter; the cycle is untouched
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use phasevisor::{InitSignal, WaitError};
//! use tokio_util::sync::CancellationToken;
//!
//! let signal = InitSignal::default();
//! signal.notify_started();
//!
//! let waiter = {
//!     let signal = signal.clone();
//!     tokio::spawn(async move { signal.wait(&CancellationToken::new()).await })
//! };
//!
//! signal.notify_completed();
//! assert!(waiter.await.unwrap().is_ok());
//! # }
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::WaitError;
use crate::events::{Bus, Event, EventKind};

/// State of one initialization cycle.
#[derive(Clone, Debug)]
pub enum CycleState {
    Pending,
    Completed,
    Cancelled,
    Failed(Arc<dyn StdError + Send + Sync>),
}

impl CycleState {
    /// Returns true for every state except [`CycleState::Pending`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CycleState::Pending)
    }
}

/// Restartable single-slot completion gate (cheap to clone).
#[derive(Clone)]
pub struct InitSignal {
    inner: Arc<Inner>,
}

struct Inner {
    slot: Mutex<Option<watch::Sender<CycleState>>>,
    bus: Bus,
}

impl InitSignal {
    /// Creates a gate with no cycle, publishing its events to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                bus,
            }),
        }
    }

    /// Bus this gate publishes to.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Starts a new cycle, cancelling the pending one first.
    pub fn notify_started(&self) {
        let (tx, _rx) = watch::channel(CycleState::Pending);
        {
            let mut slot = self.inner.slot.lock();
            if let Some(old) = slot.take() {
                resolve(&old, CycleState::Cancelled);
            }
            *slot = Some(tx);
        }
        self.inner.bus.publish(Event::new(EventKind::SignalStarted));
    }

    /// Resolves the pending cycle as completed. No-op without a pending cycle.
    pub fn notify_completed(&self) {
        if self.resolve_current(CycleState::Completed) {
            self.inner.bus.publish(Event::new(EventKind::SignalCompleted));
        }
    }

    /// Resolves the pending cycle as failed with `err`. No-op without a pending cycle.
    pub fn notify_error<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        let reason = err.to_string();
        if self.resolve_current(CycleState::Failed(Arc::new(err))) {
            self.inner
                .bus
                .publish(Event::new(EventKind::SignalFailed).with_reason(reason));
        }
    }

    /// Cancels the pending cycle (if any) and empties the slot.
    pub fn cleanup(&self) {
        if let Some(old) = self.inner.slot.lock().take() {
            resolve(&old, CycleState::Cancelled);
        }
    }

    /// Snapshot of the current cycle, `None` if no cycle was ever started
    /// (or the gate was cleaned up).
    pub fn state(&self) -> Option<CycleState> {
        self.inner
            .slot
            .lock()
            .as_ref()
            .map(|tx| tx.borrow().clone())
    }

    /// Waits for the current cycle to reach a terminal state.
    ///
    /// Without any cycle the wait is satisfied immediately (a `SignalUnset`
    /// warning is published). Cancelling `token` stops this waiter only.
    pub async fn wait(&self, token: &CancellationToken) -> Result<(), WaitError> {
        let rx = self.inner.slot.lock().as_ref().map(|tx| tx.subscribe());
        let Some(mut rx) = rx else {
            self.inner.bus.publish(Event::new(EventKind::SignalUnset));
            return Ok(());
        };

        let state = tokio::select! {
            biased;
            res = async { rx.wait_for(CycleState::is_terminal).await.map(|s| s.clone()) } => match res {
                Ok(state) => state,
                // sender dropped without resolving: treat as a replaced cycle
                Err(_closed) => CycleState::Cancelled,
            },
            _ = token.cancelled() => {
                self.inner
                    .bus
                    .publish(Event::new(EventKind::WaitCancelled).with_reason("caller token"));
                return Err(WaitError::Interrupted);
            }
        };

        match state {
            CycleState::Completed => {
                self.inner.bus.publish(Event::new(EventKind::SignalObserved));
                Ok(())
            }
            CycleState::Failed(err) => Err(WaitError::Failed(err)),
            CycleState::Pending | CycleState::Cancelled => {
                self.inner
                    .bus
                    .publish(Event::new(EventKind::WaitCancelled).with_reason("cycle cancelled"));
                Err(WaitError::CycleCancelled)
            }
        }
    }

    fn resolve_current(&self, next: CycleState) -> bool {
        match self.inner.slot.lock().as_ref() {
            Some(tx) => resolve(tx, next),
            None => false,
        }
    }
}

impl Default for InitSignal {
    fn default() -> Self {
        InitSignal::new(Bus::default())
    }
}

impl fmt::Debug for InitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitSignal")
            .field("state", &self.state())
            .finish()
    }
}

/// Moves a cycle out of `Pending`. Returns false if it was already terminal.
fn resolve(tx: &watch::Sender<CycleState>, next: CycleState) -> bool {
    tx.send_if_modified(|state| {
        if state.is_terminal() {
            return false;
        }
        *state = next;
        true
    })
}
