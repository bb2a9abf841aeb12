//! # Per-call phase context.
//!
//! A [`PhaseContext`] is handed to every phase method. It tells the
//! participant which phase is running, carries a cancellation token derived
//! from the orchestrator's runtime token (also cancelled when the phase
//! deadline expires), and gives access to the event bus for categorized
//! logging.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Category, Event, EventKind, Level};
use crate::lifecycle::Phase;

/// Context of one phase call for one participant.
#[derive(Clone, Debug)]
pub struct PhaseContext {
    phase: Phase,
    participant: Arc<str>,
    token: CancellationToken,
    bus: Bus,
}

impl PhaseContext {
    /// Builds a context. The phase runner does this for every call; hosts
    /// only need it to drive participants by hand (e.g. in tests).
    pub fn new(
        phase: Phase,
        participant: impl Into<Arc<str>>,
        token: CancellationToken,
        bus: Bus,
    ) -> Self {
        Self {
            phase,
            participant: participant.into(),
            token,
            bus,
        }
    }

    /// Phase being executed.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Object name of the participant this call belongs to.
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Token cancelled on orchestrator shutdown or phase deadline.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Publishes a participant message with the given level and category.
    pub fn log(&self, level: Level, category: Category, msg: impl Into<Arc<str>>) {
        self.bus.publish(
            Event::message(level, category, msg)
                .with_target(Arc::clone(&self.participant))
                .with_phase(self.phase),
        );
    }

    /// Publishes the verbose trace emitted by default phase behaviour.
    pub fn trace_default(&self) {
        self.bus.publish(
            Event::new(EventKind::BehaviourTrace)
                .with_target(Arc::clone(&self.participant))
                .with_phase(self.phase),
        );
    }
}
