//! # LogWriter: render events through `tracing`
//!
//! Maps every [`Event`] onto a `tracing` record: [`Level::Verbose`] becomes
//! `DEBUG`, the others map one to one. The category, phase and target become
//! structured fields.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! DEBUG phasevisor: registered category=system subject="Hud (Clone)" reason="demo::HudView"
//!  WARN phasevisor: template has no lifecycle components category=system subject="Minimap"
//! ERROR phasevisor: participant failed category=system phase=bind subject="demo::Inventory" reason="error: slots"
//!  INFO phasevisor: all participants initialized category=system count=4
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind, Level};
use crate::subscribers::Subscribe;

/// Event writer subscriber backed by `tracing`.
#[derive(Default)]
pub struct LogWriter {
    min_level: Option<Level>,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] receiving every level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a writer that drops events below `level`.
    #[must_use]
    pub fn with_min_level(level: Level) -> Self {
        Self {
            min_level: Some(level),
        }
    }
}

fn headline(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TargetRegistered => "registered",
        EventKind::TemplateEmpty => "template has no lifecycle components",
        EventKind::TemplateSkipped => "instance already present, template skipped",
        EventKind::TemplateInstantiated => "instantiated from template",
        EventKind::InstantiateFailed => "template instantiation failed",
        EventKind::DiscoveryFinished => "discovery finished",
        EventKind::PhaseStarting => "phase starting",
        EventKind::PhaseFinished => "phase finished",
        EventKind::ParticipantFailed => "participant failed",
        EventKind::BehaviourTrace => "default phase behaviour",
        EventKind::Message => "message",
        EventKind::RedirectRequested => "redirecting to production scene",
        EventKind::LifecycleCompleted => "all participants initialized",
        EventKind::LifecycleFailed => "lifecycle aborted",
        EventKind::SignalStarted => "initialization started",
        EventKind::SignalCompleted => "initialization completed",
        EventKind::SignalFailed => "initialization failed",
        EventKind::SignalUnset => "no initialization cycle to wait for",
        EventKind::SignalObserved => "initialization observed",
        EventKind::WaitCancelled => "initialization wait cancelled",
        EventKind::SubscriberOverflow => "subscriber overflow",
        EventKind::SubscriberPanicked => "subscriber panicked",
    }
}

macro_rules! emit {
    ($lvl:ident, $e:expr) => {{
        let e = $e;
        let phase = e.phase.map(|p| p.as_str());
        match (&e.kind, e.reason.as_deref()) {
            (EventKind::Message, Some(msg)) => tracing::$lvl!(
                category = %e.category,
                phase = phase,
                subject = e.target.as_deref(),
                "{msg}"
            ),
            _ => tracing::$lvl!(
                category = %e.category,
                phase = phase,
                subject = e.target.as_deref(),
                reason = e.reason.as_deref(),
                count = e.count,
                "{}",
                headline(e.kind)
            ),
        }
    }};
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.level {
            Level::Verbose => emit!(debug, e),
            Level::Info => emit!(info, e),
            Level::Warning => emit!(warn, e),
            Level::Error => emit!(error, e),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }

    fn min_level(&self) -> Level {
        self.min_level.unwrap_or(Level::Verbose)
    }
}
