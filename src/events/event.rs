//! # Runtime events emitted by the orchestrator, the phase runner and the signal gate.
//!
//! Every event carries a [`Level`] and a [`Category`], so the event stream
//! doubles as the leveled, categorized log of a run. The [`EventKind`] enum
//! classifies events across five groups:
//! - **Discovery events**: registration and template handling
//! - **Phase events**: phase barriers and participant failures
//! - **Run events**: redirect, completion, fatal failure
//! - **Signal events**: initialization gate transitions
//! - **Subscriber events**: overflow and panics in subscriber workers
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use phasevisor::{Category, Event, EventKind, Level, Phase};
//!
//! let ev = Event::new(EventKind::ParticipantFailed)
//!     .with_target("HudView")
//!     .with_phase(Phase::Bind)
//!     .with_reason("missing atlas");
//!
//! assert_eq!(ev.level, Level::Error);
//! assert_eq!(ev.category, Category::System);
//! assert_eq!(ev.target.as_deref(), Some("HudView"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::lifecycle::Phase;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Severity of an event. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Verbose,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Verbose => "verbose",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem an event belongs to.
///
/// The runtime itself only emits [`Category::System`]; the other categories
/// are available to participants logging through
/// [`PhaseContext::log`](crate::PhaseContext::log).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    General,
    System,
    Gameplay,
    Ui,
    Audio,
    Network,
    Performance,
    Test,
    Debug,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::System => "system",
            Category::Gameplay => "gameplay",
            Category::Ui => "ui",
            Category::Audio => "audio",
            Category::Network => "network",
            Category::Performance => "performance",
            Category::Test => "test",
            Category::Debug => "debug",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Discovery events ===
    /// A participant joined the roster.
    ///
    /// Sets:
    /// - `target`: participant object name
    /// - `reason`: concrete type name
    TargetRegistered,

    /// A template carries no lifecycle-capable component and was skipped.
    ///
    /// Sets:
    /// - `target`: template name
    TemplateEmpty,

    /// A template component was skipped because a matching instance already exists.
    ///
    /// Sets:
    /// - `target`: template name
    /// - `reason`: concrete type name
    TemplateSkipped,

    /// A participant was instantiated from a template.
    ///
    /// Sets:
    /// - `target`: template name
    /// - `reason`: concrete type name
    TemplateInstantiated,

    /// A template component factory failed or panicked.
    ///
    /// Sets:
    /// - `target`: template name
    /// - `reason`: error message
    InstantiateFailed,

    /// Discovery and registration finished.
    ///
    /// Sets:
    /// - `count`: roster size
    DiscoveryFinished,

    // === Phase events ===
    /// A phase is about to fan out.
    ///
    /// Sets:
    /// - `phase`: the phase
    /// - `count`: number of participants launched
    PhaseStarting,

    /// Every participant settled the phase (barrier passed).
    ///
    /// Sets:
    /// - `phase`: the phase
    /// - `count`: number of failed participants
    PhaseFinished,

    /// A participant failed a phase (error, panic or deadline).
    ///
    /// Sets:
    /// - `target`: participant type name
    /// - `phase`: the phase
    /// - `reason`: failure message
    ParticipantFailed,

    /// Default phase behaviour ran for a participant.
    ///
    /// Sets:
    /// - `target`: participant object name
    /// - `phase`: the phase
    BehaviourTrace,

    /// Free-form message logged by a participant.
    ///
    /// Sets:
    /// - `target`: participant object name
    /// - `phase`: the phase
    /// - `reason`: the message
    Message,

    // === Run events ===
    /// Production redirect: phases are skipped for this run.
    ///
    /// Sets:
    /// - `target`: scene being loaded
    RedirectRequested,

    /// All participants went through all phases.
    ///
    /// Sets:
    /// - `count`: roster size
    LifecycleCompleted,

    /// An orchestration-fatal error aborted the run.
    ///
    /// Sets:
    /// - `reason`: error message
    LifecycleFailed,

    // === Signal events ===
    /// A new initialization cycle was installed.
    SignalStarted,

    /// The pending cycle completed successfully.
    SignalCompleted,

    /// The pending cycle was resolved with an error.
    ///
    /// Sets:
    /// - `reason`: error message
    SignalFailed,

    /// A wait was requested while no cycle exists (treated as satisfied).
    SignalUnset,

    /// A waiter observed successful completion.
    SignalObserved,

    /// A waiter stopped waiting because of cancellation.
    ///
    /// Sets:
    /// - `reason`: which cancellation fired
    WaitCancelled,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `target`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `target`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,
}

impl EventKind {
    /// Default severity for this kind of event.
    pub fn level(&self) -> Level {
        match self {
            EventKind::TargetRegistered
            | EventKind::TemplateSkipped
            | EventKind::TemplateInstantiated
            | EventKind::DiscoveryFinished
            | EventKind::PhaseStarting
            | EventKind::PhaseFinished
            | EventKind::BehaviourTrace
            | EventKind::Message
            | EventKind::SignalStarted
            | EventKind::SignalObserved => Level::Verbose,
            EventKind::RedirectRequested
            | EventKind::LifecycleCompleted
            | EventKind::SignalCompleted
            | EventKind::WaitCancelled => Level::Info,
            EventKind::TemplateEmpty
            | EventKind::SignalUnset
            | EventKind::SubscriberOverflow
            | EventKind::SubscriberPanicked => Level::Warning,
            EventKind::InstantiateFailed
            | EventKind::ParticipantFailed
            | EventKind::LifecycleFailed
            | EventKind::SignalFailed => Level::Error,
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Severity; defaults to [`EventKind::level`].
    pub level: Level,
    /// Subsystem; defaults to [`Category::System`].
    pub category: Category,
    /// Participant, template or subscriber name, if applicable.
    pub target: Option<Arc<str>>,
    /// Phase the event relates to, if any.
    pub phase: Option<Phase>,
    /// Human-readable reason (errors, type names, messages).
    pub reason: Option<Arc<str>>,
    /// Kind-specific count (roster size, launched tasks, failures).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            level: kind.level(),
            category: Category::System,
            target: None,
            phase: None,
            reason: None,
            count: None,
        }
    }

    /// Creates a participant message event.
    pub fn message(level: Level, category: Category, msg: impl Into<Arc<str>>) -> Self {
        Event::new(EventKind::Message)
            .with_level(level)
            .with_category(category)
            .with_reason(msg)
    }

    /// Overrides the severity.
    #[inline]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Overrides the category.
    #[inline]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Attaches a participant/template/subscriber name.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attaches a phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count (clamped to `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_target(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_target(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
