//! # Event subscribers for the phasevisor runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the orchestrator to deliver events from the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Discovery / phase tasks / InitSignal ── publish(Event) ──► Bus
//!                                                             │
//!                                          subscriber_listener (Orchestrator)
//!                                                             │
//!                                                      SubscriberSet::emit
//!                                                 ┌───────────┼───────────┐
//!                                                 ▼           ▼           ▼
//!                                             LogWriter    Metrics     Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use phasevisor::{Event, EventKind, Level, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ParticipantFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn min_level(&self) -> Level {
//!         Level::Error
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
