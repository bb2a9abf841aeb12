//! Runtime events: types and broadcast bus.
//!
//! The event stream is the crate's logging sink: every discovery,
//! registration, phase, signal and error event is published here with a
//! [`Level`] and a [`Category`], and subscribers decide how to render it.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Level`], [`Category`] event classification and payload
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Discovery`, `run_phase`, `PhaseContext`, `InitSignal`,
//!   `Orchestrator`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Orchestrator`'s subscriber listener, which fans out to
//!   the [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Category, Event, EventKind, Level};
