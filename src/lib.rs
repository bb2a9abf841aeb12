//! # phasevisor
//!
//! **Phasevisor** drives a scene's components through a fixed, ordered set of
//! initialization phases.
//!
//! It discovers participants (objects already alive in the host environment
//! plus objects instantiated from templates), deduplicates them, and runs
//! every participant through `Awake → UiInitialize → Bind → Start`. Within a
//! phase all participants run concurrently; the next phase starts only when
//! every participant has settled the current one. A participant that fails
//! or panics is reported and the rest carry on.
//!
//! An [`InitSignal`] lets unrelated code await "scene ready" without a
//! reference to the orchestrator.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Environment  │   │   Template   │   │   Template   │
//!     │ (live roots) │   │  "Hud" → Fn  │   │ "Audio" → Fn │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - guard (production redirect)                                    │
//! │  - Discovery ─► Roster (ordered, deduplicated, type-indexed)      │
//! │  - run_phase × 4 (JoinSet fan-out + barrier per phase)            │
//! │  - InitSignal (Pending ─► Completed / Failed / Cancelled)         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐         │
//!   │ target 1 │       │ target 2 │       │ target N │         │
//!   │ on_awake │       │ on_awake │       │ on_awake │         │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘         │
//!        │ Publishes        │                  │               │
//!        │ - Message        │                  │               │
//!        │ - BehaviourTrace │                  │               │
//!        ▼                  ▼                  ▼               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                         (per-sub queues, level filter)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Run
//! ```text
//! run()
//!   ├─► production scene elsewhere? ─► load it, Outcome::Redirected
//!   ├─► signal.notify_started()            (cancels a stale pending cycle)
//!   ├─► Discovery: live targets + subtrees, then templates (dedup by type + origin)
//!   ├─► Awake        ─┐
//!   ├─► UiInitialize  │ one task per participant, wait for all, report all
//!   ├─► Bind          │
//!   ├─► Start        ─┘
//!   └─► signal.notify_completed()  /  notify_error(err) on fatal error
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                          |
//! |-------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Participants**  | Phase methods, identity and children of a lifecycle object.      | [`LifecycleTarget`], [`Behaviour`], [`Node`] |
//! | **Templates**     | Instantiate missing participants on demand.                      | [`Template`], [`Component`], [`ComponentFn`] |
//! | **Orchestration** | Discovery, phases, redirect guard.                               | [`Orchestrator`], [`Roster`], [`run_phase`] |
//! | **Signal gate**   | Await scene readiness from anywhere.                             | [`InitSignal`], [`CycleState`]              |
//! | **Subscriber API**| Leveled, categorized event stream.                               | [`Subscribe`], [`Event`], [`Level`]         |
//! | **Errors**        | Typed errors for participants, factories, runs and waiters.      | [`PhaseError`], [`RuntimeError`], [`WaitError`] |
//! | **Configuration** | Centralize runtime settings.                                     | [`Config`], [`OriginMatch`]                 |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use phasevisor::{
//!     Behaviour, Category, ComponentFn, Config, InstantiateError, Level, Node, Orchestrator,
//!     PhaseContext, PhaseError, Scene, Template,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! struct HudView {
//!     name: String,
//! }
//!
//! impl Node for HudView {
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! #[async_trait]
//! impl Behaviour for HudView {
//!     async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
//!         ctx.log(Level::Info, Category::Ui, "hud bound");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hud = Template::new("Hud").with_component(ComponentFn::<HudView, _>::arc(
//!         |template: Arc<str>| async move {
//!             Ok::<_, InstantiateError>(Arc::new(HudView {
//!                 name: format!("{template} (Clone)"),
//!             }))
//!         },
//!     ));
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn phasevisor::Subscribe>> = vec![Arc::new(phasevisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn phasevisor::Subscribe>> = Vec::new();
//!
//!     let orch = Orchestrator::builder(Config::default())
//!         .with_environment(Arc::new(Scene::new("Field")))
//!         .with_templates(vec![hud])
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let outcome = orch.run().await?;
//!     assert_eq!(outcome.report().map(|r| r.participants()), Some(1));
//!
//!     orch.signal().wait(&CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod environment;
mod error;
mod events;
mod lifecycle;
mod signal;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Config, Discovery, Orchestrator, OrchestratorBuilder, OriginMatch, Outcome, PhaseFailure,
    PhaseParams, PhaseReport, Roster, RunReport, redirect, run_phase, should_redirect,
};
pub use environment::{Environment, Scene};
pub use error::{InstantiateError, PhaseError, RuntimeError, WaitError};
pub use events::{Bus, Category, Event, EventKind, Level};
pub use lifecycle::{
    Behaviour, Component, ComponentFn, ComponentRef, LifecycleTarget, Node, Phase, PhaseContext,
    TargetId, TargetRef, Template, TypeKey,
};
pub use signal::{CycleState, InitSignal};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a subscriber that renders events through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
