//! # Orchestrator: drives one scene through discovery and the four phases.
//!
//! The [`Orchestrator`] owns the event bus, a [`SubscriberSet`], the host
//! [`Environment`], the template list and the [`InitSignal`] it resolves.
//!
//! ## High-level flow
//! ```text
//! run()
//!   ├─► guard::should_redirect(cfg, env)?
//!   │       └─ yes ─► guard::redirect() ─► Ok(Outcome::Redirected)   (signal untouched)
//!   ├─► signal.notify_started()
//!   ├─► execute_lifecycle()                                 (catch_unwind)
//!   │       ├─ cancelled? ─► Err(Canceled { stage: "discovery" })
//!   │       ├─ Discovery::run(env, templates) ─► Roster
//!   │       └─ for phase in Phase::ALL
//!   │             ├─ cancelled? ─► Err(Canceled { stage: phase })
//!   │             └─ run_phase(roster, phase) ─► PhaseReport      (barrier)
//!   ├─ Ok  ─► LifecycleCompleted, signal.notify_completed()
//!   └─ Err ─► LifecycleFailed,    signal.notify_error(err)
//!
//! Event flow:
//!   Discovery / phase tasks / InitSignal ── publish ──► Bus ──► listener ──► SubscriberSet
//! ```
//!
//! Participant failures never fail the run: they are recorded in the
//! [`RunReport`]. Only cancellation and panics escaping the machinery do.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use phasevisor::{Behaviour, Config, Node, Orchestrator, Outcome, Scene};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Clock;
//!
//! impl Node for Clock {
//!     fn name(&self) -> &str {
//!         "Clock"
//!     }
//! }
//!
//! impl Behaviour for Clock {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scene = Arc::new(Scene::new("Title").with_target(Arc::new(Clock)));
//!     let orch = Orchestrator::builder(Config::default())
//!         .with_environment(scene)
//!         .build();
//!
//!     let ready = orch.signal().clone();
//!     match orch.run().await? {
//!         Outcome::Completed(report) => assert_eq!(report.participants(), 1),
//!         Outcome::Redirected { .. } => unreachable!("debug mode never redirects"),
//!     }
//!     ready.wait(&CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::OrchestratorBuilder,
    config::Config,
    discovery::Discovery,
    guard,
    phase_runner::{PhaseFailure, PhaseParams, PhaseReport, run_phase},
    roster::Roster,
};
use crate::environment::Environment;
use crate::error::{RuntimeError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::{Phase, Template};
use crate::signal::InitSignal;
use crate::subscribers::SubscriberSet;

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Participants in discovery order.
    pub roster: Roster,
    /// One report per phase, in execution order.
    pub phases: Vec<PhaseReport>,
}

impl RunReport {
    /// Number of participants driven through the phases.
    pub fn participants(&self) -> usize {
        self.roster.len()
    }

    /// Every participant failure across all phases, in phase order.
    pub fn failures(&self) -> impl Iterator<Item = &PhaseFailure> {
        self.phases.iter().flat_map(|p| p.failures.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.phases.iter().all(PhaseReport::is_clean)
    }
}

/// What [`Orchestrator::run`] did.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Discovery and all phases ran.
    Completed(RunReport),
    /// The production guard loaded `scene` instead; nothing else ran.
    Redirected { scene: String },
}

impl Outcome {
    pub fn is_redirected(&self) -> bool {
        matches!(self, Outcome::Redirected { .. })
    }

    /// Report of a completed run.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Redirected { .. } => None,
        }
    }
}

/// Drives discovery, the phases and the initialization signal for one scene.
pub struct Orchestrator {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    env: Arc<dyn Environment>,
    templates: Vec<Template>,
    signal: InitSignal,
    runtime_token: CancellationToken,
    run_lock: tokio::sync::Mutex<()>,
}

impl Orchestrator {
    /// Returns a builder for configuring the orchestrator.
    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        env: Arc<dyn Environment>,
        templates: Vec<Template>,
        signal: InitSignal,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            env,
            templates,
            signal,
            runtime_token: CancellationToken::new(),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Runs the full initialization sequence once.
    ///
    /// Concurrent calls are serialized. Returns `Err` only for
    /// orchestration-fatal errors; the same error is injected into the signal.
    pub async fn run(&self) -> Result<Outcome, RuntimeError> {
        let _serial = self.run_lock.lock().await;

        if guard::should_redirect(&self.cfg, self.env.as_ref()) {
            if let Some(scene) = guard::redirect(&self.cfg, self.env.as_ref(), &self.bus) {
                return Ok(Outcome::Redirected { scene });
            }
        }

        self.signal.notify_started();

        let res = match std::panic::AssertUnwindSafe(self.execute_lifecycle())
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(panic_err) => Err(RuntimeError::Panicked {
                info: panic_info(panic_err.as_ref()).into(),
            }),
        };

        match res {
            Ok(report) => {
                self.bus.publish(
                    Event::new(EventKind::LifecycleCompleted).with_count(report.participants()),
                );
                self.signal.notify_completed();
                Ok(Outcome::Completed(report))
            }
            Err(err) => {
                self.bus
                    .publish(Event::new(EventKind::LifecycleFailed).with_reason(err.as_message()));
                self.signal.notify_error(err.clone());
                Err(err)
            }
        }
    }

    /// Cancels the runtime token.
    ///
    /// A run in progress stops before its next stage and fails the signal;
    /// running participants see their context token cancelled. The
    /// orchestrator cannot run again afterwards.
    pub fn cancel(&self) {
        self.runtime_token.cancel();
    }

    /// Signal resolved by every run.
    pub fn signal(&self) -> &InitSignal {
        &self.signal
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    async fn execute_lifecycle(&self) -> Result<RunReport, RuntimeError> {
        self.ensure_live("discovery")?;
        let roster = Discovery::new(self.bus.clone(), &self.cfg)
            .run(self.env.as_ref(), &self.templates)
            .await;

        let params = PhaseParams::from(&self.cfg);
        let mut phases = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            self.ensure_live(phase.as_str())?;
            phases.push(run_phase(&roster, phase, params, &self.bus, &self.runtime_token).await);
        }

        Ok(RunReport { roster, phases })
    }

    fn ensure_live(&self, stage: &'static str) -> Result<(), RuntimeError> {
        if self.runtime_token.is_cancelled() {
            Err(RuntimeError::Canceled { stage })
        } else {
            Ok(())
        }
    }
}
