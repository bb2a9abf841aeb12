//! Runtime core: discovery, phase execution and orchestration.
//!
//! Internal modules:
//! - [`config`]: orchestrator settings and the template origin policy;
//! - [`roster`]: ordered, deduplicated participant list plus type index;
//! - [`discovery`]: builds the roster from the environment and templates;
//! - [`phase_runner`]: runs one phase across the roster behind a barrier;
//! - [`guard`]: production redirect check;
//! - [`orchestrator`]: drives guard, discovery, phases and the signal;
//! - [`builder`]: assembles an orchestrator.

mod builder;
mod config;
mod discovery;
mod guard;
mod orchestrator;
mod phase_runner;
mod roster;

pub use builder::OrchestratorBuilder;
pub use config::{Config, OriginMatch};
pub use discovery::Discovery;
pub use guard::{redirect, should_redirect};
pub use orchestrator::{Orchestrator, Outcome, RunReport};
pub use phase_runner::{PhaseFailure, PhaseParams, PhaseReport, run_phase};
pub use roster::Roster;
