//! # Run one phase across the whole roster.
//!
//! Fans out one task per participant, waits for every task to settle, then
//! reports all failures at once.
//!
//! ```text
//! run_phase(roster, phase)
//!   ├─► publish PhaseStarting { count }               (trace_phases)
//!   ├─► JoinSet::spawn(settle(target, ctx)) per participant
//!   │        settle:
//!   │          ├─ phase.invoke(target, ctx)  (catch_unwind)
//!   │          ├─ deadline? → cancel ctx token → Timeout
//!   │          └─ Ok / Err / Panicked
//!   ├─► barrier: join every task
//!   ├─► publish ParticipantFailed per failure          (after the barrier)
//!   └─► publish PhaseFinished { count = failures }     (trace_phases)
//! ```
//!
//! ## Rules
//! - A failure never aborts siblings or the phase
//! - No ordering between participants within a phase
//! - Each call gets a **child token** of the runtime token; cancelling it on
//!   deadline does not affect siblings
//! - Without a deadline a hung participant stalls the phase

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::{task::JoinSet, time};
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::core::roster::Roster;
use crate::error::{PhaseError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::{LifecycleTarget, Phase, PhaseContext};

/// Knobs for [`run_phase`], usually derived from [`Config`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseParams {
    /// Per-participant deadline (`None` = wait forever).
    pub timeout: Option<Duration>,
    /// Publish verbose `PhaseStarting` / `PhaseFinished` events.
    pub trace: bool,
}

impl From<&Config> for PhaseParams {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.phase_deadline(),
            trace: cfg.trace_phases,
        }
    }
}

/// One participant's failure in one phase.
#[derive(Clone, Debug)]
pub struct PhaseFailure {
    /// Concrete type name of the participant (module path stripped).
    pub participant: &'static str,
    /// Object name of the participant.
    pub object: Arc<str>,
    pub phase: Phase,
    pub error: PhaseError,
}

/// Outcome of one phase barrier.
#[derive(Clone, Debug)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Number of participant tasks launched.
    pub launched: usize,
    /// Failures in roster order.
    pub failures: Vec<PhaseFailure>,
}

impl PhaseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes `phase` on every participant of `roster` concurrently and waits
/// for all of them to settle.
pub async fn run_phase(
    roster: &Roster,
    phase: Phase,
    params: PhaseParams,
    bus: &Bus,
    runtime_token: &CancellationToken,
) -> PhaseReport {
    if params.trace {
        bus.publish(
            Event::new(EventKind::PhaseStarting)
                .with_phase(phase)
                .with_count(roster.len()),
        );
    }

    let mut set = JoinSet::new();
    let mut outcomes: Vec<Option<Result<(), PhaseError>>> = vec![None; roster.len()];

    for (idx, target) in roster.iter().enumerate() {
        let target = Arc::clone(target);
        let ctx = PhaseContext::new(phase, target.name(), runtime_token.child_token(), bus.clone());
        let timeout = params.timeout;
        set.spawn(async move { (idx, settle(target.as_ref(), &ctx, timeout).await) });
    }

    while let Some(joined) = set.join_next().await {
        // settle() catches panics; a JoinError only means the task was aborted
        if let Ok((idx, res)) = joined {
            outcomes[idx] = Some(res);
        }
    }

    let failures: Vec<PhaseFailure> = roster
        .iter()
        .zip(outcomes)
        .filter_map(|(target, outcome)| {
            let error = match outcome {
                Some(Ok(())) => return None,
                Some(Err(e)) => e,
                None => PhaseError::Canceled,
            };
            Some(PhaseFailure {
                participant: target.type_key().short_name(),
                object: Arc::from(target.name()),
                phase,
                error,
            })
        })
        .collect();

    for f in &failures {
        bus.publish(
            Event::new(EventKind::ParticipantFailed)
                .with_target(f.participant)
                .with_phase(phase)
                .with_reason(f.error.as_message()),
        );
    }
    if params.trace {
        bus.publish(
            Event::new(EventKind::PhaseFinished)
                .with_phase(phase)
                .with_count(failures.len()),
        );
    }

    PhaseReport {
        phase,
        launched: roster.len(),
        failures,
    }
}

/// Runs one phase call, converting panics and an expired deadline into [`PhaseError`].
async fn settle(
    target: &dyn LifecycleTarget,
    ctx: &PhaseContext,
    timeout: Option<Duration>,
) -> Result<(), PhaseError> {
    // build the phase future inside the guarded block: a method may panic before returning it
    let call = std::panic::AssertUnwindSafe(async { ctx.phase().invoke(target, ctx).await })
        .catch_unwind();

    let res = match timeout {
        Some(dur) => match time::timeout(dur, call).await {
            Ok(r) => r,
            Err(_elapsed) => {
                ctx.token().cancel();
                return Err(PhaseError::Timeout { timeout: dur });
            }
        },
        None => call.await,
    };

    res.unwrap_or_else(|panic_err| {
        Err(PhaseError::Panicked {
            info: panic_info(panic_err.as_ref()),
        })
    })
}
