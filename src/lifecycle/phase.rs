//! # Initialization phases.
//!
//! Every participant runs every phase, and phase N+1 never starts for anyone
//! before all participants have settled phase N.
//!
//! ```text
//! Awake ──► UiInitialize ──► Bind ──► Start
//!  │           │              │        └─ last step before the scene goes live
//!  │           │              └─ cross-object wiring (event hookups, lookups)
//!  │           └─ UI presentation setup
//!  └─ self-contained setup, must not touch other participants
//! ```

use std::fmt;

use futures::future::BoxFuture;

use crate::error::PhaseError;
use crate::lifecycle::{LifecycleTarget, PhaseContext};

/// One of the four ordered initialization steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Self-contained setup that does not interact with other participants.
    Awake,
    /// UI presentation setup.
    UiInitialize,
    /// Wiring that involves other participants.
    Bind,
    /// Final step before the scene starts.
    Start,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [Phase::Awake, Phase::UiInitialize, Phase::Bind, Phase::Start];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Awake => "awake",
            Phase::UiInitialize => "ui_initialize",
            Phase::Bind => "bind",
            Phase::Start => "start",
        }
    }

    /// Selects and invokes this phase's method on `target`.
    pub fn invoke<'a>(
        self,
        target: &'a dyn LifecycleTarget,
        ctx: &'a PhaseContext,
    ) -> BoxFuture<'a, Result<(), PhaseError>> {
        match self {
            Phase::Awake => target.on_awake(ctx),
            Phase::UiInitialize => target.on_ui_initialize(ctx),
            Phase::Bind => target.on_bind(ctx),
            Phase::Start => target.on_start(ctx),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_execution_order() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
        assert_eq!(Phase::ALL[0], Phase::Awake);
        assert_eq!(Phase::ALL[3], Phase::Start);
    }
}
