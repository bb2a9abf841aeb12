//! # Default phase behaviour.
//!
//! [`Behaviour`] mirrors [`LifecycleTarget`] with a default body for every
//! phase: publish a verbose [`EventKind::BehaviourTrace`](crate::EventKind::BehaviourTrace)
//! and succeed. Any `Behaviour` is a `LifecycleTarget` through a blanket impl,
//! so implementors override only the phases they care about.
//!
//! An override that still wants the trace calls `ctx.trace_default()`.
//!
//! ```rust
//! use async_trait::async_trait;
//! use phasevisor::{Behaviour, Node, PhaseContext, PhaseError};
//!
//! struct Inventory;
//!
//! impl Node for Inventory {
//!     fn name(&self) -> &str { "Inventory" }
//! }
//!
//! #[async_trait]
//! impl Behaviour for Inventory {
//!     async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
//!         ctx.trace_default();
//!         // hook up to the item database...
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::PhaseError;
use crate::lifecycle::{LifecycleTarget, Node, PhaseContext};

/// Lifecycle participant with traced no-op defaults for every phase.
#[async_trait]
pub trait Behaviour: Node {
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.trace_default();
        Ok(())
    }

    async fn on_ui_initialize(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.trace_default();
        Ok(())
    }

    async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.trace_default();
        Ok(())
    }

    async fn on_start(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        ctx.trace_default();
        Ok(())
    }
}

#[async_trait]
impl<T: Behaviour> LifecycleTarget for T {
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        Behaviour::on_awake(self, ctx).await
    }

    async fn on_ui_initialize(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        Behaviour::on_ui_initialize(self, ctx).await
    }

    async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        Behaviour::on_bind(self, ctx).await
    }

    async fn on_start(&self, ctx: &PhaseContext) -> Result<(), PhaseError> {
        Behaviour::on_start(self, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Bus, EventKind};
    use crate::lifecycle::{Phase, TargetRef};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio_util::sync::CancellationToken;

    struct Banner {
        started: AtomicBool,
    }

    impl Node for Banner {
        fn name(&self) -> &str {
            "Banner"
        }
    }

    #[async_trait]
    impl Behaviour for Banner {
        async fn on_start(&self, _ctx: &PhaseContext) -> Result<(), PhaseError> {
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn defaults_trace_and_overrides_replace_them() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let banner = Arc::new(Banner {
            started: AtomicBool::new(false),
        });
        let target: TargetRef = banner.clone();

        for phase in Phase::ALL {
            let ctx = PhaseContext::new(phase, "Banner", CancellationToken::new(), bus.clone());
            phase.invoke(target.as_ref(), &ctx).await.expect("phase ok");
        }

        let mut traced = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.kind, EventKind::BehaviourTrace);
            traced.extend(ev.phase);
        }
        assert_eq!(traced, vec![Phase::Awake, Phase::UiInitialize, Phase::Bind]);
        assert!(banner.started.load(Ordering::SeqCst));
    }
}
