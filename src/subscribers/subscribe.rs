//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging event handlers (log sinks,
//! metrics, test probes) into the runtime. Each subscriber is driven by a
//! dedicated worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) – they do **not** block the
//!   publisher nor other subscribers.
//! - Each subscriber declares its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** and a `SubscriberOverflow` event is published.
//! - Events below [`Subscribe::min_level`] are filtered before queueing.

use async_trait::async_trait;

use crate::events::{Event, Level};

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Lowest severity this subscriber wants to receive.
    fn min_level(&self) -> Level {
        Level::Verbose
    }
}
