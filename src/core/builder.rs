use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::{
    core::Config,
    environment::{Environment, Scene},
    events::Bus,
    lifecycle::Template,
    signal::InitSignal,
    subscribers::{Subscribe, SubscriberSet},
};
use super::orchestrator::Orchestrator;

/// Builder for constructing an [`Orchestrator`].
pub struct OrchestratorBuilder {
    cfg: Config,
    env: Option<Arc<dyn Environment>>,
    templates: Vec<Template>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    signal: Option<InitSignal>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            env: None,
            templates: Vec::new(),
            subscribers: Vec::new(),
            signal: None,
        }
    }

    /// Sets the host environment. Defaults to an empty, unnamed [`Scene`].
    pub fn with_environment(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the templates instantiated when the scene lacks them, in order.
    pub fn with_templates(mut self, templates: Vec<Template>) -> Self {
        self.templates = templates;
        self
    }

    /// Sets event subscribers.
    ///
    /// Each subscriber gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Uses an existing signal instead of a fresh one.
    ///
    /// The orchestrator then publishes on the signal's bus, and
    /// `Config::bus_capacity` is ignored.
    pub fn with_signal(mut self, signal: InitSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Builds the orchestrator and starts forwarding bus events to subscribers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Orchestrator> {
        let bus = match &self.signal {
            Some(signal) => signal.bus().clone(),
            None => Bus::new(self.cfg.bus_capacity_clamped()),
        };
        let signal = self.signal.unwrap_or_else(|| InitSignal::new(bus.clone()));
        let env = self
            .env
            .unwrap_or_else(|| Arc::new(Scene::default()) as Arc<dyn Environment>);
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));

        subscriber_listener(&bus, Arc::clone(&subs));

        Arc::new(Orchestrator::new_internal(
            self.cfg,
            bus,
            subs,
            env,
            self.templates,
            signal,
        ))
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    if set.is_empty() {
        return;
    }
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}
