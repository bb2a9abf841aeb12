//! # Discovery & registration.
//!
//! Builds the [`Roster`] for one run from two sources:
//!
//! ```text
//! Discovery::run(env, templates)
//!   ├─► env.live_targets()          ─► register each (with subtree)
//!   ├─► for template in templates   (list order)
//!   │     ├─ no components          ─► TemplateEmpty (warning), skip
//!   │     └─ for component
//!   │          ├─ roster has type + origin match ─► TemplateSkipped
//!   │          └─ instantiate(template.name())
//!   │               ├─ Ok(target)   ─► register (with subtree), TemplateInstantiated
//!   │               └─ Err / panic  ─► InstantiateFailed (error), continue
//!   └─► DiscoveryFinished { count }
//! ```
//!
//! Failures are contained per template component: one broken factory never
//! stops the remaining components or templates.

use futures::FutureExt;

use crate::core::config::{Config, OriginMatch};
use crate::core::roster::Roster;
use crate::environment::Environment;
use crate::error::{InstantiateError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::{Component, TargetRef, Template};

/// Discovery and registration engine.
#[derive(Clone, Debug)]
pub struct Discovery {
    bus: Bus,
    origin_match: OriginMatch,
    trace: bool,
}

impl Discovery {
    /// Creates an engine publishing to `bus` with the dedup policy and trace toggle from `cfg`.
    pub fn new(bus: Bus, cfg: &Config) -> Self {
        Self {
            bus,
            origin_match: cfg.origin_match,
            trace: cfg.trace_discovery,
        }
    }

    /// Discovers live participants, instantiates missing template participants
    /// and returns the roster in discovery order.
    pub async fn run(&self, env: &dyn Environment, templates: &[Template]) -> Roster {
        let mut roster = Roster::new();

        for target in env.live_targets() {
            self.register(&mut roster, target);
        }
        for template in templates {
            self.instantiate_template(&mut roster, template).await;
        }

        self.verbose(Event::new(EventKind::DiscoveryFinished).with_count(roster.len()));
        roster
    }

    fn register(&self, roster: &mut Roster, target: TargetRef) {
        let added = roster.register(target);
        if !self.trace {
            return;
        }
        for t in added {
            self.bus.publish(
                Event::new(EventKind::TargetRegistered)
                    .with_target(t.name())
                    .with_reason(t.type_key().name()),
            );
        }
    }

    async fn instantiate_template(&self, roster: &mut Roster, template: &Template) {
        if template.components().is_empty() {
            self.bus
                .publish(Event::new(EventKind::TemplateEmpty).with_target(template.name()));
            return;
        }

        for component in template.components() {
            let key = component.type_key();
            if roster.has_instance_from(&key, template.name(), self.origin_match) {
                self.verbose(
                    Event::new(EventKind::TemplateSkipped)
                        .with_target(template.name())
                        .with_reason(key.name()),
                );
                continue;
            }

            match instantiate(component.as_ref(), template.name()).await {
                Ok(target) => {
                    self.register(roster, target);
                    self.verbose(
                        Event::new(EventKind::TemplateInstantiated)
                            .with_target(template.name())
                            .with_reason(key.name()),
                    );
                }
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::InstantiateFailed)
                            .with_target(template.name())
                            .with_reason(format!("{} ({}): {}", template.name(), key, e.as_message())),
                    );
                }
            }
        }
    }

    fn verbose(&self, ev: Event) {
        if self.trace {
            self.bus.publish(ev);
        }
    }
}

/// Runs one factory, turning a panic into [`InstantiateError::Panicked`].
async fn instantiate(component: &dyn Component, template: &str) -> Result<TargetRef, InstantiateError> {
    match std::panic::AssertUnwindSafe(component.instantiate(template))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic_err) => Err(InstantiateError::Panicked {
            info: panic_info(panic_err.as_ref()),
        }),
    }
}
