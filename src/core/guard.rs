//! # Production redirect guard.
//!
//! Pre-flight check run before anything else: outside debug mode, a run that
//! starts in any scene other than the configured production scene is
//! abandoned and the production scene is loaded instead.

use crate::core::config::Config;
use crate::environment::Environment;
use crate::events::{Bus, Event, EventKind};

/// Returns true if the run must be replaced by a load of the production scene.
pub fn should_redirect(cfg: &Config, env: &dyn Environment) -> bool {
    if cfg.debug_mode {
        return false;
    }
    match cfg.production_target() {
        Some(target) => env.active_scene() != target,
        None => false,
    }
}

/// Publishes `RedirectRequested` and asks the environment to load the
/// production scene. Returns the scene name, or `None` when no production
/// scene is configured.
pub fn redirect(cfg: &Config, env: &dyn Environment, bus: &Bus) -> Option<String> {
    let target = cfg.production_target()?;
    bus.publish(Event::new(EventKind::RedirectRequested).with_target(target));
    env.load_scene(target);
    Some(target.to_string())
}
