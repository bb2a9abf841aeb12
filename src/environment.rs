//! # Host environment.
//!
//! The orchestrator never talks to an engine directly. It asks an
//! [`Environment`] which scene is active, which participants already live
//! in it, and to load another scene when the production guard redirects.
//!
//! [`Scene`] is the in-memory implementation used by tests, demos and hosts
//! that assemble participants by hand.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::lifecycle::{LifecycleTarget, TargetRef};

/// Host services the orchestrator depends on.
pub trait Environment: Send + Sync + 'static {
    /// Name of the currently active scene.
    fn active_scene(&self) -> String;

    /// Requests a scene load. Fire-and-forget: the orchestrator does not
    /// wait for the load to finish.
    fn load_scene(&self, name: &str);

    /// Root participants currently alive in the active scene.
    ///
    /// Children are reached through [`Node::children`](crate::Node::children),
    /// so returning only roots is enough.
    fn live_targets(&self) -> Vec<TargetRef>;
}

/// In-memory scene: a name plus a list of live root participants.
///
/// Loading another scene switches the name and drops every live target.
#[derive(Default)]
pub struct Scene {
    state: Mutex<SceneState>,
}

#[derive(Default)]
struct SceneState {
    active: String,
    targets: Vec<TargetRef>,
    loads: Vec<String>,
}

impl Scene {
    /// Creates an empty scene named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SceneState {
                active: name.into(),
                ..SceneState::default()
            }),
        }
    }

    /// Adds a live root participant (builder style).
    pub fn with_target<T: LifecycleTarget>(self, target: Arc<T>) -> Self {
        self.add_target(target);
        self
    }

    /// Adds a live root participant.
    pub fn add_target(&self, target: TargetRef) {
        self.state.lock().targets.push(target);
    }

    /// Scene names requested through [`Environment::load_scene`], oldest first.
    pub fn loads(&self) -> Vec<String> {
        self.state.lock().loads.clone()
    }
}

impl Environment for Scene {
    fn active_scene(&self) -> String {
        self.state.lock().active.clone()
    }

    fn load_scene(&self, name: &str) {
        let mut state = self.state.lock();
        state.loads.push(name.to_string());
        state.active = name.to_string();
        state.targets.clear();
    }

    fn live_targets(&self) -> Vec<TargetRef> {
        self.state.lock().targets.clone()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Scene")
            .field("active", &state.active)
            .field("targets", &state.targets.len())
            .field("loads", &state.loads)
            .finish()
    }
}
