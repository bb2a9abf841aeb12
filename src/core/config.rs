//! # Orchestrator configuration.
//!
//! Provides [`Config`] centralized settings for one orchestrator, and the
//! [`OriginMatch`] policy used to decide whether a template is already
//! provided by the scene.
//!
//! ## Sentinel values
//! - `phase_timeout = 0s` → no per-participant deadline (a hung participant
//!   stalls its phase)
//! - `production_scene = ""` → redirect disabled

use std::time::Duration;

use crate::lifecycle::LifecycleTarget;

/// How discovery decides that an existing participant came from a template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OriginMatch {
    /// The participant's object name contains the template name.
    ///
    /// `"Hud (Clone)"` matches `"Hud"`, but so does `"HudBackground"`, and a
    /// renamed instance does not match at all. An empty template name matches
    /// every participant of the same type.
    #[default]
    Substring,
    /// The participant's [`origin_tag`](crate::Node::origin_tag) equals the
    /// template name. Untagged participants never match.
    Tag,
}

impl OriginMatch {
    /// Returns true if `target` counts as produced from `template`.
    pub fn matches(&self, target: &dyn LifecycleTarget, template: &str) -> bool {
        match self {
            OriginMatch::Substring => target.name().contains(template),
            OriginMatch::Tag => target.origin_tag() == Some(template),
        }
    }
}

/// Configuration for one orchestrator.
///
/// ## Field semantics
/// - `debug_mode`: stay in the current environment (no production redirect)
/// - `production_scene`: environment to redirect to outside debug mode (`""` = never)
/// - `phase_timeout`: per-participant phase deadline (`0s` = none)
/// - `origin_match`: template dedup policy
/// - `trace_discovery`: publish verbose registration/instantiation events
/// - `trace_phases`: publish verbose phase start/finish events
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    pub debug_mode: bool,
    pub production_scene: String,
    pub phase_timeout: Duration,
    pub origin_match: OriginMatch,
    pub trace_discovery: bool,
    pub trace_phases: bool,
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the per-participant phase deadline as an `Option`.
    #[inline]
    pub fn phase_deadline(&self) -> Option<Duration> {
        if self.phase_timeout == Duration::ZERO {
            None
        } else {
            Some(self.phase_timeout)
        }
    }

    /// Returns the production scene, if one is configured.
    #[inline]
    pub fn production_target(&self) -> Option<&str> {
        if self.production_scene.is_empty() {
            None
        } else {
            Some(&self.production_scene)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `debug_mode = true` (never redirect)
    /// - `production_scene = "Title"`
    /// - `phase_timeout = 0s` (no deadline)
    /// - `origin_match = OriginMatch::Substring`
    /// - `trace_discovery = true`, `trace_phases = true`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            debug_mode: true,
            production_scene: "Title".to_string(),
            phase_timeout: Duration::ZERO,
            origin_match: OriginMatch::Substring,
            trace_discovery: true,
            trace_phases: true,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_none() {
        let mut cfg = Config::default();
        assert_eq!(cfg.phase_deadline(), None);
        assert_eq!(cfg.production_target(), Some("Title"));

        cfg.phase_timeout = Duration::from_millis(250);
        cfg.production_scene.clear();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.phase_deadline(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.production_target(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
