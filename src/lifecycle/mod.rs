//! Participant-side API: the lifecycle capability, its default behaviour,
//! phases, per-call context and templates.
//!
//! ## Contents
//! - [`LifecycleTarget`], [`Node`], [`TargetRef`], [`TargetId`], [`TypeKey`] capability and identity
//! - [`Behaviour`] traced no-op defaults for every phase
//! - [`Phase`] the four ordered steps
//! - [`PhaseContext`] what a phase method receives
//! - [`Template`], [`Component`], [`ComponentFn`] on-demand instantiation

mod behaviour;
mod context;
mod phase;
mod target;
mod template;

pub use behaviour::Behaviour;
pub use context::PhaseContext;
pub use phase::Phase;
pub use target::{LifecycleTarget, Node, TargetId, TargetRef, TypeKey};
pub use template::{Component, ComponentFn, ComponentRef, Template};
