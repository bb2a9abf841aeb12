//! # Templates and component factories.
//!
//! A [`Template`] is a named blueprint carrying zero or more [`Component`]
//! factories, one per concrete participant type it can produce. Discovery asks
//! each component for its [`TypeKey`] to decide whether the scene already
//! provides that participant, and calls [`Component::instantiate`] otherwise.
//!
//! [`ComponentFn`] wraps a closure `F: Fn(Arc<str>) -> Fut`, producing a fresh
//! participant per call. The closure receives the template name.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use phasevisor::{Behaviour, ComponentFn, InstantiateError, Node, Template};
//!
//! struct HudView { name: String }
//!
//! impl Node for HudView {
//!     fn name(&self) -> &str { &self.name }
//! }
//! impl Behaviour for HudView {}
//!
//! let hud = Template::new("Hud").with_component(ComponentFn::<HudView, _>::arc(
//!     |template: Arc<str>| async move {
//!         Ok::<_, InstantiateError>(Arc::new(HudView { name: format!("{template} (Clone)") }))
//!     },
//! ));
//! assert_eq!(hud.name(), "Hud");
//! assert_eq!(hud.components().len(), 1);
//! ```

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::InstantiateError;
use crate::lifecycle::{LifecycleTarget, TargetRef, TypeKey};

/// Shared handle to a component factory.
pub type ComponentRef = Arc<dyn Component>;

/// Factory for one concrete participant type.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Concrete type of the participants this factory produces.
    fn type_key(&self) -> TypeKey;

    /// Produces a fresh participant (with its subtree) from the template `template`.
    async fn instantiate(&self, template: &str) -> Result<TargetRef, InstantiateError>;
}

/// Closure-backed component producing participants of type `T`.
pub struct ComponentFn<T, F> {
    f: F,
    _target: PhantomData<fn() -> Arc<T>>,
}

impl<T, F, Fut> ComponentFn<T, F>
where
    F: Fn(Arc<str>) -> Fut,
    Fut: Future<Output = Result<Arc<T>, InstantiateError>>,
{
    /// Creates a new closure-backed component.
    ///
    /// Prefer [`ComponentFn::arc`] when you immediately need a [`ComponentRef`].
    pub fn new(f: F) -> Self {
        Self {
            f,
            _target: PhantomData,
        }
    }

    /// Creates the component as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<T, F, Fut> Component for ComponentFn<T, F>
where
    T: LifecycleTarget,
    F: Fn(Arc<str>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<T>, InstantiateError>> + Send + 'static,
{
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    async fn instantiate(&self, template: &str) -> Result<TargetRef, InstantiateError> {
        let target: TargetRef = (self.f)(Arc::from(template)).await?;
        Ok(target)
    }
}

/// Named blueprint with its component factories.
#[derive(Clone)]
pub struct Template {
    name: Arc<str>,
    components: Vec<ComponentRef>,
}

impl Template {
    /// Creates an empty template.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Adds a component factory.
    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.components.push(component);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self
            .components
            .iter()
            .map(|c| c.type_key().short_name())
            .collect();
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("components", &types)
            .finish()
    }
}
