//! # Lifecycle capability.
//!
//! A participant is anything implementing [`LifecycleTarget`]: the four phase
//! methods plus the identity accessors from [`Node`]. Participants are shared
//! as [`TargetRef`] (`Arc<dyn LifecycleTarget>`) and compared by reference
//! identity ([`TargetId`]), never by value.
//!
//! Implement [`LifecycleTarget`] directly when every phase matters, or
//! [`Behaviour`](crate::Behaviour) to get traced no-op defaults and override
//! only what you need.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PhaseError;
use crate::lifecycle::PhaseContext;

/// Shared handle to a participant.
pub type TargetRef = Arc<dyn LifecycleTarget>;

/// Concrete type of a participant, used to bucket the type index.
///
/// Equality and hashing use the [`TypeId`] only; the name is for logs.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path (`game::ui::HudView` → `HudView`).
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Reference identity of a participant (address of the shared allocation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    pub fn of(target: &TargetRef) -> Self {
        TargetId(Arc::as_ptr(target) as *const () as usize)
    }
}

/// Identity and hierarchy accessors shared by every participant.
pub trait Node: Send + Sync + 'static {
    /// Object name as seen in the environment, e.g. `"Hud (Clone)"`.
    fn name(&self) -> &str;

    /// Concrete type used for the type index.
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// Explicit origin tag: the name of the template this object came from.
    ///
    /// Only consulted under [`OriginMatch::Tag`](crate::OriginMatch::Tag).
    fn origin_tag(&self) -> Option<&str> {
        None
    }

    /// Lifecycle-capable objects nested under this one.
    ///
    /// Discovery registers the whole subtree, at any depth.
    fn children(&self) -> Vec<TargetRef> {
        Vec::new()
    }
}

/// # Lifecycle capability contract.
///
/// Each method is awaited once per orchestration run, in [`Phase::ALL`](crate::Phase::ALL)
/// order across the whole roster. Returning an error only affects this call:
/// siblings keep running and the participant still gets the later phases.
#[async_trait]
pub trait LifecycleTarget: Node {
    /// Setup that does not interact with other participants.
    async fn on_awake(&self, ctx: &PhaseContext) -> Result<(), PhaseError>;

    /// UI presentation setup.
    async fn on_ui_initialize(&self, ctx: &PhaseContext) -> Result<(), PhaseError>;

    /// Wiring that involves other participants.
    async fn on_bind(&self, ctx: &PhaseContext) -> Result<(), PhaseError>;

    /// Final step before the scene starts.
    async fn on_start(&self, ctx: &PhaseContext) -> Result<(), PhaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod game {
        pub struct HudView;
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn type_key_compares_by_type() {
        assert_eq!(TypeKey::of::<game::HudView>(), TypeKey::of::<game::HudView>());
        assert_ne!(TypeKey::of::<game::HudView>(), TypeKey::of::<String>());
    }

    #[test]
    fn short_name_strips_paths_and_generics() {
        assert_eq!(TypeKey::of::<game::HudView>().short_name(), "HudView");
        assert_eq!(
            TypeKey::of::<game::Wrapper<game::HudView>>().short_name(),
            "Wrapper"
        );
    }
}
