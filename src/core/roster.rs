//! # Roster: ordered, deduplicated participants plus the type index.
//!
//! ```text
//! register(root)
//!   stack = [root]
//!   while let Some(t) = stack.pop()
//!     ├─ seen(t)?  → skip            (identity set, terminates on cycles)
//!     ├─ targets.push(t)              (discovery order)
//!     ├─ by_type[t.type_key()].push(t)
//!     └─ push t.children() reversed   (depth-first, pre-order)
//! ```
//!
//! ## Invariants
//! - every participant appears at most once in `targets`
//! - every roster member sits in exactly one type bucket, buckets have no duplicates

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::core::config::OriginMatch;
use crate::lifecycle::{TargetId, TargetRef, TypeKey};

/// Ordered participants of one orchestration run.
#[derive(Default, Clone)]
pub struct Roster {
    targets: Vec<TargetRef>,
    registered: HashSet<TargetId>,
    by_type: HashMap<TypeKey, Vec<TargetRef>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `root` and every lifecycle-capable descendant.
    ///
    /// Already registered participants (and their subtrees) are skipped.
    /// Returns the participants added by this call, in registration order.
    pub fn register(&mut self, root: TargetRef) -> &[TargetRef] {
        let start = self.targets.len();
        let mut stack = vec![root];

        while let Some(target) = stack.pop() {
            if !self.registered.insert(TargetId::of(&target)) {
                continue;
            }
            let children = target.children();
            stack.extend(
                children
                    .into_iter()
                    .rev()
                    .filter(|c| !self.registered.contains(&TargetId::of(c))),
            );

            self.by_type
                .entry(target.type_key())
                .or_default()
                .push(Arc::clone(&target));
            self.targets.push(target);
        }
        &self.targets[start..]
    }

    pub fn contains(&self, target: &TargetRef) -> bool {
        self.registered.contains(&TargetId::of(target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetRef> {
        self.targets.iter()
    }

    pub fn as_slice(&self) -> &[TargetRef] {
        &self.targets
    }

    /// Participants of the given concrete type, in registration order.
    pub fn of_type(&self, key: &TypeKey) -> &[TargetRef] {
        self.by_type.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if a participant of type `key` already counts as produced
    /// from `template` under `policy`.
    pub fn has_instance_from(&self, key: &TypeKey, template: &str, policy: OriginMatch) -> bool {
        self.of_type(key)
            .iter()
            .any(|t| policy.matches(t.as_ref(), template))
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a TargetRef;
    type IntoIter = std::slice::Iter<'a, TargetRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

impl fmt::Debug for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.targets.iter().map(|t| t.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Behaviour, Node};
    use parking_lot::Mutex;

    struct Obj {
        name: String,
        children: Mutex<Vec<TargetRef>>,
    }

    impl Obj {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                children: Mutex::new(Vec::new()),
            })
        }

        fn adopt(&self, child: TargetRef) {
            self.children.lock().push(child);
        }
    }

    impl Node for Obj {
        fn name(&self) -> &str {
            &self.name
        }

        fn children(&self) -> Vec<TargetRef> {
            self.children.lock().clone()
        }
    }

    impl Behaviour for Obj {}

    struct Other;

    impl Node for Other {
        fn name(&self) -> &str {
            "other"
        }
    }

    impl Behaviour for Other {}

    fn names(roster: &Roster) -> Vec<String> {
        roster.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn registers_subtree_depth_first() {
        let root = Obj::new("root");
        let a = Obj::new("a");
        let a1 = Obj::new("a1");
        let b = Obj::new("b");
        a.adopt(a1.clone());
        root.adopt(a.clone());
        root.adopt(b.clone());

        let mut roster = Roster::new();
        let added = roster.register(root.clone()).len();

        assert_eq!(added, 4);
        assert_eq!(names(&roster), ["root", "a", "a1", "b"]);
    }

    #[test]
    fn never_registers_twice() {
        let root = Obj::new("root");
        let child = Obj::new("child");
        root.adopt(child.clone());

        let mut roster = Roster::new();
        assert_eq!(roster.register(child.clone()).len(), 1);
        assert_eq!(roster.register(root.clone()).len(), 1);
        assert!(roster.register(root.clone()).is_empty());

        assert_eq!(names(&roster), ["child", "root"]);
        assert_eq!(roster.of_type(&TypeKey::of::<Obj>()).len(), 2);

        let root: TargetRef = root;
        let child: TargetRef = child;
        let stranger: TargetRef = Obj::new("root");
        assert!(roster.contains(&root));
        assert!(roster.contains(&child));
        // same name, different object
        assert!(!roster.contains(&stranger));
    }

    #[test]
    fn deep_nesting_is_reached() {
        let root = Obj::new("n0");
        let mut parent = root.clone();
        for depth in 1..=64 {
            let child = Obj::new(&format!("n{depth}"));
            parent.adopt(child.clone());
            parent = child;
        }

        let mut roster = Roster::new();
        roster.register(root);

        assert_eq!(roster.len(), 65);
        assert_eq!(roster.as_slice()[64].name(), "n64");
    }

    #[test]
    fn cycles_terminate() {
        let a = Obj::new("a");
        let b = Obj::new("b");
        a.adopt(b.clone());
        b.adopt(a.clone());

        let mut roster = Roster::new();
        roster.register(a.clone());

        assert_eq!(names(&roster), ["a", "b"]);

        // break the Arc cycle so the test does not leak
        a.children.lock().clear();
    }

    #[test]
    fn type_index_buckets_by_concrete_type() {
        let mut roster = Roster::new();
        roster.register(Obj::new("x"));
        roster.register(Arc::new(Other));
        roster.register(Obj::new("y"));

        assert_eq!(roster.of_type(&TypeKey::of::<Obj>()).len(), 2);
        assert_eq!(roster.of_type(&TypeKey::of::<Other>()).len(), 1);
        assert!(roster.of_type(&TypeKey::of::<String>()).is_empty());
    }

    #[test]
    fn origin_lookup_follows_policy() {
        let mut roster = Roster::new();
        roster.register(Obj::new("Hud (Clone)"));
        let key = TypeKey::of::<Obj>();

        assert!(roster.has_instance_from(&key, "Hud", OriginMatch::Substring));
        assert!(!roster.has_instance_from(&key, "Minimap", OriginMatch::Substring));
        assert!(!roster.has_instance_from(&key, "Hud", OriginMatch::Tag));
        assert!(!roster.has_instance_from(&TypeKey::of::<Other>(), "Hud", OriginMatch::Substring));
    }
}
