//! Ordered registry of mounted contributor instances.
//!
//! Invariants:
//! - Iteration order is mount order; `update` keeps an instance's position.
//! - Ids are never reused within one registry.
//! - Operations on unknown ids are no-ops.
//!
//! Removal leaves a tombstone that is compacted once tombstones outnumber
//! live instances, so every operation is O(1) amortized.

use crate::props::PropBag;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributorInstance {
    pub id: InstanceId,
    pub props: PropBag,
}

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    slots: Vec<Option<ContributorInstance>>,
    index: HashMap<InstanceId, usize>,
    next_id: u64,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, props: PropBag) -> InstanceId {
        self.next_id += 1;
        let id = InstanceId(self.next_id);
        self.index.insert(id, self.slots.len());
        self.slots.push(Some(ContributorInstance { id, props }));
        log::trace!(target: "head.registry", "register {id} ({} mounted)", self.len());
        id
    }

    /// Replace the props of a mounted instance. Returns `false` for unknown ids.
    pub fn update(&mut self, id: InstanceId, props: PropBag) -> bool {
        let Some(slot) = self.index.get(&id).and_then(|&i| self.slots.get_mut(i)) else {
            log::debug!(target: "head.registry", "update of unknown instance {id} ignored");
            return false;
        };
        if let Some(instance) = slot {
            instance.props = props;
        }
        log::trace!(target: "head.registry", "update {id}");
        true
    }

    /// Remove a mounted instance. Returns `false` for unknown ids.
    pub fn deregister(&mut self, id: InstanceId) -> bool {
        let Some(i) = self.index.remove(&id) else {
            log::debug!(target: "head.registry", "deregister of unknown instance {id} ignored");
            return false;
        };
        if let Some(slot) = self.slots.get_mut(i) {
            *slot = None;
        }
        log::trace!(target: "head.registry", "deregister {id} ({} mounted)", self.len());
        if self.slots.len() > 2 * self.index.len() {
            self.compact();
        }
        true
    }

    pub fn get(&self, id: InstanceId) -> Option<&ContributorInstance> {
        self.index
            .get(&id)
            .and_then(|&i| self.slots.get(i))
            .and_then(Option::as_ref)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Mounted instances in mount order.
    pub fn iter(&self) -> impl Iterator<Item = &ContributorInstance> {
        self.slots.iter().flatten()
    }

    /// Drop every instance. Ids keep increasing so stale handles stay unknown.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(instance) = slot {
                self.index.insert(instance.id, i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(registry: &InstanceRegistry) -> Vec<String> {
        registry
            .iter()
            .filter_map(|i| i.props.title.clone())
            .collect()
    }

    #[test]
    fn preserves_mount_order_across_updates() {
        let mut registry = InstanceRegistry::new();
        let a = registry.register(PropBag::new().title("a"));
        let _b = registry.register(PropBag::new().title("b"));
        assert!(registry.update(a, PropBag::new().title("a2")));
        assert_eq!(titles(&registry), vec!["a2", "b"]);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut registry = InstanceRegistry::new();
        let a = registry.register(PropBag::new().title("a"));
        assert!(registry.deregister(a));
        assert!(!registry.deregister(a));
        assert!(!registry.update(a, PropBag::new().title("zombie")));
        assert!(registry.is_empty());
    }

    #[test]
    fn compaction_keeps_order_and_lookups() {
        let mut registry = InstanceRegistry::new();
        let ids: Vec<_> = (0..10)
            .map(|i| registry.register(PropBag::new().title(i.to_string())))
            .collect();
        for id in &ids[..7] {
            registry.deregister(*id);
        }
        assert_eq!(titles(&registry), vec!["7", "8", "9"]);
        assert!(registry.update(ids[8], PropBag::new().title("eight")));
        assert_eq!(titles(&registry), vec!["7", "eight", "9"]);
        assert_eq!(registry.get(ids[9]).map(|i| i.id), Some(ids[9]));
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut registry = InstanceRegistry::new();
        let a = registry.register(PropBag::new());
        registry.clear();
        let b = registry.register(PropBag::new());
        assert_ne!(a, b);
        assert!(!registry.contains(a));
    }
}
