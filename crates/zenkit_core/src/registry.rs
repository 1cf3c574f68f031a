//! Instance registry
//!
//! A side table associating a live widget instance with the node it controls,
//! so repeated construction requests for the same node return the same
//! instance. Entries are keyed by generational [`NodeId`]s: the table never
//! keeps an element alive, and [`InstanceRegistry::prune`] drops entries whose
//! node has been destroyed.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::dom::{Document, NodeId};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a constructed widget instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Map from controlled node to owned instance
pub struct InstanceRegistry<T> {
    instances: FxHashMap<NodeId, T>,
}

impl<T> Default for InstanceRegistry<T> {
    fn default() -> Self {
        Self {
            instances: FxHashMap::default(),
        }
    }
}

impl<T> std::fmt::Debug for InstanceRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("len", &self.instances.len())
            .finish()
    }
}

impl<T> InstanceRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing instance for `node`, or the one built by `create`
    pub fn get_or_create(&mut self, node: NodeId, create: impl FnOnce() -> T) -> &mut T {
        self.instances.entry(node).or_insert_with(create)
    }

    /// Record `instance` for `node`. An existing entry wins and the new value is dropped.
    pub fn insert(&mut self, node: NodeId, instance: T) -> &mut T {
        self.instances.entry(node).or_insert(instance)
    }

    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.instances.get(&node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.instances.get_mut(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.instances.contains_key(&node)
    }

    /// Drop the association (disposal)
    pub fn remove(&mut self, node: NodeId) -> Option<T> {
        self.instances.remove(&node)
    }

    /// Nodes with a registered instance, in unspecified order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.instances.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.instances.iter().map(|(&n, t)| (n, t))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Remove entries whose node no longer exists; returns the pruned nodes
    pub fn prune(&mut self, doc: &Document) -> Vec<NodeId> {
        let dead: Vec<NodeId> = self
            .instances
            .keys()
            .copied()
            .filter(|&n| !doc.exists(n))
            .collect();
        for node in &dead {
            self.instances.remove(node);
        }
        if !dead.is_empty() {
            tracing::debug!("pruned {} instance(s) for removed nodes", dead.len());
        }
        dead
    }
}
