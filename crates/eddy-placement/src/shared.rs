//! Thread-safe ring wrapper.

use std::sync::RwLock;

use eddy_types::Node;

use crate::ring::Ring;

/// A [`Ring`] behind a `RwLock`.
///
/// Lookups share the read lock. Adds and removes hold the write lock for
/// the whole multi-position update, so readers see either none or all of a
/// node's replicas.
#[derive(Debug)]
pub struct SharedRing {
    inner: RwLock<Ring>,
}

impl SharedRing {
    /// Wrap an existing ring.
    pub fn new(ring: Ring) -> Self {
        Self {
            inner: RwLock::new(ring),
        }
    }

    /// Add a node. See [`Ring::add_node`].
    pub fn add_node(&self, node: Node) {
        self.inner.write().expect("lock poisoned").add_node(node);
    }

    /// Remove a node. See [`Ring::remove_node`].
    pub fn remove_node(&self, node: &Node) -> bool {
        self.inner.write().expect("lock poisoned").remove_node(node)
    }

    /// Find the owner of `key`, or `None` on an empty ring.
    pub fn lookup(&self, key: &str) -> Option<Node> {
        self.inner.read().expect("lock poisoned").lookup(key).cloned()
    }

    /// Distinct members, sorted by identifier.
    pub fn members(&self) -> Vec<Node> {
        self.inner.read().expect("lock poisoned").members()
    }

    /// Whether `node` currently holds any position.
    pub fn contains(&self, node: &Node) -> bool {
        self.inner.read().expect("lock poisoned").contains(node)
    }

    /// Return the number of virtual positions placed per node.
    pub fn replica_count(&self) -> u16 {
        self.inner.read().expect("lock poisoned").replica_count()
    }

    /// Return the number of distinct nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").node_count()
    }

    /// Return the total number of occupied positions.
    pub fn vnode_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").vnode_count()
    }

    /// Return a clone of the current ring.
    ///
    /// Use this when several lookups must agree on one membership view.
    pub fn snapshot(&self) -> Ring {
        self.inner.read().expect("lock poisoned").clone()
    }
}
