//! Consistent hashing ring implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use eddy_types::Node;
use tracing::{debug, trace, warn};

use crate::error::PlacementError;
use crate::hasher::{Blake3Hasher, RingHasher};

/// Consistent hashing ring mapping string keys to nodes.
///
/// Each node is mapped to `replica_count` virtual positions on a `u64`
/// ring. A key belongs to the node at the first position at or after the
/// key's hash, wrapping around to the lowest position.
///
/// Two different seeds can hash to the same position. Insertion is
/// last-write-wins, and removal only deletes a position that the removed
/// node still holds, so a collision never evicts another node's entry.
#[derive(Clone)]
pub struct Ring {
    /// Virtual node positions: ring position -> node.
    vnodes: BTreeMap<u64, Node>,
    /// Virtual positions placed per node.
    replica_count: u16,
    /// Hash used for both keys and virtual node seeds.
    hasher: Arc<dyn RingHasher>,
}

impl Ring {
    /// Create an empty ring hashing with BLAKE3.
    ///
    /// Fails when `replica_count` is zero.
    pub fn new(replica_count: u16) -> Result<Self, PlacementError> {
        Self::with_hasher(replica_count, Arc::new(Blake3Hasher))
    }

    /// Create an empty ring with a custom hash function.
    pub fn with_hasher(
        replica_count: u16,
        hasher: Arc<dyn RingHasher>,
    ) -> Result<Self, PlacementError> {
        if replica_count == 0 {
            return Err(PlacementError::InvalidReplicaCount);
        }
        Ok(Self {
            vnodes: BTreeMap::new(),
            replica_count,
            hasher,
        })
    }

    /// Place `replica_count` virtual positions for `node`.
    ///
    /// Re-adding a node rewrites the same positions with the same node, so
    /// repeated calls are idempotent.
    pub fn add_node(&mut self, node: Node) {
        for i in 0..self.replica_count {
            let pos = self.vnode_position(&node, i);
            if let Some(prev) = self.vnodes.insert(pos, node.clone()) {
                if prev != node {
                    warn!(%node, evicted = %prev, pos, "virtual position collision, overwriting");
                }
            }
        }
        debug!(%node, replicas = self.replica_count, "added node to ring");
    }

    /// Remove the virtual positions `node` still holds.
    ///
    /// Positions now held by another node are left alone. Returns `true` if
    /// at least one position was removed; removing an unknown node is a
    /// no-op returning `false`.
    pub fn remove_node(&mut self, node: &Node) -> bool {
        let mut removed = 0usize;
        for i in 0..self.replica_count {
            let pos = self.vnode_position(node, i);
            match self.vnodes.get(&pos) {
                Some(owner) if owner == node => {
                    self.vnodes.remove(&pos);
                    removed += 1;
                }
                Some(owner) => {
                    trace!(%node, %owner, pos, "position held by another node, keeping");
                }
                None => {}
            }
        }
        if removed > 0 {
            debug!(%node, removed, "removed node from ring");
        }
        removed > 0
    }

    /// Find the node that owns `key`.
    ///
    /// Returns `None` only when the ring is empty.
    pub fn lookup(&self, key: &str) -> Option<&Node> {
        let pos = self.hasher.hash(key);

        // Exact hit or clockwise successor, else wrap to the lowest position.
        self.vnodes
            .range(pos..)
            .next()
            .or_else(|| self.vnodes.first_key_value())
            .map(|(_, node)| node)
    }

    /// Return the distinct nodes holding at least one position, sorted by
    /// identifier.
    pub fn members(&self) -> Vec<Node> {
        self.vnodes
            .values()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Whether `node` holds at least one of its virtual positions.
    pub fn contains(&self, node: &Node) -> bool {
        self.replicas_held(node) > 0
    }

    /// Number of `node`'s virtual positions it currently holds.
    ///
    /// Equal to [`replica_count`](Self::replica_count) for a member whose
    /// positions have not been overwritten by a collision.
    pub fn replicas_held(&self, node: &Node) -> usize {
        (0..self.replica_count)
            .filter(|&i| self.vnodes.get(&self.vnode_position(node, i)) == Some(node))
            .count()
    }

    /// Iterate over `(position, node)` pairs in ascending position order.
    pub fn positions(&self) -> impl Iterator<Item = (u64, &Node)> {
        self.vnodes.iter().map(|(pos, node)| (*pos, node))
    }

    /// Return the number of virtual positions placed per node.
    pub fn replica_count(&self) -> u16 {
        self.replica_count
    }

    /// Return the number of distinct nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.vnodes.values().collect::<BTreeSet<_>>().len()
    }

    /// Return the total number of occupied positions.
    pub fn vnode_count(&self) -> usize {
        self.vnodes.len()
    }

    /// Whether the ring has no positions at all.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Position of the `index`-th replica: `hash(identifier ++ decimal(index))`.
    fn vnode_position(&self, node: &Node, index: u16) -> u64 {
        self.hasher.hash(&format!("{}{index}", node.identifier()))
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("replica_count", &self.replica_count)
            .field("vnode_count", &self.vnodes.len())
            .field("hasher", &self.hasher)
            .finish()
    }
}
