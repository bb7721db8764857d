//! Membership: the shared ring plus change notifications.

use std::sync::{Arc, Mutex};

use eddy_placement::{Ring, SharedRing};
use eddy_types::{Node, RingEvent};
use tokio::sync::broadcast;
use tracing::info;

/// Capacity of the event channel; slow subscribers lag rather than block.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared ring membership.
///
/// Created once by the process entry point, seeded with
/// [`bootstrap`](Self::bootstrap), then shared (as `Arc<Membership>`) by
/// every request handler.
pub struct Membership {
    /// Placement ring.
    ring: SharedRing,
    /// Held across a ring change and its event so events follow ring order.
    change_lock: Mutex<()>,
    /// Broadcast channel for membership changes.
    event_tx: broadcast::Sender<RingEvent>,
}

impl Membership {
    /// Wrap `ring` in a new membership.
    pub fn new(ring: Ring) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            ring: SharedRing::new(ring),
            change_lock: Mutex::new(()),
            event_tx,
        })
    }

    /// Subscribe to membership changes made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RingEvent> {
        self.event_tx.subscribe()
    }

    /// Add the initial node set, in order.
    pub fn bootstrap<I, S>(&self, seeds: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for seed in seeds {
            self.add_node(seed);
        }
        info!(
            nodes = self.ring.node_count(),
            vnodes = self.ring.vnode_count(),
            "ring bootstrapped"
        );
    }

    /// Add a node by identifier and return it.
    ///
    /// Adding an existing member is harmless and still emits
    /// [`RingEvent::NodeAdded`].
    pub fn add_node(&self, identifier: impl Into<String>) -> Node {
        let node = Node::new(identifier);
        let _guard = self.change_lock.lock().expect("lock poisoned");
        self.ring.add_node(node.clone());

        info!(%node, "node joined ring");
        let _ = self.event_tx.send(RingEvent::NodeAdded(node.clone()));
        node
    }

    /// Remove a node by identifier.
    ///
    /// Returns `false` (and emits nothing) if the node was not a member.
    pub fn remove_node(&self, identifier: &str) -> bool {
        let node = Node::new(identifier);
        let _guard = self.change_lock.lock().expect("lock poisoned");
        if !self.ring.remove_node(&node) {
            return false;
        }

        info!(%node, "node left ring");
        let _ = self.event_tx.send(RingEvent::NodeRemoved(node));
        true
    }

    /// Return the node that owns `key`, or `None` if the ring is empty.
    pub fn node_for_key(&self, key: &str) -> Option<Node> {
        self.ring.lookup(key)
    }

    /// Return a snapshot of all members, sorted by identifier.
    pub fn nodes(&self) -> Vec<Node> {
        self.ring.members()
    }

    /// Return the underlying shared ring.
    pub fn ring(&self) -> &SharedRing {
        &self.ring
    }
}

impl std::fmt::Debug for Membership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Membership")
            .field("ring", &self.ring)
            .finish_non_exhaustive()
    }
}
