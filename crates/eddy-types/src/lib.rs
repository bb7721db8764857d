//! Shared types for Eddy.
//!
//! This crate defines the identity stored on the ring ([`Node`]) and the
//! membership notifications ([`RingEvent`]) passed between the placement,
//! cluster and HTTP layers.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node identity
// ---------------------------------------------------------------------------

/// A named member of the hash ring.
///
/// A node is nothing but its identifier: two nodes are equal iff their
/// identifiers are equal. The identifier doubles as the seed for the node's
/// virtual positions, so it must be stable for the lifetime of the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    identifier: String,
}

impl Node {
    /// Create a node with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// The node's identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Consume the node, returning its identifier.
    pub fn into_identifier(self) -> String {
        self.identifier
    }
}

impl From<&str> for Node {
    fn from(identifier: &str) -> Self {
        Self::new(identifier)
    }
}

impl From<String> for Node {
    fn from(identifier: String) -> Self {
        Self::new(identifier)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Membership changes broadcast after the ring has been updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingEvent {
    /// A node's virtual positions were written to the ring.
    NodeAdded(Node),
    /// A node that was a member has had its virtual positions removed.
    NodeRemoved(Node),
}

impl RingEvent {
    /// The node this event concerns.
    pub fn node(&self) -> &Node {
        match self {
            Self::NodeAdded(node) | Self::NodeRemoved(node) => node,
        }
    }
}
