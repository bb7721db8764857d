//! Error types for the placement crate.

/// Errors produced when building a ring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// A ring needs at least one virtual position per node.
    #[error("replica count must be at least 1")]
    InvalidReplicaCount,

    /// The configured hash algorithm name is not recognised.
    #[error("unknown hash algorithm: {0} (expected \"blake3\" or \"fnv1a\")")]
    UnknownHashAlgorithm(String),
}
