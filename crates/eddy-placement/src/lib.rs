//! Consistent hashing ring for deterministic key placement.
//!
//! This crate implements a consistent hash ring that maps arbitrary string
//! keys to [`Node`](eddy_types::Node)s. Adding or removing a node only moves
//! the keys that land on that node's positions; every other key keeps its
//! owner.
//!
//! The ring uses virtual nodes (replicas): each node gets `replica_count`
//! positions on a `u64` ring, at `hash(identifier ++ decimal(index))`. A key
//! is owned by the first position at or after `hash(key)`, wrapping around
//! to the lowest position.
//!
//! - [`Ring`] — the single-owner data structure.
//! - [`SharedRing`] — the same ring behind a read-write lock, for concurrent
//!   readers and writers.
//! - [`RingHasher`] — the pluggable hash function, with BLAKE3 and FNV-1a
//!   implementations.

mod error;
mod hasher;
mod ring;
mod shared;

pub use error::PlacementError;
pub use hasher::{Blake3Hasher, Fnv1aHasher, HashAlgorithm, RingHasher};
pub use ring::Ring;
pub use shared::SharedRing;
