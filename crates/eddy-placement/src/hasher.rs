//! Hash functions that place keys and virtual nodes on the ring.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::PlacementError;

/// A stable string hash used for ring positions.
///
/// Implementations must be total (defined for every string, including `""`)
/// and must return the same value for the same input across calls and
/// across process runs. Cryptographic strength is not required.
pub trait RingHasher: Send + Sync + fmt::Debug {
    /// Hash `input` to a position on the `u64` ring.
    fn hash(&self, input: &str) -> u64;
}

/// BLAKE3, truncated to the first 8 bytes (little-endian).
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl RingHasher for Blake3Hasher {
    fn hash(&self, input: &str) -> u64 {
        let hash = blake3::hash(input.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// 64-bit FNV-1a.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1aHasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl RingHasher for Fnv1aHasher {
    fn hash(&self, input: &str) -> u64 {
        input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

/// Named choice of built-in hasher, as it appears in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// [`Blake3Hasher`].
    #[default]
    Blake3,
    /// [`Fnv1aHasher`].
    Fnv1a,
}

impl HashAlgorithm {
    /// Instantiate the hasher for this algorithm.
    pub fn hasher(self) -> Arc<dyn RingHasher> {
        match self {
            Self::Blake3 => Arc::new(Blake3Hasher),
            Self::Fnv1a => Arc::new(Fnv1aHasher),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "fnv1a" | "fnv-1a" => Ok(Self::Fnv1a),
            _ => Err(PlacementError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => f.write_str("blake3"),
            Self::Fnv1a => f.write_str("fnv1a"),
        }
    }
}
