//! TOML configuration for the Eddy daemon.
//!
//! Every section is optional; missing values fall back to the defaults
//! below, which reproduce the classic three-node demo ring.

use std::path::Path;

use eddy_placement::{HashAlgorithm, PlacementError, Ring};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// HTTP listener.
    pub node: NodeSection,
    /// Ring shape.
    pub ring: RingSection,
    /// Initial membership.
    pub bootstrap: BootstrapSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[node]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Address for the HTTP API.
    pub listen_addr: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Virtual positions per node. Must be at least 1; 3 or more keeps the
    /// load spread tolerable.
    pub replicas: u16,
    /// Hash function: `"blake3"` (default) or `"fnv1a"`.
    pub hash: HashAlgorithm,
}

impl Default for RingSection {
    fn default() -> Self {
        Self {
            replicas: 3,
            hash: HashAlgorithm::Blake3,
        }
    }
}

/// `[bootstrap]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BootstrapSection {
    /// Node identifiers added, in order, before the API starts serving.
    ///
    /// Ring state is not persisted, so this is also how membership is
    /// restored after a restart.
    pub seeds: Vec<String>,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            seeds: vec!["Node1".into(), "Node2".into(), "Node3".into()],
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Build an empty ring with the configured replica count and hasher.
    pub fn build_ring(&self) -> Result<Ring, PlacementError> {
        Ring::with_hasher(self.ring.replicas, self.ring.hash.hasher())
    }
}
