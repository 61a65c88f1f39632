//! TOML configuration for the Circlet daemon.
//!
//! Every section is optional. Without a file the ring has no nodes, uses
//! SHA-256 over the full 2^256 slot space, and the storage node listens on
//! port 1231.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use circlet_net::{DEFAULT_PORT, HttpTransportConfig, Scheme};
use circlet_placement::{DigestHasher, HashAlgorithm, PlacementError, Ring, parse_modulus};
use circlet_types::Node;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Hash function and slot space.
    pub ring: RingSection,
    /// Storage nodes making up the ring (`[[nodes]]` tables).
    pub nodes: Vec<Node>,
    /// How the router reaches nodes.
    pub transport: TransportSection,
    /// Storage node server settings (`circletd serve`).
    pub server: ServerSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// `"sha256"` (default) or `"blake3"`.
    pub hash: HashAlgorithm,
    /// Ring size `M` as a decimal integer or `"2^N"`. Defaults to 2^256.
    pub modulus: Option<String>,
}

/// `[transport]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransportSection {
    /// `"http"` (default) or `"https"`.
    pub scheme: Scheme,
    /// Port for node hosts that do not name one.
    pub port: u16,
    /// Per-request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            port: DEFAULT_PORT,
            timeout_secs: None,
        }
    }
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address the storage node listens on.
    pub listen_addr: String,
    /// Directory holding stored content (file backend).
    pub data_dir: PathBuf,
    /// Backend type: `"file"` (default) or `"memory"`.
    pub backend: String,
    /// Capacity of the memory backend in bytes.
    pub max_bytes: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .map(|h| h.join(".circlet"))
            .unwrap_or_else(|| PathBuf::from(".circlet"));
        Self {
            listen_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            data_dir,
            backend: "file".to_string(),
            max_bytes: None,
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

    /// The configured hash function.
    pub fn hasher(&self) -> Result<DigestHasher, PlacementError> {
        match &self.ring.modulus {
            Some(m) => DigestHasher::new(self.ring.hash, parse_modulus(m)?),
            None => Ok(DigestHasher::full_range(self.ring.hash)),
        }
    }

    /// Build the ring from the configured node list.
    pub fn build_ring(&self) -> Result<Ring, PlacementError> {
        Ring::with_nodes(Arc::new(self.hasher()?), self.nodes.iter().cloned())
    }

    /// HTTP transport settings.
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            scheme: self.transport.scheme,
            port: self.transport.port,
            timeout: self.transport.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Effective memory backend capacity (config value or 1 GiB).
    pub fn max_bytes(&self) -> u64 {
        self.server.max_bytes.unwrap_or(1024 * 1024 * 1024)
    }
}
