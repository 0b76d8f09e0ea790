//! Exporter configuration loaded from YAML.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound for every configured duration, in seconds.
pub const MAX_DURATION_SECS: u64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub server: ServerConfig,
    pub discovery: DiscoveryConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Seconds after which a cycle stops accepting newly discovered domains.
    pub collection_window_secs: u64,
    pub max_concurrent_namespaces: usize,
    pub resource: ResourceConfig,
}

impl DiscoveryConfig {
    pub fn collection_window(&self) -> Duration {
        Duration::from_secs(self.collection_window_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            collection_window_secs: 30,
            max_concurrent_namespaces: 16,
            resource: ResourceConfig::default(),
        }
    }
}

/// Group/version/kind of the routing resource that carries the annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            group: "traefik.containo.us".to_string(),
            version: "v1alpha1".to_string(),
            kind: "IngressRoute".to_string(),
            plural: "ingressroutes".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub scheme: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub accept_invalid_certs: bool,
    pub max_concurrent_probes: usize,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            timeout_secs: 10,
            max_redirects: 5,
            accept_invalid_certs: false,
            max_concurrent_probes: 64,
        }
    }
}

impl ExporterConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            bail!("server.listen_addr must not be empty");
        }
        if self.discovery.collection_window_secs == 0 {
            bail!("discovery.collection_window_secs must be greater than zero");
        }
        if self.discovery.collection_window_secs > MAX_DURATION_SECS {
            bail!(
                "discovery.collection_window_secs must be at most {MAX_DURATION_SECS}, got {}",
                self.discovery.collection_window_secs
            );
        }
        if self.discovery.max_concurrent_namespaces == 0 {
            bail!("discovery.max_concurrent_namespaces must be greater than zero");
        }
        let resource = &self.discovery.resource;
        for (field, value) in [
            ("version", &resource.version),
            ("kind", &resource.kind),
            ("plural", &resource.plural),
        ] {
            if value.trim().is_empty() {
                bail!("discovery.resource.{field} must not be empty");
            }
        }
        if self.probe.timeout_secs == 0 {
            bail!("probe.timeout_secs must be greater than zero");
        }
        if self.probe.timeout_secs > MAX_DURATION_SECS {
            bail!(
                "probe.timeout_secs must be at most {MAX_DURATION_SECS}, got {}",
                self.probe.timeout_secs
            );
        }
        if self.probe.max_concurrent_probes == 0 {
            bail!("probe.max_concurrent_probes must be greater than zero");
        }
        if !matches!(self.probe.scheme.as_str(), "http" | "https") {
            bail!(
                "probe.scheme must be \"http\" or \"https\", got {:?}",
                self.probe.scheme
            );
        }
        Ok(())
    }
}
