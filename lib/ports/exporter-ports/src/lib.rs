//! Port traits between the discovery runtime and its adapters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use exporter_domain::{DomainKey, ProbeResult, RouteResource};

/// Read-only view of the cluster's namespaces and routing resources.
#[async_trait]
pub trait RouteSourcePort: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>>;
    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteResource>>;
}

/// One reachability check per domain key. Failures surface as a down result.
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe(&self, domain: &DomainKey) -> ProbeResult;
}

/// The exported per-domain up/down series.
pub trait GaugePort: Send + Sync {
    fn set(&self, domain: &DomainKey, value: f64);
    fn remove(&self, domain: &DomainKey);
}

/// Gauge that keeps the last value per domain in memory.
#[derive(Clone, Default)]
pub struct InMemoryGaugePort {
    series: Arc<Mutex<BTreeMap<DomainKey, f64>>>,
}

impl InMemoryGaugePort {
    pub fn value(&self, domain: &DomainKey) -> Option<f64> {
        self.series
            .lock()
            .ok()
            .and_then(|guard| guard.get(domain).copied())
    }

    pub fn domains(&self) -> BTreeSet<DomainKey> {
        if let Ok(guard) = self.series.lock() {
            guard.keys().cloned().collect()
        } else {
            BTreeSet::new()
        }
    }
}

impl GaugePort for InMemoryGaugePort {
    fn set(&self, domain: &DomainKey, value: f64) {
        if let Ok(mut guard) = self.series.lock() {
            guard.insert(domain.clone(), value);
        }
    }

    fn remove(&self, domain: &DomainKey) {
        if let Ok(mut guard) = self.series.lock() {
            guard.remove(domain);
        }
    }
}
