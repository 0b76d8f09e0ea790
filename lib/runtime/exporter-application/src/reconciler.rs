use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use exporter_domain::{DomainKey, ProbeResult};
use exporter_ports::GaugePort;

/// Owns the set of domains currently exported and keeps the gauge in step
/// with it. Every mutation of either happens under the registry lock.
pub struct MetricReconciler {
    registry: Mutex<BTreeSet<DomainKey>>,
    gauge: Arc<dyn GaugePort>,
}

impl MetricReconciler {
    pub fn new(gauge: Arc<dyn GaugePort>) -> Self {
        Self {
            registry: Mutex::new(BTreeSet::new()),
            gauge,
        }
    }

    pub fn record(&self, result: &ProbeResult) {
        let mut registry = self.lock();
        self.gauge.set(&result.domain, result.status.gauge_value());
        registry.insert(result.domain.clone());
    }

    /// Drop every registered domain the finished cycle did not discover.
    pub fn prune(&self, discovered: &BTreeSet<DomainKey>) -> Vec<DomainKey> {
        let mut registry = self.lock();
        let stale: Vec<DomainKey> = registry.difference(discovered).cloned().collect();
        for domain in &stale {
            self.gauge.remove(domain);
            registry.remove(domain);
            info!(domain = %domain, "Removed stale tenant_up series");
        }
        stale
    }

    pub fn registered(&self) -> BTreeSet<DomainKey> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Poisoned locks are recovered; each mutation is a single set operation.
    fn lock(&self) -> MutexGuard<'_, BTreeSet<DomainKey>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
