use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use exporter_domain::{DomainKey, ProbeResult, ProbeStatus};
use exporter_ports::ProbePort;

use crate::reconciler::MetricReconciler;

/// Fans probes out onto tasks, each bounded by its own hard timeout, and
/// records every completed result with the reconciler.
#[derive(Clone)]
pub struct ProbeDispatcher {
    prober: Arc<dyn ProbePort>,
    reconciler: Arc<MetricReconciler>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl ProbeDispatcher {
    pub fn new(
        prober: Arc<dyn ProbePort>,
        reconciler: Arc<MetricReconciler>,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            prober,
            reconciler,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub fn reconciler(&self) -> &Arc<MetricReconciler> {
        &self.reconciler
    }

    pub fn dispatch(&self, domain: DomainKey, in_flight: &mut InFlightProbes) {
        let prober = Arc::clone(&self.prober);
        let reconciler = Arc::clone(&self.reconciler);
        let permits = Arc::clone(&self.permits);
        let timeout = self.timeout;

        in_flight.tasks.spawn(async move {
            // Timeout starts once a permit is held.
            let _permit = permits.acquire_owned().await.ok();
            let started = Instant::now();
            let result = match tokio::time::timeout(timeout, prober.probe(&domain)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(domain = %domain, "Probe exceeded {:?}, marking down", timeout);
                    ProbeResult::timed_out(domain.clone(), started.elapsed())
                }
            };
            match &result.status {
                ProbeStatus::Up => debug!(domain = %result.domain, "Domain is up"),
                ProbeStatus::Down(reason) => {
                    debug!(domain = %result.domain, %reason, "Domain is down")
                }
            }
            reconciler.record(&result);
            result
        });
    }

    /// Probe every domain and wait for all of them.
    #[cfg(test)]
    pub(crate) async fn probe_all<I>(&self, domains: I) -> Vec<ProbeResult>
    where
        I: IntoIterator<Item = DomainKey>,
    {
        let mut in_flight = InFlightProbes::default();
        for domain in domains {
            self.dispatch(domain, &mut in_flight);
        }
        in_flight.wait().await
    }
}

#[derive(Default)]
pub struct InFlightProbes {
    tasks: JoinSet<ProbeResult>,
}

impl InFlightProbes {
    /// Join exactly the dispatched probes. A probe task that panicked is
    /// logged and contributes no result.
    pub async fn wait(mut self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => error!("Probe task failed: {}", err),
            }
        }
        results
    }
}
