//! One discovery cycle: enumerate, extract, probe, reconcile.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use exporter_domain::{DomainKey, ExporterConfig};
use exporter_ports::{ProbePort, RouteSourcePort};

use crate::dispatcher::{InFlightProbes, ProbeDispatcher};
use crate::enumerator::ResourceEnumerator;
use crate::reconciler::MetricReconciler;

const DOMAIN_CHANNEL_CAPACITY: usize = 1024;

// Roughly 30 years; stands in for "never" when a window overflows `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub discovered: usize,
    pub probed: usize,
    pub up: usize,
    pub down: usize,
    pub removed: Vec<DomainKey>,
    pub namespace_list_failed: bool,
    pub window_elapsed: bool,
    pub pending_namespaces: usize,
    pub elapsed: Duration,
}

pub struct CycleDriver {
    enumerator: ResourceEnumerator,
    dispatcher: ProbeDispatcher,
    window: Duration,
}

impl CycleDriver {
    pub fn new(
        enumerator: ResourceEnumerator,
        dispatcher: ProbeDispatcher,
        window: Duration,
    ) -> Self {
        Self {
            enumerator,
            dispatcher,
            window,
        }
    }

    pub fn from_config(
        config: &ExporterConfig,
        source: Arc<dyn RouteSourcePort>,
        prober: Arc<dyn ProbePort>,
        reconciler: Arc<MetricReconciler>,
    ) -> Self {
        let enumerator =
            ResourceEnumerator::new(source, config.discovery.max_concurrent_namespaces);
        let dispatcher = ProbeDispatcher::new(
            prober,
            reconciler,
            config.probe.max_concurrent_probes,
            config.probe.timeout(),
        );
        Self::new(enumerator, dispatcher, config.discovery.collection_window())
    }

    pub fn reconciler(&self) -> &Arc<MetricReconciler> {
        self.dispatcher.reconciler()
    }

    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let Some(namespaces) = self.enumerator.list_namespaces().await else {
            // Registry keeps the previous cycle's state.
            return CycleReport {
                namespace_list_failed: true,
                elapsed: started.elapsed(),
                ..CycleReport::default()
            };
        };
        let deadline = deadline_after(Instant::now(), self.window);

        let (tx, mut rx) = mpsc::channel(DOMAIN_CHANNEL_CAPACITY);
        let mut listing = self.enumerator.spawn(namespaces, tx);
        let mut discovered = BTreeSet::new();
        let mut in_flight = InFlightProbes::default();

        let window = tokio::time::sleep_until(deadline);
        tokio::pin!(window);
        let mut window_elapsed = false;
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(domain) => {
                        if discovered.insert(domain.clone()) {
                            self.dispatcher.dispatch(domain, &mut in_flight);
                        } else {
                            debug!(domain = %domain, "Domain already discovered this cycle");
                        }
                    }
                    None => break,
                },
                _ = &mut window => {
                    window_elapsed = true;
                    break;
                }
            }
        }

        let mut pending_namespaces = 0;
        if window_elapsed {
            rx.close();
            while let Some(joined) = listing.try_join_next() {
                log_listing_failure(joined);
            }
            pending_namespaces = listing.len();
            if pending_namespaces > 0 {
                warn!(
                    pending_namespaces,
                    "Collection window of {:?} elapsed before every namespace was listed",
                    self.window
                );
            }
            listing.abort_all();
        }
        while let Some(joined) = listing.join_next().await {
            if !matches!(&joined, Err(err) if err.is_cancelled()) {
                log_listing_failure(joined);
            }
        }

        let results = in_flight.wait().await;
        let up = results.iter().filter(|r| r.status.is_up()).count();
        let removed = self.reconciler().prune(&discovered);

        let report = CycleReport {
            discovered: discovered.len(),
            probed: results.len(),
            up,
            down: results.len() - up,
            removed,
            namespace_list_failed: false,
            window_elapsed,
            pending_namespaces,
            elapsed: started.elapsed(),
        };
        info!(
            discovered = report.discovered,
            probed = report.probed,
            up = report.up,
            down = report.down,
            removed = report.removed.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cycle complete"
        );
        report
    }

    /// Run cycles back to back. A cycle that finishes early waits out the
    /// rest of its collection window before the next one starts.
    pub async fn run_forever(&self) {
        loop {
            let started = Instant::now();
            self.run_cycle().await;
            tokio::time::sleep_until(deadline_after(started, self.window)).await;
        }
    }
}

fn deadline_after(start: Instant, window: Duration) -> Instant {
    start
        .checked_add(window)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

fn log_listing_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        error!("Namespace listing task failed: {}", err);
    }
}
