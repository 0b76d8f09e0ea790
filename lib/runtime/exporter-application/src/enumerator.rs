use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use exporter_domain::DomainKey;
use exporter_ports::RouteSourcePort;

/// Lists namespaces, then routing resources per namespace on bounded tasks,
/// streaming each extracted domain key to the cycle driver.
#[derive(Clone)]
pub struct ResourceEnumerator {
    source: Arc<dyn RouteSourcePort>,
    permits: Arc<Semaphore>,
}

impl ResourceEnumerator {
    pub fn new(source: Arc<dyn RouteSourcePort>, max_concurrent: usize) -> Self {
        Self {
            source,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// `None` when the namespace list failed; the error is logged here.
    pub async fn list_namespaces(&self) -> Option<Vec<String>> {
        match self.source.list_namespaces().await {
            Ok(namespaces) => Some(namespaces),
            Err(err) => {
                warn!("Error fetching namespaces: {:#}", err);
                None
            }
        }
    }

    /// Spawn one listing task per namespace. The channel closes once every
    /// task has finished.
    pub fn spawn(&self, namespaces: Vec<String>, tx: mpsc::Sender<DomainKey>) -> JoinSet<()> {
        let mut tasks = JoinSet::new();
        for namespace in namespaces {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&self.permits);
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                scan_namespace(source.as_ref(), &namespace, &tx).await;
            });
        }
        tasks
    }
}

async fn scan_namespace(
    source: &dyn RouteSourcePort,
    namespace: &str,
    tx: &mpsc::Sender<DomainKey>,
) {
    let routes = match source.list_routes(namespace).await {
        Ok(routes) => routes,
        Err(err) => {
            warn!(namespace, "Error fetching routing resources: {:#}", err);
            return;
        }
    };

    let total = routes.len();
    let mut annotated = 0usize;
    for route in &routes {
        let Some(domain) = route.domain_key() else {
            debug!(namespace, route = %route.name, "Skipping route without exporter annotations");
            continue;
        };
        annotated += 1;
        if tx.send(domain).await.is_err() {
            debug!(namespace, "Collection window closed before namespace finished");
            return;
        }
    }
    info!(
        namespace,
        "{} domains will be scraped from namespace {} out of a total of {} IngressRoutes",
        annotated,
        namespace,
        total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeRouteSource, annotated, key, unannotated};

    async fn collect(enumerator: &ResourceEnumerator) -> Vec<DomainKey> {
        let namespaces = enumerator.list_namespaces().await.unwrap_or_default();
        let (tx, mut rx) = mpsc::channel(16);
        let mut tasks = enumerator.spawn(namespaces, tx);
        let mut domains = Vec::new();
        while let Some(domain) = rx.recv().await {
            domains.push(domain);
        }
        while tasks.join_next().await.is_some() {}
        domains.sort();
        domains
    }

    #[tokio::test]
    async fn streams_domains_from_every_namespace() {
        let source = FakeRouteSource::new();
        source.set_namespaces(&["a", "b"]);
        source.set_routes("a", vec![annotated("a", "web", "a.example.com/", "/x")]);
        source.set_routes(
            "b",
            vec![
                annotated("b", "api", "b.example.com/*", "/"),
                unannotated("b", "internal"),
            ],
        );
        let enumerator = ResourceEnumerator::new(Arc::new(source), 4);

        let domains = collect(&enumerator).await;

        assert_eq!(domains, vec![key("a.example.com/x"), key("b.example.com/")]);
    }

    #[tokio::test]
    async fn namespace_failure_yields_no_namespaces() {
        let source = FakeRouteSource::new();
        source.fail_namespaces();
        let enumerator = ResourceEnumerator::new(Arc::new(source.clone()), 4);

        assert!(enumerator.list_namespaces().await.is_none());
        assert!(collect(&enumerator).await.is_empty());
        assert_eq!(source.route_calls(), 0);
    }

    #[tokio::test]
    async fn failing_namespace_does_not_stop_others() {
        let source = FakeRouteSource::new();
        source.set_namespaces(&["broken", "ok"]);
        source.fail_routes("broken");
        source.set_routes("ok", vec![annotated("ok", "web", "ok.example.com", "/")]);
        let enumerator = ResourceEnumerator::new(Arc::new(source.clone()), 1);

        let domains = collect(&enumerator).await;

        assert_eq!(domains, vec![key("ok.example.com/")]);
        assert_eq!(source.route_calls(), 2);
    }

    #[tokio::test]
    async fn colliding_routes_are_not_deduplicated_here() {
        let source = FakeRouteSource::new();
        source.set_namespaces(&["a"]);
        source.set_routes(
            "a",
            vec![
                annotated("a", "one", "dup.example.com/", "/p"),
                annotated("a", "two", "dup.example.com", "p"),
            ],
        );
        let enumerator = ResourceEnumerator::new(Arc::new(source), 2);

        let domains = collect(&enumerator).await;

        assert_eq!(domains, vec![key("dup.example.com/p"), key("dup.example.com/p")]);
    }
}
