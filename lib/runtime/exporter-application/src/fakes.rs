use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use exporter_domain::{
    DOMAIN_ANNOTATION, DomainKey, DownReason, PATH_ANNOTATION, ProbeResult, ProbeStatus,
    RouteResource,
};
use exporter_ports::{ProbePort, RouteSourcePort};

pub fn key(value: &str) -> DomainKey {
    DomainKey::new(value)
}

pub fn annotated(namespace: &str, name: &str, domain: &str, path: &str) -> RouteResource {
    RouteResource::new(
        namespace,
        name,
        BTreeMap::from([
            (DOMAIN_ANNOTATION.to_string(), domain.to_string()),
            (PATH_ANNOTATION.to_string(), path.to_string()),
        ]),
    )
}

pub fn unannotated(namespace: &str, name: &str) -> RouteResource {
    RouteResource::new(namespace, name, BTreeMap::new())
}

#[derive(Clone)]
enum Listing {
    Routes(Vec<RouteResource>),
    Fail,
    Hang,
}

/// Route source whose contents tests can swap between cycles.
#[derive(Clone, Default)]
pub struct FakeRouteSource {
    namespaces: Arc<Mutex<Option<Vec<String>>>>,
    listings: Arc<Mutex<HashMap<String, Listing>>>,
    route_calls: Arc<AtomicUsize>,
}

impl FakeRouteSource {
    pub fn new() -> Self {
        let source = Self::default();
        source.set_namespaces(&[]);
        source
    }

    pub fn set_namespaces(&self, names: &[&str]) {
        *self.namespaces.lock().unwrap() = Some(names.iter().map(|n| n.to_string()).collect());
    }

    pub fn fail_namespaces(&self) {
        *self.namespaces.lock().unwrap() = None;
    }

    pub fn set_routes(&self, namespace: &str, routes: Vec<RouteResource>) {
        self.listings
            .lock()
            .unwrap()
            .insert(namespace.to_string(), Listing::Routes(routes));
    }

    pub fn fail_routes(&self, namespace: &str) {
        self.listings
            .lock()
            .unwrap()
            .insert(namespace.to_string(), Listing::Fail);
    }

    pub fn hang_routes(&self, namespace: &str) {
        self.listings
            .lock()
            .unwrap()
            .insert(namespace.to_string(), Listing::Hang);
    }

    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteSourcePort for FakeRouteSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.namespaces
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("namespaces is forbidden"))
    }

    async fn list_routes(&self, namespace: &str) -> Result<Vec<RouteResource>> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        let listing = self.listings.lock().unwrap().get(namespace).cloned();
        match listing {
            Some(Listing::Routes(routes)) => Ok(routes),
            Some(Listing::Fail) => Err(anyhow!("ingressroutes is forbidden in {namespace}")),
            Some(Listing::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }
}

/// Prober with per-domain scripted outcomes.
#[derive(Clone, Default)]
pub struct ScriptedProber {
    statuses: Arc<Mutex<HashMap<DomainKey, ProbeStatus>>>,
    hanging: Arc<Mutex<HashSet<DomainKey>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<DomainKey>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedProber {
    pub fn all_up() -> Self {
        Self::default()
    }

    pub fn status(self, domain: &str, status: ProbeStatus) -> Self {
        self.statuses.lock().unwrap().insert(key(domain), status);
        self
    }

    pub fn down(self, domain: &str, code: u16) -> Self {
        self.status(domain, ProbeStatus::Down(DownReason::Status(code)))
    }

    pub fn hang(self, domain: &str) -> Self {
        self.hanging.lock().unwrap().insert(key(domain));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<DomainKey> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbePort for ScriptedProber {
    async fn probe(&self, domain: &DomainKey) -> ProbeResult {
        self.calls.lock().unwrap().push(domain.clone());
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        let hang = self.hanging.lock().unwrap().contains(domain);
        if hang {
            std::future::pending::<()>().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or(ProbeStatus::Up);
        self.active.fetch_sub(1, Ordering::SeqCst);
        ProbeResult::new(domain.clone(), status, self.delay)
    }
}
