//! Domain models and invariants.

pub mod config;
pub mod domain_key;
pub mod probe;
pub mod route;

pub use config::{
    DiscoveryConfig, ExporterConfig, MAX_DURATION_SECS, ProbeConfig, ResourceConfig, ServerConfig,
};
pub use domain_key::{DOMAIN_ANNOTATION, DomainKey, PATH_ANNOTATION, extract_domain_key};
pub use probe::{DownReason, ProbeResult, ProbeStatus};
pub use route::RouteResource;
