use anyhow::{Context, Result};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

use exporter_domain::DomainKey;
use exporter_ports::GaugePort;

pub const TENANT_UP: &str = "tenant_up";
pub const DOMAIN_LABEL: &str = "domain";

/// `tenant_up{domain}` registered in a registry owned by this value.
#[derive(Clone)]
pub struct PrometheusTenantGauge {
    registry: Registry,
    tenant_up: GaugeVec,
}

impl PrometheusTenantGauge {
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self> {
        let tenant_up = GaugeVec::new(
            Opts::new(TENANT_UP, "Tenant availability status (1 = up, 0 = down)"),
            &[DOMAIN_LABEL],
        )
        .context("Failed to create tenant_up gauge")?;
        registry
            .register(Box::new(tenant_up.clone()))
            .context("Failed to register tenant_up gauge")?;
        Ok(Self {
            registry,
            tenant_up,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Render every metric in the owned registry in text exposition format.
    pub fn encode(&self) -> Result<String> {
        let families = self.registry.gather();
        let mut buffer = String::new();
        TextEncoder::new()
            .encode_utf8(&families, &mut buffer)
            .context("Failed to encode metrics")?;
        Ok(buffer)
    }
}

impl GaugePort for PrometheusTenantGauge {
    fn set(&self, domain: &DomainKey, value: f64) {
        self.tenant_up
            .with_label_values(&[domain.as_str()])
            .set(value);
    }

    fn remove(&self, domain: &DomainKey) {
        if let Err(err) = self.tenant_up.remove_label_values(&[domain.as_str()]) {
            debug!(domain = %domain, "No tenant_up series to remove: {}", err);
        }
    }
}
