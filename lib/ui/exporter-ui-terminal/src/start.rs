use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use exporter_adapter_kube::KubeRouteSource;
use exporter_adapter_probe::ReqwestProber;
use exporter_adapter_prometheus::{PrometheusTenantGauge, bind, serve};
use exporter_application::{CycleDriver, MetricReconciler};
use exporter_domain::ExporterConfig;

use crate::cli::StartArgs;

/// Config file if given, otherwise defaults; CLI overrides applied on top.
pub fn resolve_config(path: Option<&Path>, args: &StartArgs) -> Result<ExporterConfig> {
    let mut config = match path {
        Some(path) => ExporterConfig::load_from_path(path)?,
        None => ExporterConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid exporter configuration")?;
    Ok(config)
}

pub async fn start(config_path: Option<&Path>, args: &StartArgs) -> Result<()> {
    let config = resolve_config(config_path, args)?;
    info!(
        listen = %config.server.listen_addr,
        window_secs = config.discovery.collection_window_secs,
        probe_timeout_secs = config.probe.timeout_secs,
        "Starting traefik-ingressroute-exporter"
    );

    let client = exporter_adapter_kube::connect().await?;
    let source = Arc::new(KubeRouteSource::new(client, &config.discovery.resource));
    let prober = Arc::new(ReqwestProber::from_config(&config.probe)?);
    let gauge = Arc::new(PrometheusTenantGauge::new()?);
    let reconciler = Arc::new(MetricReconciler::new(gauge.clone()));
    let driver = CycleDriver::from_config(&config, source, prober, reconciler);

    let listener = bind(&config.server.listen_addr).await?;
    let cycles = tokio::spawn(async move { driver.run_forever().await });

    let served = serve(listener, gauge).await;
    cycles.abort();
    if let Err(err) = &served {
        error!("Metrics server failed: {:#}", err);
    }
    served
}
