use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use exporter_domain::ExporterConfig;

#[derive(Debug, Parser)]
#[command(
    name = "traefik-ingressroute-exporter",
    version,
    about = "Get IngressRoute CRDs, look for some annotations and check HTTP status from domains."
)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "EXPORTER_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server.
    Start(StartArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct StartArgs {
    /// Metrics listen address, e.g. 0.0.0.0:8080.
    #[arg(long, env = "EXPORTER_LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Seconds a cycle accepts newly discovered domains.
    #[arg(long, env = "EXPORTER_COLLECTION_WINDOW")]
    pub collection_window: Option<u64>,

    /// Per-probe timeout in seconds.
    #[arg(long, env = "EXPORTER_PROBE_TIMEOUT")]
    pub probe_timeout: Option<u64>,
}

impl StartArgs {
    pub fn apply(&self, config: &mut ExporterConfig) {
        if let Some(listen) = &self.listen {
            config.server.listen_addr = listen.clone();
        }
        if let Some(window) = self.collection_window {
            config.discovery.collection_window_secs = window;
        }
        if let Some(timeout) = self.probe_timeout {
            config.probe.timeout_secs = timeout;
        }
    }
}
