use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, info};

/// Build a client from in-cluster service account credentials, falling back
/// to `$KUBECONFIG` or `~/.kube/config`.
pub async fn connect() -> Result<Client> {
    let config = match Config::incluster() {
        Ok(config) => {
            info!("Using in-cluster Kubernetes configuration");
            config
        }
        Err(err) => {
            debug!("In-cluster configuration unavailable: {}", err);
            let path = kubeconfig_path(std::env::var_os("KUBECONFIG"), std::env::var_os("HOME"))?;
            info!("Using kubeconfig at {}", path.display());
            let kubeconfig = Kubeconfig::read_from(&path)
                .with_context(|| format!("Failed to read kubeconfig at {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .with_context(|| format!("Failed to load kubeconfig at {}", path.display()))?
        }
    };
    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// First entry of `KUBECONFIG` when set, else `$HOME/.kube/config`.
pub fn kubeconfig_path(kubeconfig: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(raw) = kubeconfig.filter(|value| !value.is_empty()) {
        if let Some(first) = std::env::split_paths(&raw).find(|p| !p.as_os_str().is_empty()) {
            return Ok(first);
        }
    }
    let home = home
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("Neither KUBECONFIG nor HOME is set"))?;
    Ok(PathBuf::from(home).join(".kube").join("config"))
}
