//! HTTP reachability probe.

use std::error::Error as _;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use tracing::{info, warn};

use exporter_domain::{DomainKey, DownReason, ProbeConfig, ProbeResult, ProbeStatus};
use exporter_ports::ProbePort;

const USER_AGENT: &str = concat!("traefik-ingressroute-exporter/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: reqwest::Client,
    scheme: String,
}

impl ReqwestProber {
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let redirect = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(redirect)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build probe HTTP client")?;
        Ok(Self {
            client,
            scheme: config.scheme.clone(),
        })
    }

    pub fn url_for(&self, domain: &DomainKey) -> String {
        format!("{}://{}", self.scheme, domain)
    }
}

#[async_trait]
impl ProbePort for ReqwestProber {
    async fn probe(&self, domain: &DomainKey) -> ProbeResult {
        let url = self.url_for(domain);
        let started = Instant::now();
        // The body is never read; dropping the response releases the connection.
        let status = match self.client.get(&url).send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                info!(domain = %domain, status = code, "{} returned status code {}", domain, code);
                ProbeStatus::from_status_code(code)
            }
            Err(err) if err.is_timeout() => {
                warn!(domain = %domain, "Request to {} timed out", url);
                ProbeStatus::Down(DownReason::Timeout)
            }
            Err(err) => {
                let message = error_chain(&err);
                warn!(domain = %domain, "Error making request to {}: {}", url, message);
                ProbeStatus::Down(DownReason::Transport(message))
            }
        };
        ProbeResult::new(domain.clone(), status, started.elapsed())
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
