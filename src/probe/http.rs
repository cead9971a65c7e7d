//! Application-layer HTTP probe.
//!
//! # Responsibilities
//! - Issue a single GET with an identifying user agent
//! - Classify status codes in [200, 400) as success, redirects included
//! - Drain and discard the body without buffering it
//!
//! # Design Decisions
//! - Redirects are not followed, so a 3xx is observed directly
//! - Proxies are bypassed; the probe measures the host's own upstream path
//! - The whole exchange runs under one hard timeout; when it fires the
//!   request future is dropped, which aborts the connection

use std::time::{Duration, Instant};

use reqwest::{redirect, Client, Response};
use tokio::time::timeout;

use crate::config::HttpProbeConfig;
use crate::observability::metrics;
use crate::probe::{as_millis_f64, Probe, ProbeResult};

/// HTTP GET probe against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Build a probe with its own client. Fails only if the TLS backend
    /// cannot be initialized.
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &HttpProbeConfig) -> reqwest::Result<Self> {
        Self::new(config.url.clone(), &config.user_agent, config.timeout())
    }

    async fn fetch(&self) -> reqwest::Result<Response> {
        let mut response = self.client.get(&self.url).send().await?;
        while response.chunk().await?.is_some() {}
        Ok(response)
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        let response = match timeout(self.timeout, self.fetch()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::debug!(url = %self.url, error = %e, "HTTP probe failed: request error");
                return ProbeResult::failure();
            }
            Err(_) => {
                tracing::debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "HTTP probe failed: timeout");
                return ProbeResult::failure();
            }
        };

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            ProbeResult::success(as_millis_f64(start.elapsed()))
        } else {
            tracing::debug!(url = %self.url, status = %status, "HTTP probe failed: status");
            ProbeResult::failure()
        }
    }
}

impl Probe for HttpProbe {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn probe(&self) -> ProbeResult {
        let result = self.run().await;
        metrics::record_probe(self.name(), result.success, result.elapsed_ms);
        result
    }
}
