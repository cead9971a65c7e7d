//! TCP connect reachability probe.
//!
//! Used where no ICMP `ping` binary is available (containers, locked-down
//! hosts). Success means a TCP handshake with `target:port` completed.

use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::PingConfig;
use crate::observability::metrics;
use crate::probe::{as_millis_f64, Probe, ProbeResult};

#[derive(Debug, Clone)]
pub struct TcpPing {
    target: String,
    port: u16,
    timeout: Duration,
}

impl TcpPing {
    pub fn new(target: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &PingConfig) -> Self {
        Self::new(config.target.trim(), config.tcp_port, config.timeout())
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        // The timeout covers DNS resolution as well as the handshake.
        let connect = TcpStream::connect((self.target.as_str(), self.port));
        match timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => ProbeResult::success(as_millis_f64(start.elapsed())),
            Ok(Err(e)) => {
                tracing::debug!(host = %self.target, port = self.port, error = %e, "TCP probe failed");
                ProbeResult::failure()
            }
            Err(_) => {
                tracing::debug!(host = %self.target, port = self.port, "TCP probe timed out");
                ProbeResult::failure()
            }
        }
    }
}

impl Probe for TcpPing {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn probe(&self) -> ProbeResult {
        let result = self.run().await;
        metrics::record_probe(self.name(), result.success, result.elapsed_ms);
        result
    }
}
