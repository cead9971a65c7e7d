//! Reachability probes.
//!
//! # Data Flow
//! ```text
//! Probe executor
//!     → ping.rs  (platform `ping` process, one packet)   ┐
//!     → tcp.rs   (TCP connect to target:port)            ├→ ProbeResult
//!     → http.rs  (single GET, status in [200, 400))      ┘
//! ```
//!
//! # Design Decisions
//! - Every failure mode resolves to `ProbeResult::failure()`; probes never
//!   return errors
//! - Each probe bounds itself with a hard timeout and cancels the underlying
//!   operation (child killed, socket dropped) when it fires
//! - `Probe` is the only seam the engine sees, so the ping strategy can vary
//!   per platform without touching the scheduler or aggregator

pub mod http;
pub mod ping;
pub mod tcp;

use std::future::Future;

use serde::Serialize;

use crate::config::{PingConfig, PingMethod};

pub use http::HttpProbe;
pub use ping::CommandPing;
pub use tcp::TcpPing;

/// Outcome of a single probe invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeResult {
    pub success: bool,
    /// Round-trip or request time in milliseconds; absent on failure.
    pub elapsed_ms: Option<f64>,
}

impl ProbeResult {
    pub fn success(elapsed_ms: f64) -> Self {
        Self {
            success: true,
            elapsed_ms: Some(elapsed_ms),
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            elapsed_ms: None,
        }
    }
}

/// A single reachability test against a fixed target.
pub trait Probe: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Run the test once. Must resolve within the probe's own timeout.
    fn probe(&self) -> impl Future<Output = ProbeResult> + Send;
}

/// The configured network-layer probe.
#[derive(Debug)]
pub enum PingProbe {
    Command(CommandPing),
    Tcp(TcpPing),
}

impl PingProbe {
    pub fn from_config(config: &PingConfig) -> Self {
        match config.method {
            PingMethod::Command => PingProbe::Command(CommandPing::from_config(config)),
            PingMethod::Tcp => PingProbe::Tcp(TcpPing::from_config(config)),
        }
    }
}

impl Probe for PingProbe {
    fn name(&self) -> &'static str {
        match self {
            PingProbe::Command(p) => p.name(),
            PingProbe::Tcp(p) => p.name(),
        }
    }

    async fn probe(&self) -> ProbeResult {
        match self {
            PingProbe::Command(p) => p.probe().await,
            PingProbe::Tcp(p) => p.probe().await,
        }
    }
}

/// Milliseconds in a duration, with sub-millisecond precision.
pub(crate) fn as_millis_f64(elapsed: std::time::Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
