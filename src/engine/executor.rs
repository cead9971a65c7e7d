//! Probe executor: one check cycle.
//!
//! Runs the ping probe, then the HTTP probe, strictly in sequence. The HTTP
//! probe always runs, whatever the ping outcome. No success judgment is made
//! here; that belongs to the aggregator.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::engine::state::CycleResult;
use crate::probe::{Probe, ProbeResult};

#[derive(Debug)]
pub struct ProbeExecutor<P, H> {
    ping: P,
    http: H,
}

impl<P: Probe, H: Probe> ProbeExecutor<P, H> {
    pub fn new(ping: P, http: H) -> Self {
        Self { ping, http }
    }

    pub async fn run_cycle(&self) -> CycleResult {
        let ping = guarded(&self.ping).await;
        let http = guarded(&self.http).await;
        CycleResult { ping, http }
    }
}

/// Run a probe, turning a panic inside it into a failed result.
async fn guarded<T: Probe>(probe: &T) -> ProbeResult {
    match AssertUnwindSafe(probe.probe()).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(probe = probe.name(), reason = %reason, "Probe panicked; counting as failure");
            ProbeResult::failure()
        }
    }
}
