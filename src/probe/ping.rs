//! ICMP reachability via the platform `ping` command.
//!
//! # Responsibilities
//! - Build one-packet `ping` arguments for the current platform
//! - Run the command under a hard timeout, killing it on expiry
//! - Prefer the RTT reported by `ping` over wall-clock time

use std::process::Stdio;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::PingConfig;
use crate::observability::metrics;
use crate::probe::{as_millis_f64, Probe, ProbeResult};

static RTT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)time\s*[=<]\s*([0-9]+(?:[.,][0-9]+)?)\s*ms").ok());

/// Argument dialect of the `ping` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(any(target_os = "macos", target_os = "ios", target_os = "freebsd")) {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Arguments for a single-packet ping with a bounded reply wait.
pub fn ping_args(platform: Platform, target: &str, wait: Duration) -> Vec<String> {
    let wait_ms = wait.as_millis().max(1);
    let mut args: Vec<String> = match platform {
        // iputils takes whole seconds
        Platform::Linux => {
            let secs = wait_ms.div_ceil(1000);
            vec!["-n".into(), "-c".into(), "1".into(), "-W".into(), secs.to_string()]
        }
        Platform::MacOs => {
            vec!["-n".into(), "-c".into(), "1".into(), "-W".into(), wait_ms.to_string()]
        }
        Platform::Windows => vec!["-n".into(), "1".into(), "-w".into(), wait_ms.to_string()],
    };
    args.push(target.to_string());
    args
}

/// Extract the round-trip time in milliseconds from `ping` output.
pub fn parse_rtt_ms(output: &str) -> Option<f64> {
    let caps = RTT_PATTERN.as_ref()?.captures(output)?;
    caps.get(1)?.as_str().replace(',', ".").parse().ok()
}

/// Reachability probe backed by the system `ping` binary.
#[derive(Debug, Clone)]
pub struct CommandPing {
    program: String,
    target: String,
    timeout: Duration,
    platform: Platform,
}

impl CommandPing {
    pub fn new(program: impl Into<String>, target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            target: target.into(),
            timeout,
            platform: Platform::current(),
        }
    }

    pub fn from_config(config: &PingConfig) -> Self {
        Self::new(config.program.clone(), config.target.trim(), config.timeout())
    }

    pub fn args(&self) -> Vec<String> {
        ping_args(self.platform, &self.target, self.timeout)
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();
        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Dropping the output future on timeout drops the child, which kills it.
        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!(program = %self.program, error = %e, "Failed to run ping");
                return ProbeResult::failure();
            }
            Err(_) => {
                tracing::debug!(host = %self.target, timeout_ms = self.timeout.as_millis() as u64, "Ping timed out");
                return ProbeResult::failure();
            }
        };
        let wall_ms = as_millis_f64(start.elapsed());

        let stdout = String::from_utf8_lossy(&output.stdout);
        // Windows ping exits 0 on "Destination host unreachable" replies.
        let replied = self.platform != Platform::Windows || stdout.contains("TTL=");
        if !output.status.success() || !replied {
            tracing::debug!(host = %self.target, status = %output.status, "Ping failed");
            return ProbeResult::failure();
        }

        ProbeResult::success(parse_rtt_ms(&stdout).unwrap_or(wall_ms))
    }
}

impl Probe for CommandPing {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn probe(&self) -> ProbeResult {
        let result = self.run().await;
        metrics::record_probe(self.name(), result.success, result.elapsed_ms);
        result
    }
}
