//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the connectivity monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Check interval and hysteresis settings.
    pub schedule: ScheduleConfig,

    /// Network-layer reachability probe.
    pub ping: PingConfig,

    /// Application-layer HTTP probe.
    pub http: HttpProbeConfig,

    /// Alert emitted when connectivity is lost.
    pub alert: AlertConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Scheduling and debounce configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay between the end of one check cycle and the start of the next.
    pub update_interval_secs: u64,

    /// Number of consecutive failed cycles before declaring "down".
    pub consider_down_after_fails: u32,

    /// Number of cycle outcomes kept in the rolling history.
    pub max_history: usize,
}

impl ScheduleConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 60,
            consider_down_after_fails: 3,
            max_history: 5,
        }
    }
}

/// Strategy used for the reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PingMethod {
    /// Spawn the platform `ping` binary.
    #[default]
    Command,
    /// Open a TCP connection to `target:tcp_port`.
    Tcp,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PingConfig {
    /// Host name or IP address to probe.
    pub target: String,

    /// Probe strategy.
    pub method: PingMethod,

    /// Port used by the TCP strategy.
    pub tcp_port: u16,

    /// Hard timeout for a single probe in milliseconds.
    pub timeout_ms: u64,

    /// Executable used by the command strategy.
    pub program: String,
}

impl PingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            target: "8.8.8.8".to_string(),
            method: PingMethod::Command,
            tcp_port: 53,
            timeout_ms: 2000,
            program: "ping".to_string(),
        }
    }
}

/// HTTP probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpProbeConfig {
    /// URL fetched with a single GET per cycle.
    pub url: String,

    /// Hard timeout for the request, body drain included, in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header sent with the probe.
    pub user_agent: String,
}

impl HttpProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        Self {
            url: "https://www.google.com".to_string(),
            timeout_ms: 5000,
            user_agent: concat!("connectivity-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Alert raised on transition to disconnected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Emit an alert event when connectivity is lost.
    pub enabled: bool,

    pub title: String,

    pub message: String,

    /// How long the presentation layer should show the alert.
    pub duration_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Connection lost".to_string(),
            message: "Internet connectivity is down".to_string(),
            duration_ms: 5000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}
