//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate probe targets (address shape, URL scheme and host)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before an engine is built; an invalid config never starts

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{MonitorConfig, PingMethod};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ping target must not be empty")]
    EmptyPingTarget,

    #[error("ping target '{0}' is not a valid host name or address")]
    InvalidPingTarget(String),

    #[error("http url '{url}' is invalid: {reason}")]
    InvalidHttpUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("metrics address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let schedule = &config.schedule;
    if schedule.update_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "schedule.update_interval_secs" });
    }
    if schedule.consider_down_after_fails == 0 {
        errors.push(ValidationError::Zero { field: "schedule.consider_down_after_fails" });
    }
    if schedule.max_history == 0 {
        errors.push(ValidationError::Zero { field: "schedule.max_history" });
    }

    let target = config.ping.target.trim();
    if target.is_empty() {
        errors.push(ValidationError::EmptyPingTarget);
    } else if target.starts_with('-') || target.chars().any(char::is_whitespace) {
        // The target ends up as a process argument; reject anything flag-like.
        errors.push(ValidationError::InvalidPingTarget(config.ping.target.clone()));
    }
    if config.ping.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "ping.timeout_ms" });
    }
    if config.ping.method == PingMethod::Tcp && config.ping.tcp_port == 0 {
        errors.push(ValidationError::Zero { field: "ping.tcp_port" });
    }

    if let Err(reason) = check_http_url(&config.http.url) {
        errors.push(ValidationError::InvalidHttpUrl {
            url: config.http.url.clone(),
            reason,
        });
    }
    if config.http.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "http.timeout_ms" });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
