//! Upstream internet connectivity monitor.
//!
//! Periodically runs a network-layer probe (ping or TCP connect) and an
//! application-layer HTTP probe, debounces failures with hysteresis, and
//! publishes a status snapshot plus edge-triggered events.

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::MonitorConfig;
pub use engine::{Engine, EngineHandle, Event, StatusRecord};
pub use lifecycle::Shutdown;
pub use probe::{Probe, ProbeResult};
