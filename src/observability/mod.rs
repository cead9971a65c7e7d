//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, aggregator and scheduler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stderr, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Logs go to stderr so stdout stays free for status output
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
