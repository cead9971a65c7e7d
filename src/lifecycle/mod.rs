//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT (Ctrl-C elsewhere) → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed task leaves its loop
//! ```
//!
//! # Design Decisions
//! - Shutdown is a broadcast so any number of tasks can observe it
//! - The engine drops its armed timer and any in-flight cycle on shutdown

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
