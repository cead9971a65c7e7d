//! Connectivity state engine.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (Idle ⇄ Running, single-shot timer)
//!     → executor.rs (ping probe, then HTTP probe)
//!     → CycleResult
//!     → state.rs (hysteresis, bounded history, transition flag)
//!     → StatusRecord snapshot (watch channel)
//!     → notifier.rs (Connected / Disconnected / Alert, broadcast channel)
//! ```
//!
//! # Design Decisions
//! - One task owns the StatusRecord; cycles never overlap, so no locking
//! - Readers only ever see cloned snapshots
//! - Probe failures and probe panics both end up as failed ProbeResults;
//!   the only user-visible failure signal is `is_connected == false`

pub mod executor;
pub mod monitor;
pub mod notifier;
pub mod scheduler;
pub mod state;

pub use executor::ProbeExecutor;
pub use monitor::{Engine, EngineError, EngineHandle};
pub use notifier::{Event, Notifier};
pub use scheduler::{Scheduler, Trigger};
pub use state::{CycleResult, History, StatusRecord};
