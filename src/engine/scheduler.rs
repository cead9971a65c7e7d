//! Check scheduling.
//!
//! # States
//! - Idle: no cycle in flight, single-shot timer armed
//! - Running: one cycle's probes in flight
//!
//! # State Transitions
//! ```text
//! start            → Running
//! cycle completes  → apply, publish, notify → Idle (timer armed)
//! timer fires      → Running
//! CheckNow in Idle → timer dropped → Running
//! Stop / shutdown  → exit (armed timer dropped, in-flight cycle discarded)
//! ```
//!
//! # Design Decisions
//! - The timer is armed only after a cycle fully resolves, so cycles never
//!   overlap and the interval is measured from the end of the last cycle
//! - A CheckNow received while Running is coalesced into the current cycle
//! - The status record is owned here; readers get snapshots via `watch`

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time;

use crate::config::ScheduleConfig;
use crate::engine::executor::ProbeExecutor;
use crate::engine::notifier::Notifier;
use crate::engine::state::{CycleResult, StatusRecord};
use crate::observability::metrics;
use crate::probe::Probe;

/// Request sent to a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Run a cycle now instead of waiting for the timer.
    CheckNow,
    /// Stop the scheduler.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
}

pub struct Scheduler<P, H> {
    executor: ProbeExecutor<P, H>,
    schedule: ScheduleConfig,
    record: StatusRecord,
    status: watch::Sender<StatusRecord>,
    notifier: Notifier,
}

impl<P: Probe, H: Probe> Scheduler<P, H> {
    pub fn new(
        executor: ProbeExecutor<P, H>,
        schedule: ScheduleConfig,
        status: watch::Sender<StatusRecord>,
        notifier: Notifier,
    ) -> Self {
        let record = status.borrow().clone();
        Self {
            executor,
            schedule,
            record,
            status,
            notifier,
        }
    }

    pub fn record(&self) -> &StatusRecord {
        &self.record
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Run one cycle to completion and apply it. Returns whether the
    /// connectivity state changed.
    pub async fn run_once(&mut self) -> bool {
        let cycle = self.executor.run_cycle().await;
        self.complete(&cycle)
    }

    fn complete(&mut self, cycle: &CycleResult) -> bool {
        let transitioned = self.record.apply_cycle(cycle, &self.schedule);
        metrics::record_status(self.record.is_connected, self.record.consecutive_failures);

        self.status.send_replace(self.record.clone());
        self.notifier.on_cycle(&self.record, transitioned);
        transitioned
    }

    /// Drive cycles until stopped.
    ///
    /// The loop ends on `Trigger::Stop`, when every trigger sender is gone,
    /// or when the shutdown broadcast fires or closes.
    pub async fn run(
        mut self,
        mut triggers: mpsc::Receiver<Trigger>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let interval = self.schedule.update_interval();
        tracing::info!(
            interval_secs = interval.as_secs(),
            consider_down_after_fails = self.schedule.consider_down_after_fails,
            "Connectivity monitor starting"
        );

        let mut phase = Phase::Running;
        loop {
            match phase {
                Phase::Running => {
                    let outcome = {
                        let cycle = self.executor.run_cycle();
                        tokio::pin!(cycle);
                        loop {
                            tokio::select! {
                                biased;
                                _ = shutdown.recv() => break None,
                                trigger = triggers.recv() => match trigger {
                                    Some(Trigger::CheckNow) => {
                                        tracing::debug!("Check already in flight, ignoring trigger");
                                    }
                                    Some(Trigger::Stop) | None => break None,
                                },
                                result = &mut cycle => break Some(result),
                            }
                        }
                    };

                    let Some(cycle) = outcome else {
                        tracing::info!("Stop requested during check, discarding in-flight cycle");
                        break;
                    };
                    self.complete(&cycle);
                    phase = Phase::Idle;
                }
                Phase::Idle => {
                    let timer = time::sleep(interval);
                    tokio::pin!(timer);
                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => break,
                        trigger = triggers.recv() => match trigger {
                            Some(Trigger::CheckNow) => tracing::debug!("Immediate check requested"),
                            Some(Trigger::Stop) | None => break,
                        },
                        _ = &mut timer => {}
                    }
                    phase = Phase::Running;
                }
            }
        }

        tracing::info!("Connectivity monitor stopped");
    }
}
