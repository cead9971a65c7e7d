//! Engine construction and the handle given to the host process.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::{validate_config, MonitorConfig, ValidationError};
use crate::engine::executor::ProbeExecutor;
use crate::engine::notifier::{Event, Notifier};
use crate::engine::scheduler::{Scheduler, Trigger};
use crate::engine::state::StatusRecord;
use crate::probe::{HttpProbe, PingProbe, Probe};

const TRIGGER_CAPACITY: usize = 8;
const EVENT_CAPACITY: usize = 64;

/// Errors raised while building an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    InvalidConfig(Vec<ValidationError>),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// A connectivity engine that has not been started yet.
pub struct Engine<P = PingProbe, H = HttpProbe> {
    scheduler: Scheduler<P, H>,
    status: watch::Receiver<StatusRecord>,
}

impl Engine<PingProbe, HttpProbe> {
    /// Validate the configuration and build the configured probes.
    pub fn from_config(config: MonitorConfig) -> Result<Self, EngineError> {
        validate_config(&config).map_err(EngineError::InvalidConfig)?;
        let ping = PingProbe::from_config(&config.ping);
        let http = HttpProbe::from_config(&config.http)?;
        Ok(Self::build(config, ping, http))
    }
}

impl<P, H> Engine<P, H>
where
    P: Probe + 'static,
    H: Probe + 'static,
{
    /// Build an engine around arbitrary probe implementations.
    pub fn with_probes(config: MonitorConfig, ping: P, http: H) -> Result<Self, EngineError> {
        validate_config(&config).map_err(EngineError::InvalidConfig)?;
        Ok(Self::build(config, ping, http))
    }

    fn build(config: MonitorConfig, ping: P, http: H) -> Self {
        let (status_tx, status) = watch::channel(StatusRecord::new(config.schedule.max_history));
        let notifier = Notifier::new(config.alert, EVENT_CAPACITY);
        let scheduler = Scheduler::new(
            ProbeExecutor::new(ping, http),
            config.schedule,
            status_tx,
            notifier,
        );

        Self { scheduler, status }
    }

    /// Subscribe before `spawn` to be sure of seeing the first transition.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.scheduler.notifier().subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<StatusRecord> {
        self.status.clone()
    }

    pub fn snapshot(&self) -> StatusRecord {
        self.scheduler.record().clone()
    }

    /// Run a single cycle in the caller's task, without scheduling.
    pub async fn run_once(&mut self) -> bool {
        self.scheduler.run_once().await
    }

    /// Start the scheduler on the Tokio runtime. The first check runs
    /// immediately.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> EngineHandle {
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_CAPACITY);
        let events = self.scheduler.notifier().sender();

        let task = tokio::spawn(self.scheduler.run(trigger_rx, shutdown));

        EngineHandle {
            triggers: trigger_tx,
            status: self.status,
            events,
            task,
        }
    }
}

/// Control and read access to a running engine.
///
/// Dropping every handle closes the trigger channel, which stops the engine.
pub struct EngineHandle {
    triggers: mpsc::Sender<Trigger>,
    status: watch::Receiver<StatusRecord>,
    events: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Ask for an immediate check. Returns `false` if the engine has
    /// stopped or its trigger queue is full.
    pub fn check_now(&self) -> bool {
        self.triggers.try_send(Trigger::CheckNow).is_ok()
    }

    /// Ask the engine to stop. A cycle in flight is discarded.
    pub async fn stop(&self) {
        let _ = self.triggers.send(Trigger::Stop).await;
    }

    /// Latest published status.
    pub fn snapshot(&self) -> StatusRecord {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<StatusRecord> {
        self.status.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the engine task to exit. Call after `stop` or after the
    /// shutdown broadcast fired.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        let EngineHandle { triggers, task, .. } = self;
        // Keep the trigger channel open until the task is done.
        let result = task.await;
        drop(triggers);
        result
    }
}
