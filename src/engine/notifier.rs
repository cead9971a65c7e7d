//! Edge-triggered connectivity events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::AlertConfig;
use crate::engine::state::StatusRecord;
use crate::observability::metrics;

/// Event delivered to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Connected,
    Disconnected,
    Alert {
        title: String,
        message: String,
        duration_ms: u64,
    },
}

/// Turns state transitions into events.
///
/// Delivery is fire-and-forget over a broadcast channel: no receivers, or a
/// lagging receiver, never blocks the engine.
#[derive(Debug)]
pub struct Notifier {
    tx: broadcast::Sender<Event>,
    alert: AlertConfig,
}

impl Notifier {
    pub fn new(alert: AlertConfig, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, alert }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<Event> {
        self.tx.clone()
    }

    /// Emit events for a completed cycle. Nothing is sent unless the cycle
    /// changed the connectivity state.
    pub fn on_cycle(&self, record: &StatusRecord, transitioned: bool) {
        if !transitioned {
            return;
        }
        metrics::record_transition(record.is_connected);

        if record.is_connected {
            self.emit(Event::Connected);
            return;
        }

        self.emit(Event::Disconnected);
        if self.alert.enabled {
            self.emit(Event::Alert {
                title: self.alert.title.clone(),
                message: self.alert.message.clone(),
                duration_ms: self.alert.duration_ms,
            });
        }
    }

    fn emit(&self, event: Event) {
        tracing::debug!(?event, receivers = self.tx.receiver_count(), "Emitting event");
        let _ = self.tx.send(event);
    }
}
