//! Connectivity state and hysteresis.
//!
//! # State Transitions
//! ```text
//! Connected → Disconnected: consecutive failed cycles >= consider_down_after_fails
//! Disconnected → Connected: first fully successful cycle (no debounce)
//! ```
//!
//! # Design Decisions
//! - A cycle is fully successful only when both probes succeed
//! - Below the failure threshold the displayed state and the latency
//!   figures are held at their last values
//! - History is a fixed-capacity ring, most recent first

use std::collections::VecDeque;
use std::time::SystemTime;

use serde::Serialize;

use crate::config::ScheduleConfig;
use crate::probe::ProbeResult;

/// Both probe outcomes of one check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleResult {
    pub ping: ProbeResult,
    pub http: ProbeResult,
}

impl CycleResult {
    pub fn is_fully_successful(&self) -> bool {
        self.ping.success && self.http.success
    }
}

/// Bounded, ordered record of past `is_connected` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    #[serde(skip)]
    capacity: usize,
    entries: VecDeque<bool>,
}

impl History {
    /// The ring grows on demand up to `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Insert at the front, dropping the oldest entries beyond capacity.
    pub fn push(&mut self, connected: bool) {
        self.entries.push_front(connected);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<bool> {
        self.entries.front().copied()
    }

    /// Entries from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<bool> {
        self.iter().collect()
    }
}

/// The engine's aggregated connectivity state.
///
/// Mutated once per completed cycle by the scheduler; everyone else gets
/// a cloned snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    /// Debounced, authoritative connectivity state.
    pub is_connected: bool,
    pub last_checked_at: SystemTime,
    /// Time of the last fully successful cycle.
    pub last_connected_at: Option<SystemTime>,
    pub consecutive_failures: u32,
    pub history: History,
    /// Latency figures from the last fully successful cycle.
    pub last_ping_ms: Option<f64>,
    pub last_http_ms: Option<f64>,
}

impl StatusRecord {
    pub fn new(max_history: usize) -> Self {
        Self::new_at(max_history, SystemTime::now())
    }

    pub fn new_at(max_history: usize, now: SystemTime) -> Self {
        Self {
            is_connected: false,
            last_checked_at: now,
            last_connected_at: None,
            consecutive_failures: 0,
            history: History::new(max_history),
            last_ping_ms: None,
            last_http_ms: None,
        }
    }

    /// Fold one cycle into the record. Returns whether `is_connected` changed.
    pub fn apply_cycle(&mut self, cycle: &CycleResult, schedule: &ScheduleConfig) -> bool {
        self.apply_cycle_at(cycle, schedule, SystemTime::now())
    }

    pub fn apply_cycle_at(
        &mut self,
        cycle: &CycleResult,
        schedule: &ScheduleConfig,
        now: SystemTime,
    ) -> bool {
        let was_connected = self.is_connected;
        self.last_checked_at = now;

        if cycle.is_fully_successful() {
            self.is_connected = true;
            self.last_connected_at = Some(now);
            self.consecutive_failures = 0;
            self.last_ping_ms = cycle.ping.elapsed_ms;
            self.last_http_ms = cycle.http.elapsed_ms;
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.consecutive_failures >= schedule.consider_down_after_fails {
                self.is_connected = false;
            }
        }

        self.history.push(self.is_connected);

        let transitioned = was_connected != self.is_connected;
        if transitioned {
            tracing::info!(
                connected = self.is_connected,
                consecutive_failures = self.consecutive_failures,
                "Connectivity state changed"
            );
        } else if !cycle.is_fully_successful() {
            tracing::debug!(
                failures = self.consecutive_failures,
                threshold = schedule.consider_down_after_fails,
                ping_ok = cycle.ping.success,
                http_ok = cycle.http.success,
                "Check cycle failed"
            );
        }
        transitioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn schedule(fails: u32, history: usize) -> ScheduleConfig {
        ScheduleConfig {
            update_interval_secs: 60,
            consider_down_after_fails: fails,
            max_history: history,
        }
    }

    fn ok() -> CycleResult {
        CycleResult {
            ping: ProbeResult::success(10.0),
            http: ProbeResult::success(80.0),
        }
    }

    fn failed() -> CycleResult {
        CycleResult {
            ping: ProbeResult::failure(),
            http: ProbeResult::failure(),
        }
    }

    #[test]
    fn test_huge_history_capacity_grows_on_demand() {
        let schedule = schedule(3, usize::MAX);
        let mut record = StatusRecord::new(schedule.max_history);
        assert_eq!(record.history.capacity(), usize::MAX);
        assert!(record.history.is_empty());

        for _ in 0..10 {
            record.apply_cycle(&ok(), &schedule);
        }
        assert_eq!(record.history.len(), 10);
        assert_eq!(record.history.latest(), Some(true));
    }

    fn http_down() -> CycleResult {
        CycleResult {
            ping: ProbeResult::success(5.0),
            http: ProbeResult::failure(),
        }
    }

    #[test]
    fn test_history_bounded_most_recent_first() {
        let mut history = History::new(3);
        assert!(history.is_empty());
        for v in [true, false, true, true] {
            history.push(v);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![true, true, false]);
        assert_eq!(history.latest(), Some(true));
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn test_first_success_transitions() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        assert!(!record.is_connected);

        assert!(record.apply_cycle(&ok(), &cfg));
        assert!(record.is_connected);
        assert_eq!(record.consecutive_failures, 0);
        assert_eq!(record.last_ping_ms, Some(10.0));
        assert_eq!(record.last_http_ms, Some(80.0));
        assert!(record.last_connected_at.is_some());

        // Applying the same successful cycle again is not a transition.
        assert!(!record.apply_cycle(&ok(), &cfg));
    }

    #[test]
    fn test_failures_from_fresh_state_never_transition() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        for expected in 1..=3 {
            assert!(!record.apply_cycle(&failed(), &cfg));
            assert!(!record.is_connected);
            assert_eq!(record.consecutive_failures, expected);
        }
        assert!(record.last_connected_at.is_none());
    }

    #[test]
    fn test_down_after_threshold_from_connected() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);

        assert!(!record.apply_cycle(&failed(), &cfg));
        assert!(!record.apply_cycle(&failed(), &cfg));
        assert!(record.is_connected);
        assert_eq!(record.consecutive_failures, 2);

        assert!(record.apply_cycle(&failed(), &cfg));
        assert!(!record.is_connected);
        assert_eq!(record.consecutive_failures, 3);

        // Further failures keep counting but do not transition again.
        assert!(!record.apply_cycle(&failed(), &cfg));
        assert_eq!(record.consecutive_failures, 4);
    }

    #[test]
    fn test_partial_failure_holds_state_and_latency() {
        let cfg = schedule(2, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);
        let connected_at = record.last_connected_at;

        assert!(!record.apply_cycle(&http_down(), &cfg));
        assert!(record.is_connected);
        assert_eq!(record.last_ping_ms, Some(10.0));
        assert_eq!(record.last_http_ms, Some(80.0));
        assert_eq!(record.last_connected_at, connected_at);

        assert!(record.apply_cycle(&http_down(), &cfg));
        assert!(!record.is_connected);
        // Latency is still the last fully successful figure.
        assert_eq!(record.last_ping_ms, Some(10.0));
    }

    #[test]
    fn test_single_success_recovers_immediately() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);
        for _ in 0..50 {
            record.apply_cycle(&failed(), &cfg);
        }
        assert!(!record.is_connected);
        assert_eq!(record.consecutive_failures, 50);

        assert!(record.apply_cycle(&ok(), &cfg));
        assert!(record.is_connected);
        assert_eq!(record.consecutive_failures, 0);
    }

    #[test]
    fn test_threshold_of_one_flips_on_first_failure() {
        let cfg = schedule(1, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);
        assert!(record.apply_cycle(&http_down(), &cfg));
        assert!(!record.is_connected);
    }

    #[test]
    fn test_history_alternating_cycles() {
        // consider_down_after_fails = 1 so every cycle's outcome shows in history.
        let cfg = schedule(1, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        let cycles = [ok(), failed(), ok(), failed(), ok(), failed(), ok()];
        for cycle in &cycles {
            record.apply_cycle(cycle, &cfg);
            assert!(record.history.len() <= cfg.max_history);
            assert_eq!(record.history.latest(), Some(record.is_connected));
        }
        assert_eq!(record.history.len(), 5);
        assert_eq!(record.history.to_vec(), vec![true, false, true, false, true]);
    }

    #[test]
    fn test_history_records_held_state() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);
        record.apply_cycle(&failed(), &cfg);
        record.apply_cycle(&failed(), &cfg);
        record.apply_cycle(&failed(), &cfg);
        assert_eq!(record.history.to_vec(), vec![false, true, true, true]);
    }

    #[test]
    fn test_transition_matches_state_change_over_mixed_sequence() {
        let cfg = schedule(2, 4);
        let mut record = StatusRecord::new(cfg.max_history);
        let pattern = [true, false, false, true, false, true, false, false, false, true, true];
        let mut previous = record.is_connected;
        for success in pattern {
            let cycle = if success { ok() } else { failed() };
            let transitioned = record.apply_cycle(&cycle, &cfg);
            assert_eq!(transitioned, previous != record.is_connected);
            assert_eq!(record.history.latest(), Some(record.is_connected));
            assert!(record.history.len() <= cfg.max_history);
            if !record.is_connected && previous {
                assert_eq!(record.consecutive_failures, cfg.consider_down_after_fails);
            }
            previous = record.is_connected;
        }
    }

    #[test]
    fn test_timestamps() {
        let cfg = schedule(3, 5);
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let mut record = StatusRecord::new_at(cfg.max_history, start);
        assert_eq!(record.last_checked_at, start);

        let t1 = start + Duration::from_secs(60);
        record.apply_cycle_at(&ok(), &cfg, t1);
        assert_eq!(record.last_checked_at, t1);
        assert_eq!(record.last_connected_at, Some(t1));

        let t2 = t1 + Duration::from_secs(60);
        record.apply_cycle_at(&failed(), &cfg, t2);
        assert_eq!(record.last_checked_at, t2);
        assert_eq!(record.last_connected_at, Some(t1));
    }

    #[test]
    fn test_serializes_history_as_list() {
        let cfg = schedule(3, 5);
        let mut record = StatusRecord::new(cfg.max_history);
        record.apply_cycle(&ok(), &cfg);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["history"], serde_json::json!([true]));
        assert_eq!(json["is_connected"], serde_json::json!(true));
    }
}
