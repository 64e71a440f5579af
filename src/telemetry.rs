//! Diagnostics telemetry collector.
//!
//! A process-wide hub counting processed frames and classified events, with
//! a bounded recent-event history for CLI reporting and a broadcast stream
//! for live subscribers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::analysis::{NoiseEvent, NoiseEventKind};

/// Global telemetry hub shared across the crate.
static HUB: Lazy<TelemetryHub> = Lazy::new(TelemetryHub::default);

/// Access the global telemetry hub.
pub fn hub() -> &'static TelemetryHub {
    &HUB
}

const HISTORY_CAPACITY: usize = 256;
const STREAM_BUFFER: usize = 64;

/// Snapshot of hub state for CLI reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub frames_processed: u64,
    pub footstep_events: u64,
    pub friction_events: u64,
    pub generic_events: u64,
    pub other_events: u64,
    pub recent: Vec<NoiseEvent>,
}

/// Broadcast-based collector retaining a bounded history of events.
pub struct TelemetryHub {
    tx: broadcast::Sender<NoiseEvent>,
    history: Mutex<VecDeque<NoiseEvent>>,
    frames_processed: AtomicU64,
    footstep_events: AtomicU64,
    friction_events: AtomicU64,
    generic_events: AtomicU64,
    other_events: AtomicU64,
}

impl Default for TelemetryHub {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(STREAM_BUFFER);
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
            frames_processed: AtomicU64::new(0),
            footstep_events: AtomicU64::new(0),
            friction_events: AtomicU64::new(0),
            generic_events: AtomicU64::new(0),
            other_events: AtomicU64::new(0),
        }
    }
}

impl TelemetryHub {
    pub fn record_frame(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event(&self, event: &NoiseEvent) {
        let counter = match event.kind {
            NoiseEventKind::Footstep => &self.footstep_events,
            NoiseEventKind::Friction => &self.friction_events,
            NoiseEventKind::Generic => &self.generic_events,
            _ => &self.other_events,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        {
            let mut history = self.history.lock().expect("history poisoned");
            if history.len() == HISTORY_CAPACITY {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        let _ = self.tx.send(event.clone());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NoiseEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let history = self.history.lock().expect("history poisoned");
        TelemetrySnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            footstep_events: self.footstep_events.load(Ordering::Relaxed),
            friction_events: self.friction_events.load(Ordering::Relaxed),
            generic_events: self.generic_events.load(Ordering::Relaxed),
            other_events: self.other_events.load(Ordering::Relaxed),
            recent: history.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FrequencyRange;

    #[test]
    fn test_hub_counts_by_kind() {
        let hub = TelemetryHub::default();
        let event = NoiseEvent {
            kind: NoiseEventKind::Footstep,
            timestamp_ms: 0,
            confidence: 0.5,
            range: FrequencyRange::new(20.0, 300.0),
            details: None,
        };

        hub.record_frame();
        hub.record_event(&event);
        hub.record_event(&event);

        let snapshot = hub.snapshot();
        assert_eq!(snapshot.frames_processed, 1);
        assert_eq!(snapshot.footstep_events, 2);
        assert_eq!(snapshot.friction_events, 0);
        assert_eq!(snapshot.recent.len(), 2);
    }
}
