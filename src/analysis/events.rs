// Event types - classified disturbance events and the bounded recent-event log

use std::collections::VecDeque;

/// Category of a classified disturbance
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseEventKind {
    /// Impact footstep (sudden low-frequency transient)
    Footstep,
    /// Dragging / rolling / friction sound (sustained mid-low energy)
    Friction,
    /// Loud transient not matched by a specific classifier
    Generic,
    /// Voice activity (reserved for callers with a speech front-end)
    Voice,
    /// Unclassifiable
    Unknown,
}

/// Frequency span a disturbance occupies, in Hz
///
/// Invariant: `min_hz <= max_hz`. Constructed only through [`FrequencyRange::new`],
/// which orders its arguments.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrequencyRange {
    pub min_hz: f32,
    pub max_hz: f32,
}

impl FrequencyRange {
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min_hz: a.min(b),
            max_hz: a.max(b),
        }
    }

    /// Center frequency, used for masking-band bucketing
    pub fn midpoint_hz(&self) -> f32 {
        (self.min_hz + self.max_hz) / 2.0
    }
}

/// Raw measurements captured at detection time
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventDetails {
    pub energy: f32,
    pub spectral_flux: f32,
}

/// One classified disturbance event
///
/// Immutable once created by a detector; consumed by the arbitrator, the
/// event log, and the masking calculator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NoiseEvent {
    pub kind: NoiseEventKind,
    /// Caller-supplied timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Classification confidence, clamped to [0, 1]
    pub confidence: f32,
    pub range: FrequencyRange,
    pub details: Option<EventDetails>,
}

/// Bounded most-recent-N log of arbitrated events
///
/// Oldest entries are evicted first once the capacity is reached. Owned by
/// the pipeline coordinator, read by the event-log masking mode.
#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<NoiseEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: NoiseEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &NoiseEvent> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
