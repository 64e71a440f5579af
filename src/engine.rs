// MonitorEngine - frame-driven pipeline coordinator
//
// The host calls process_frame once per rendered audio frame (~16 ms) with
// a magnitude snapshot and a monotonic timestamp. The engine runs the full
// detection pipeline synchronously within the call: feature extraction,
// the three classifiers (the generic fallback gated by the arbitration
// precondition so its cooldown is not consumed while suppressed),
// arbitration, and bookkeeping for the masking calculator's history-based
// modes. Arbitrated events are fanned out on a broadcast channel; sends to
// a channel with no subscribers are ignored.
//
// No threads, no blocking IO. Every piece of state is owned here and
// discarded by reset().

use tokio::sync::broadcast;

use crate::analysis::{
    arbitrate, should_run_general, DetectionConfig, EventLog, FootstepDetector, FrictionDetector,
    GeneralDetector, NoiseEvent, SpectralAnalyzer, SpectralFeatures,
};
use crate::config::AppConfig;
use crate::masking::SpectrumHistory;
use crate::telemetry;

pub struct MonitorEngine {
    sample_rate: u32,
    detection: DetectionConfig,

    analyzer: SpectralAnalyzer,
    footstep: FootstepDetector,
    friction: FrictionDetector,
    general: GeneralDetector,

    event_log: EventLog,
    history: SpectrumHistory,
    events_tx: broadcast::Sender<NoiseEvent>,

    last_features: SpectralFeatures,
}

impl MonitorEngine {
    pub fn new(config: &AppConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.pipeline.event_channel_capacity.max(1));
        Self {
            sample_rate: config.analyser.sample_rate,
            detection: config.detection,
            analyzer: SpectralAnalyzer::new(),
            footstep: FootstepDetector::new(),
            friction: FrictionDetector::new(),
            general: GeneralDetector::new(),
            event_log: EventLog::new(config.pipeline.event_log_capacity),
            history: SpectrumHistory::new(),
            events_tx,
            last_features: SpectralFeatures::default(),
        }
    }

    /// Run one magnitude frame through the full detection pipeline
    ///
    /// Returns the frame's arbitrated events (0-2). The same events are
    /// appended to the bounded log and broadcast to subscribers.
    pub fn process_frame(&mut self, frame: &[u8], timestamp_ms: u64) -> Vec<NoiseEvent> {
        let features = self.analyzer.analyze(frame, self.sample_rate);
        self.last_features = features;
        self.history.record(frame, timestamp_ms);
        telemetry::hub().record_frame();

        let foot = self
            .footstep
            .detect(&features, timestamp_ms, Some(&self.detection.footstep));
        let fric = self
            .friction
            .detect(&features, timestamp_ms, Some(&self.detection.friction));
        let sustaining = self.friction.is_sustaining();

        let general = if should_run_general(foot.as_ref(), fric.as_ref(), sustaining) {
            self.general
                .detect(&features, timestamp_ms, Some(&self.detection.generic))
        } else {
            None
        };

        let resolved = arbitrate(foot, fric, general, sustaining);
        for event in &resolved {
            tracing::debug!(
                kind = ?event.kind,
                confidence = event.confidence,
                timestamp_ms = event.timestamp_ms,
                "disturbance classified"
            );
            telemetry::hub().record_event(event);
            self.event_log.push(event.clone());
            let _ = self.events_tx.send(event.clone());
        }

        resolved
    }

    /// Subscribe to the arbitrated event stream
    pub fn subscribe(&self) -> broadcast::Receiver<NoiseEvent> {
        self.events_tx.subscribe()
    }

    /// Features of the most recently processed frame
    pub fn last_features(&self) -> &SpectralFeatures {
        &self.last_features
    }

    /// The bounded recent-event log (event-log masking mode input)
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// The learned-mode spectrum history
    pub fn history(&self) -> &SpectrumHistory {
        &self.history
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Replace the detection tuning for subsequent frames
    pub fn set_detection_config(&mut self, detection: DetectionConfig) {
        self.detection = detection;
    }

    /// Discard all accumulated state (valid at any time)
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.footstep.reset();
        self.friction.reset();
        self.general.reset();
        self.event_log.clear();
        self.history.clear();
        self.last_features = SpectralFeatures::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NoiseEventKind;

    const BIN_COUNT: usize = 512;

    fn engine() -> MonitorEngine {
        MonitorEngine::new(&AppConfig::default())
    }

    /// Frame with a constant level over the low band only
    fn low_band_frame(level: u8) -> Vec<u8> {
        let hz_per_bin = (48000.0 / 2.0) / BIN_COUNT as f32;
        (0..BIN_COUNT)
            .map(|i| {
                if (i as f32 * hz_per_bin) < 300.0 {
                    level
                } else {
                    0
                }
            })
            .collect()
    }

    #[test]
    fn test_silence_produces_no_events() {
        let mut engine = engine();
        let silent = vec![0u8; BIN_COUNT];
        for frame_index in 0..50 {
            let events = engine.process_frame(&silent, frame_index * 16);
            assert!(events.is_empty());
        }
    }

    #[test]
    fn test_impulse_after_silence_classifies_as_footstep() {
        let mut engine = engine();
        let silent = vec![0u8; BIN_COUNT];
        engine.process_frame(&silent, 0);

        // Sudden loud low band: large flux and low energy simultaneously
        let events = engine.process_frame(&low_band_frame(250), 16);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, NoiseEventKind::Footstep);
        assert_eq!(engine.event_log().len(), 1);
    }

    #[test]
    fn test_subscribers_receive_broadcast_events() {
        let mut engine = engine();
        let mut rx = engine.subscribe();

        let silent = vec![0u8; BIN_COUNT];
        engine.process_frame(&silent, 0);
        engine.process_frame(&low_band_frame(250), 16);

        let received = rx.try_recv().expect("event should be broadcast");
        assert_eq!(received.kind, NoiseEventKind::Footstep);
    }

    #[test]
    fn test_reset_clears_log_and_history() {
        let mut engine = engine();
        let silent = vec![0u8; BIN_COUNT];
        engine.process_frame(&silent, 0);
        engine.process_frame(&low_band_frame(250), 16);
        assert!(!engine.event_log().is_empty());

        engine.reset();
        assert!(engine.event_log().is_empty());
        assert!(engine.history().is_empty());
        assert_eq!(engine.last_features().total_energy, 0.0);
    }
}
