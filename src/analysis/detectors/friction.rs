// FrictionDetector - sustained-noise classifier with frame-count hysteresis
//
// Dragging and rolling sounds hold mid-low energy for many consecutive
// frames instead of spiking. The detector is a three-state machine
// (idle / accumulating / sustaining): the trigger metric must stay above
// threshold for a full run of frames before exactly one event is emitted,
// after which the sustaining state suppresses further events until the
// sound stops. A single below-threshold frame drops straight back to idle;
// there is no debounce grace period.

use super::{resolve_tuning, DetectorTuning};
use crate::analysis::events::{EventDetails, FrequencyRange, NoiseEvent, NoiseEventKind};
use crate::analysis::spectral::SpectralFeatures;

/// Built-in trigger threshold for the friction metric (byte-magnitude units)
pub const BASE_THRESHOLD: f32 = 2000.0;

/// Consecutive above-threshold frames required before an event fires
/// (~192 ms at the nominal 16 ms frame period)
pub const SUSTAIN_FRAMES: u32 = 12;

/// Frequency span reported for friction events
const FRICTION_RANGE_HZ: (f32, f32) = (200.0, 1200.0);

#[derive(Debug, Default)]
pub struct FrictionDetector {
    consecutive_frames: u32,
    sustaining: bool,
}

impl FrictionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger metric: low band weighted down, mid band in full
    fn metric(features: &SpectralFeatures) -> f32 {
        0.5 * features.low_energy + features.mid_energy
    }

    /// Classify one frame; emits exactly one event per sustained run
    pub fn detect(
        &mut self,
        features: &SpectralFeatures,
        timestamp_ms: u64,
        tuning: Option<&DetectorTuning>,
    ) -> Option<NoiseEvent> {
        let tuning = resolve_tuning(tuning);
        let threshold = tuning.effective_threshold(BASE_THRESHOLD);
        let metric = Self::metric(features);

        if metric <= threshold {
            self.consecutive_frames = 0;
            self.sustaining = false;
            return None;
        }

        if self.sustaining {
            return None;
        }

        self.consecutive_frames += 1;
        if self.consecutive_frames < SUSTAIN_FRAMES {
            return None;
        }

        self.sustaining = true;
        let confidence = (metric / threshold * 0.6).min(1.0);
        Some(NoiseEvent {
            kind: NoiseEventKind::Friction,
            timestamp_ms,
            confidence,
            range: FrequencyRange::new(FRICTION_RANGE_HZ.0, FRICTION_RANGE_HZ.1),
            details: Some(EventDetails {
                energy: features.total_energy,
                spectral_flux: features.flux,
            }),
        })
    }

    /// Whether a continuous disturbance is currently being tracked
    ///
    /// The arbitrator reads this to suppress the fallback classifier while
    /// a drag/roll sound is ongoing.
    pub fn is_sustaining(&self) -> bool {
        self.sustaining
    }

    /// Return to the initial idle state
    pub fn reset(&mut self) {
        self.consecutive_frames = 0;
        self.sustaining = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag_features() -> SpectralFeatures {
        // metric = 0.5 * 2000 + 2500 = 3500, well above the base threshold
        SpectralFeatures {
            total_energy: 6000.0,
            low_energy: 2000.0,
            mid_energy: 2500.0,
            high_energy: 1500.0,
            flux: 50.0,
            centroid_hz: 900.0,
            peak_hz: 700.0,
        }
    }

    fn quiet_features() -> SpectralFeatures {
        SpectralFeatures::default()
    }

    #[test]
    fn test_emits_exactly_once_after_full_run() {
        let mut detector = FrictionDetector::new();
        let features = drag_features();

        // Frames 1-11: accumulating, no event
        for frame in 1..SUSTAIN_FRAMES {
            let out = detector.detect(&features, frame as u64 * 16, None);
            assert!(out.is_none(), "frame {frame} must not emit");
            assert!(!detector.is_sustaining());
        }

        // Frame 12: exactly one event, sustaining begins
        let event = detector
            .detect(&features, SUSTAIN_FRAMES as u64 * 16, None)
            .expect("frame 12 must emit");
        assert_eq!(event.kind, NoiseEventKind::Friction);
        assert!(detector.is_sustaining());

        // Frame 13: still above threshold, suppressed
        assert!(detector.detect(&features, 13 * 16, None).is_none());
        assert!(detector.is_sustaining());
    }

    #[test]
    fn test_below_threshold_frame_resets_immediately() {
        let mut detector = FrictionDetector::new();
        let features = drag_features();

        for frame in 0..SUSTAIN_FRAMES {
            detector.detect(&features, frame as u64 * 16, None);
        }
        assert!(detector.is_sustaining());

        // One quiet frame exits sustaining and zeroes the counter
        assert!(detector.detect(&quiet_features(), 300, None).is_none());
        assert!(!detector.is_sustaining());

        // A new event requires another full run
        for frame in 0..SUSTAIN_FRAMES - 1 {
            assert!(detector
                .detect(&features, 400 + frame as u64 * 16, None)
                .is_none());
        }
        assert!(detector.detect(&features, 700, None).is_some());
    }

    #[test]
    fn test_confidence_from_metric_ratio() {
        let mut detector = FrictionDetector::new();
        let mut features = quiet_features();
        // metric = 0.5 * 4000 + 1000 = 3000 = 1.5x base threshold
        features.low_energy = 4000.0;
        features.mid_energy = 1000.0;

        let mut event = None;
        for frame in 0..SUSTAIN_FRAMES {
            event = detector.detect(&features, frame as u64 * 16, None);
        }
        let event = event.expect("run completes");
        assert!((event.confidence - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_reset_clears_run_and_sustaining() {
        let mut detector = FrictionDetector::new();
        let features = drag_features();

        for frame in 0..SUSTAIN_FRAMES {
            detector.detect(&features, frame as u64 * 16, None);
        }
        assert!(detector.is_sustaining());

        detector.reset();
        assert!(!detector.is_sustaining());
        assert!(detector.detect(&features, 1000, None).is_none());
    }
}
