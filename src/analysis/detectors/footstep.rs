// FootstepDetector - impact transient classifier with cooldown
//
// A footstep shows up as a simultaneous spectral-flux spike and a burst of
// low-band energy. The detector is a two-state machine (idle / cooldown):
// once it fires it stays silent for a fixed window so one physical impact
// cannot produce a burst of events across adjacent frames.

use super::{resolve_tuning, DetectorTuning};
use crate::analysis::events::{EventDetails, FrequencyRange, NoiseEvent, NoiseEventKind};
use crate::analysis::spectral::SpectralFeatures;

/// Built-in spectral-flux trigger threshold (byte-magnitude units)
pub const BASE_FLUX_THRESHOLD: f32 = 800.0;

/// Built-in low-band energy gate (byte-magnitude units)
pub const BASE_LOW_ENERGY_THRESHOLD: f32 = 1500.0;

/// Minimum gap between two footstep events
pub const COOLDOWN_MS: u64 = 300;

/// Frequency span reported for footstep events
const FOOTSTEP_RANGE_HZ: (f32, f32) = (20.0, 300.0);

#[derive(Debug, Default)]
pub struct FootstepDetector {
    last_trigger_ms: Option<u64>,
}

impl FootstepDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one frame; at most one event per call
    ///
    /// Returns `None` while cooling down, regardless of input. The optional
    /// `base_threshold` override targets the flux threshold; the low-energy
    /// gate always uses its built-in base. Both are scaled by sensitivity.
    pub fn detect(
        &mut self,
        features: &SpectralFeatures,
        timestamp_ms: u64,
        tuning: Option<&DetectorTuning>,
    ) -> Option<NoiseEvent> {
        if let Some(last) = self.last_trigger_ms {
            if timestamp_ms.saturating_sub(last) < COOLDOWN_MS {
                return None;
            }
        }

        let tuning = resolve_tuning(tuning);
        let flux_threshold = tuning.effective_threshold(BASE_FLUX_THRESHOLD);
        let energy_threshold = tuning.scale(BASE_LOW_ENERGY_THRESHOLD);

        if features.flux > flux_threshold && features.low_energy > energy_threshold {
            self.last_trigger_ms = Some(timestamp_ms);
            let confidence = (features.flux / flux_threshold * 0.5).min(1.0);
            return Some(NoiseEvent {
                kind: NoiseEventKind::Footstep,
                timestamp_ms,
                confidence,
                range: FrequencyRange::new(FOOTSTEP_RANGE_HZ.0, FOOTSTEP_RANGE_HZ.1),
                details: Some(EventDetails {
                    energy: features.total_energy,
                    spectral_flux: features.flux,
                }),
            });
        }

        None
    }

    /// Return to the initial idle state
    pub fn reset(&mut self) {
        self.last_trigger_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impact_features() -> SpectralFeatures {
        SpectralFeatures {
            total_energy: 4000.0,
            low_energy: 2500.0,
            mid_energy: 1000.0,
            high_energy: 500.0,
            flux: 1600.0,
            centroid_hz: 180.0,
            peak_hz: 90.0,
        }
    }

    #[test]
    fn test_trigger_requires_both_flux_and_low_energy() {
        let mut detector = FootstepDetector::new();

        let mut weak_flux = impact_features();
        weak_flux.flux = 100.0;
        assert!(detector.detect(&weak_flux, 0, None).is_none());

        let mut weak_low = impact_features();
        weak_low.low_energy = 100.0;
        assert!(detector.detect(&weak_low, 100, None).is_none());

        let event = detector.detect(&impact_features(), 200, None).unwrap();
        assert_eq!(event.kind, NoiseEventKind::Footstep);
        assert_eq!(event.range.min_hz, 20.0);
        assert_eq!(event.range.max_hz, 300.0);
    }

    #[test]
    fn test_cooldown_blocks_retrigger_until_elapsed() {
        let mut detector = FootstepDetector::new();
        let features = impact_features();

        assert!(detector.detect(&features, 1000, None).is_some());
        // Blocked while less than 300 ms have elapsed
        assert!(detector.detect(&features, 1100, None).is_none());
        assert!(detector.detect(&features, 1299, None).is_none());
        // Identical input fires again once the cooldown has passed
        assert!(detector.detect(&features, 1400, None).is_some());
    }

    #[test]
    fn test_confidence_scales_with_flux_and_clamps() {
        let mut detector = FootstepDetector::new();

        let mut features = impact_features();
        features.flux = BASE_FLUX_THRESHOLD * 1.2;
        let event = detector.detect(&features, 0, None).unwrap();
        assert!((event.confidence - 0.6).abs() < 1e-5);

        detector.reset();
        features.flux = BASE_FLUX_THRESHOLD * 10.0;
        let event = detector.detect(&features, 0, None).unwrap();
        assert_eq!(event.confidence, 1.0);
    }

    #[test]
    fn test_higher_sensitivity_enables_weaker_trigger() {
        let mut detector = FootstepDetector::new();
        let mut features = impact_features();
        features.flux = BASE_FLUX_THRESHOLD * 0.6;
        features.low_energy = BASE_LOW_ENERGY_THRESHOLD * 0.6;

        assert!(detector.detect(&features, 0, None).is_none());

        let sensitive = DetectorTuning {
            base_threshold: None,
            sensitivity: 2.0,
        };
        assert!(detector.detect(&features, 0, Some(&sensitive)).is_some());
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut detector = FootstepDetector::new();
        let features = impact_features();

        assert!(detector.detect(&features, 1000, None).is_some());
        detector.reset();
        assert!(detector.detect(&features, 1001, None).is_some());
    }
}
