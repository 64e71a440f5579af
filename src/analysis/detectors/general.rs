// GeneralDetector - fallback loud-transient classifier
//
// Catches loud disturbances the specific classifiers miss. The flux gate is
// deliberate: a constant-level source such as a fan keeps energy high but
// flux near zero, and must never fire this detector. The reported frequency
// range is centered on the frame's peak frequency.

use super::{resolve_tuning, DetectorTuning};
use crate::analysis::events::{EventDetails, FrequencyRange, NoiseEvent, NoiseEventKind};
use crate::analysis::spectral::SpectralFeatures;

/// Built-in total-energy trigger threshold (byte-magnitude units)
pub const BASE_ENERGY_THRESHOLD: f32 = 8000.0;

/// Built-in spectral-flux gate excluding stationary noise
pub const BASE_FLUX_THRESHOLD: f32 = 600.0;

/// Minimum gap between two generic events
pub const COOLDOWN_MS: u64 = 500;

/// Half-width of the reported frequency range around the peak
const RANGE_HALF_WIDTH_HZ: f32 = 200.0;

/// Audible clip bounds for the reported range
const MIN_HZ: f32 = 20.0;
const MAX_HZ: f32 = 20000.0;

#[derive(Debug, Default)]
pub struct GeneralDetector {
    last_trigger_ms: Option<u64>,
}

impl GeneralDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one frame; at most one event per call
    ///
    /// The optional `base_threshold` override targets the energy threshold;
    /// the flux gate always uses its built-in base. Both scale with
    /// sensitivity.
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
        let energy_threshold = tuning.effective_threshold(BASE_ENERGY_THRESHOLD);
        let flux_threshold = tuning.scale(BASE_FLUX_THRESHOLD);

        if features.total_energy > energy_threshold && features.flux > flux_threshold {
            self.last_trigger_ms = Some(timestamp_ms);
            let confidence = (features.total_energy / energy_threshold * 0.5).min(1.0);
            let min_hz = (features.peak_hz - RANGE_HALF_WIDTH_HZ).clamp(MIN_HZ, MAX_HZ);
            let max_hz = (features.peak_hz + RANGE_HALF_WIDTH_HZ).clamp(MIN_HZ, MAX_HZ);
            return Some(NoiseEvent {
                kind: NoiseEventKind::Generic,
                timestamp_ms,
                confidence,
                range: FrequencyRange::new(min_hz, max_hz),
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

    fn transient_features() -> SpectralFeatures {
        SpectralFeatures {
            total_energy: 12000.0,
            low_energy: 3000.0,
            mid_energy: 6000.0,
            high_energy: 3000.0,
            flux: 900.0,
            centroid_hz: 1500.0,
            peak_hz: 1000.0,
        }
    }

    #[test]
    fn test_stationary_noise_never_fires() {
        let mut detector = GeneralDetector::new();

        // A fan: huge energy, near-zero flux
        let mut fan = transient_features();
        fan.total_energy = BASE_ENERGY_THRESHOLD * 5.0;
        fan.flux = BASE_FLUX_THRESHOLD * 0.5;

        for frame in 0..20 {
            assert!(detector.detect(&fan, frame * 16, None).is_none());
        }
    }

    #[test]
    fn test_threshold_override_raises_energy_floor() {
        let mut detector = GeneralDetector::new();
        let features = transient_features();

        assert!(detector.detect(&features, 0, None).is_some());

        detector.reset();
        let strict = DetectorTuning {
            base_threshold: Some(features.total_energy * 2.0),
            sensitivity: 1.0,
        };
        assert!(
            detector.detect(&features, 0, Some(&strict)).is_none(),
            "raising the threshold must require more energy to fire"
        );
    }

    #[test]
    fn test_range_centered_on_peak_and_clipped() {
        let mut detector = GeneralDetector::new();

        let features = transient_features();
        let event = detector.detect(&features, 0, None).unwrap();
        assert_eq!(event.range.min_hz, 800.0);
        assert_eq!(event.range.max_hz, 1200.0);

        // Peak near the bottom of the audible range clips at 20 Hz
        detector.reset();
        let mut low_peak = transient_features();
        low_peak.peak_hz = 60.0;
        let event = detector.detect(&low_peak, 0, None).unwrap();
        assert_eq!(event.range.min_hz, 20.0);
        assert_eq!(event.range.max_hz, 260.0);
    }

    #[test]
    fn test_cooldown_spans_500ms() {
        let mut detector = GeneralDetector::new();
        let features = transient_features();

        assert!(detector.detect(&features, 1000, None).is_some());
        assert!(detector.detect(&features, 1400, None).is_none());
        assert!(detector.detect(&features, 1500, None).is_some());
    }
}
