// Event detectors - stateful per-type disturbance classifiers
//
// Three independent classifiers consume the per-frame feature vector and
// emit at most one event per call:
//
// - FootstepDetector: sudden low-frequency impact, cooldown-gated
// - FrictionDetector: sustained drag/roll sound, frame-count hysteresis
// - GeneralDetector: fallback loud transient, excludes stationary noise
//
// Every detector resolves its trigger threshold the same way: an optional
// per-call override (or the built-in base) divided by the sensitivity
// multiplier. Higher sensitivity lowers the effective threshold, so a
// non-triggering input can only move closer to triggering as sensitivity
// grows. Sensitivity must be > 0; this is a caller contract and is not
// validated here.

mod footstep;
mod friction;
mod general;

pub use footstep::FootstepDetector;
pub use friction::FrictionDetector;
pub use general::GeneralDetector;

/// Threshold tuning for one detector
///
/// Default resolution order: explicit `base_threshold` override, else the
/// detector's built-in constant; the result is divided by `sensitivity`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorTuning {
    /// Override for the detector's primary trigger threshold
    pub base_threshold: Option<f32>,
    /// Sensitivity multiplier (> 0, caller contract)
    pub sensitivity: f32,
}

impl Default for DetectorTuning {
    fn default() -> Self {
        Self {
            base_threshold: None,
            sensitivity: 1.0,
        }
    }
}

impl DetectorTuning {
    /// Effective threshold given the detector's built-in base
    pub fn effective_threshold(&self, base: f32) -> f32 {
        self.base_threshold.unwrap_or(base) / self.sensitivity
    }

    /// Effective value for a secondary gate that has no override field
    pub fn scale(&self, base: f32) -> f32 {
        base / self.sensitivity
    }
}

/// Per-detector tuning for the whole detection layer
///
/// Supplied by the caller per invocation; the detectors hold no owned copy.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub footstep: DetectorTuning,
    pub friction: DetectorTuning,
    pub generic: DetectorTuning,
}

/// Resolve an optional per-call tuning to a concrete one
pub(crate) fn resolve_tuning(tuning: Option<&DetectorTuning>) -> DetectorTuning {
    tuning.copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_threshold_resolution_order() {
        let default_tuning = DetectorTuning::default();
        assert_eq!(default_tuning.effective_threshold(100.0), 100.0);

        let overridden = DetectorTuning {
            base_threshold: Some(250.0),
            sensitivity: 1.0,
        };
        assert_eq!(overridden.effective_threshold(100.0), 250.0);
    }

    #[test]
    fn test_sensitivity_lowers_effective_threshold_monotonically() {
        let base = 100.0;
        let mut prev = f32::INFINITY;
        for sensitivity in [0.5, 1.0, 1.5, 2.0, 4.0] {
            let tuning = DetectorTuning {
                base_threshold: None,
                sensitivity,
            };
            let eff = tuning.effective_threshold(base);
            assert!(eff < prev, "effective threshold must fall as sensitivity rises");
            prev = eff;
        }
    }
}
