// DetectionArbitrator - resolves per-frame detector outputs into a
// non-contradictory event list
//
// The three classifiers run independently and can disagree about a frame.
// Arbitration is a pure function of their raw outputs plus the friction
// detector's sustaining flag; no state is read across object boundaries.
//
// Rules, in order:
// 1. Footstep and friction in the same frame cannot both describe the
//    dominant disturbance: keep the higher-confidence one, drop the other
//    (the dropped event is discarded entirely, not logged).
// 2. The generic fallback is admitted only when friction is not currently
//    sustaining and neither specific classifier fired this frame.

use crate::analysis::events::NoiseEvent;

/// Resolve one frame's detector outputs (0-2 events out)
pub fn arbitrate(
    footstep: Option<NoiseEvent>,
    friction: Option<NoiseEvent>,
    general: Option<NoiseEvent>,
    friction_sustaining: bool,
) -> Vec<NoiseEvent> {
    let mut resolved = Vec::with_capacity(2);

    let specific_fired = footstep.is_some() || friction.is_some();
    match (footstep, friction) {
        (Some(foot), Some(fric)) => {
            if foot.confidence >= fric.confidence {
                resolved.push(foot);
            } else {
                resolved.push(fric);
            }
        }
        (Some(foot), None) => resolved.push(foot),
        (None, Some(fric)) => resolved.push(fric),
        (None, None) => {}
    }

    if !friction_sustaining && !specific_fired {
        if let Some(gen) = general {
            resolved.push(gen);
        }
    }

    resolved
}

/// Whether the generic fallback should run at all this frame
///
/// The pipeline gates the detector *call* on the same condition the
/// arbitration applies to its output, so the generic cooldown is not
/// consumed while the event would be suppressed anyway.
pub fn should_run_general(
    footstep: Option<&NoiseEvent>,
    friction: Option<&NoiseEvent>,
    friction_sustaining: bool,
) -> bool {
    !friction_sustaining && footstep.is_none() && friction.is_none()
}
