// Soundmask Core - signal intelligence for adaptive noise masking
//
// Classifies recurring disturbance events in an environmental audio stream
// (impact footsteps, dragging/friction, other loud transients) and derives
// the parameters of a multi-color masking-noise signal that covers them.
// The host supplies periodic frequency-magnitude snapshots and plays back
// the synthesized loop; everything here is synchronous and frame-driven.

// Module declarations
pub mod analysis;
pub mod config;
pub mod engine;
pub mod masking;
pub mod synth;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::{
    DetectionConfig, DetectorTuning, NoiseEvent, NoiseEventKind, SpectralAnalyzer,
    SpectralFeatures,
};
pub use config::AppConfig;
pub use engine::MonitorEngine;
pub use masking::{AdaptiveMaskingCalculator, MaskingConfig, MaskingDelta, NoiseColorMix};
pub use synth::{NoiseColor, NoiseSynthesizer};
