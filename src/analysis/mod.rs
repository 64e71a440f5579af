// Analysis module - the detection half of the signal-intelligence pipeline
//
// Pipeline: byte magnitude frame → SpectralAnalyzer → features →
// {Footstep, Friction, General} detectors → arbitration → event stream.
//
// Every stage is synchronous and frame-driven; the only mutable state is
// owned by the component instances (flux history, detector counters and
// cooldown timestamps), each with an explicit reset(). SpectrumProcessor is
// the optional front-end that produces byte frames from raw audio when no
// host analyser is available.

pub mod arbitrator;
pub mod detectors;
pub mod events;
pub mod spectral;
pub mod spectrum;

pub use arbitrator::{arbitrate, should_run_general};
pub use detectors::{
    DetectionConfig, DetectorTuning, FootstepDetector, FrictionDetector, GeneralDetector,
};
pub use events::{EventDetails, EventLog, FrequencyRange, NoiseEvent, NoiseEventKind};
pub use spectral::{SpectralAnalyzer, SpectralFeatures};
pub use spectrum::SpectrumProcessor;
