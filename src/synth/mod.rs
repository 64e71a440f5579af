// NoiseSynthesizer - seamlessly loopable colored-noise buffers
//
// Naive loop playback of a finite IIR-colored buffer produces an audible
// click at the wrap point: the filter state implied by the buffer's last
// samples does not match the state that produced its first samples. A
// crossfade would hide the click but causes amplitude ducking from phase
// cancellation.
//
// Instead the renderer filters circularly: every color filter runs over the
// *same* white-source array twice, carrying its internal state across the
// pass boundary. Pass 0 output is discarded; only pass 1 is written. By the
// start of pass 1 the filter's transient has settled into the state the
// loop wrap will reproduce, so the boundary is statistically
// indistinguishable from any interior sample pair.

pub mod filters;

use filters::{BlueFilter, BrownFilter, ColorFilter, PinkFilter, VioletFilter, WhiteFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The five synthesizable noise colors, named by spectral slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseColor {
    /// Flat spectrum
    White,
    /// -3 dB/octave
    Pink,
    /// -6 dB/octave
    Brown,
    /// +3 dB/octave
    Blue,
    /// +6 dB/octave
    Violet,
}

impl NoiseColor {
    pub const ALL: [NoiseColor; 5] = [
        NoiseColor::White,
        NoiseColor::Pink,
        NoiseColor::Brown,
        NoiseColor::Blue,
        NoiseColor::Violet,
    ];
}

impl std::fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NoiseColor::White => "white",
            NoiseColor::Pink => "pink",
            NoiseColor::Brown => "brown",
            NoiseColor::Blue => "blue",
            NoiseColor::Violet => "violet",
        };
        f.write_str(name)
    }
}

/// Renders finite, loopable mono sample buffers for each noise color
///
/// All colors draw from the same random source. The default constructor
/// seeds from entropy; [`with_seed`] gives deterministic output for tests
/// and reproducible renders.
///
/// [`with_seed`]: NoiseSynthesizer::with_seed
pub struct NoiseSynthesizer {
    rng: StdRng,
}

impl NoiseSynthesizer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Render one loopable buffer of `duration_secs * sample_rate` samples
    ///
    /// Output is mono f32 in [-1, 1]. Duration and sample rate are
    /// caller-supplied positive values; there are no error conditions.
    pub fn synthesize(
        &mut self,
        color: NoiseColor,
        duration_secs: f32,
        sample_rate: u32,
    ) -> Vec<f32> {
        let length = (duration_secs * sample_rate as f32) as usize;
        let source: Vec<f32> = (0..length).map(|_| self.rng.gen_range(-1.0..1.0)).collect();

        let mut filter: Box<dyn ColorFilter> = match color {
            NoiseColor::White => Box::new(WhiteFilter),
            NoiseColor::Pink => Box::new(PinkFilter::default()),
            NoiseColor::Brown => Box::new(BrownFilter::default()),
            NoiseColor::Blue => Box::new(BlueFilter::default()),
            NoiseColor::Violet => Box::new(VioletFilter::default()),
        };

        // Pass 0: settle the filter's transient over the full source,
        // discarding the output. The state carries into pass 1 unreset.
        for &x in &source {
            filter.process(x);
        }

        // Pass 1: the kept render
        source
            .iter()
            .map(|&x| filter.process(x).clamp(-1.0, 1.0))
            .collect()
    }
}

impl Default for NoiseSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}
