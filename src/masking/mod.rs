// AdaptiveMaskingCalculator - observed noise characteristics to
// masking-engine parameters
//
// Four calculation modes, all pure functions of their inputs:
//
// - instantaneous: one magnitude frame -> banded levels -> parameter delta
// - learned: aggregated frame history -> the same band mapping
// - event log: classified-event statistics -> color bias + rumble
// - single event: one event -> primary-color selection with type floors
//
// Every mode returns a partial MaskingDelta. Fields the mode has no opinion
// about stay None; the caller merges the delta onto its current
// configuration (MaskingDelta::apply_to is the canonical merge) and owns
// atomicity of the application.

pub mod history;

pub use history::SpectrumHistory;

use crate::analysis::events::{EventLog, NoiseEvent, NoiseEventKind};
use crate::synth::NoiseColor;

/// Band boundaries for the 5-band level split, in Hz
const BAND_EDGES_HZ: [f32; 4] = [150.0, 400.0, 1000.0, 4000.0];

/// Center frequencies of the masking engine's EQ bands, in Hz
pub const EQ_BAND_HZ: [f32; 10] = [
    32.0, 64.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Number of EQ bands
pub const EQ_BAND_COUNT: usize = EQ_BAND_HZ.len();

/// Level below which a band maps to the floor volume
const QUIET_LEVEL: f32 = 40.0;

/// Floor volume for bands with nothing to mask
const FLOOR_VOLUME: f32 = 0.1;

/// EQ reference level (byte magnitude) producing 0 dB gain
const EQ_BASELINE: f32 = 80.0;

/// Low-band level above which rumble is engaged
const RUMBLE_LEVEL: f32 = 140.0;

/// Per-color playback volumes in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseColorMix {
    pub white: f32,
    pub pink: f32,
    pub brown: f32,
    pub blue: f32,
    pub violet: f32,
}

impl NoiseColorMix {
    pub fn get(&self, color: NoiseColor) -> f32 {
        match color {
            NoiseColor::White => self.white,
            NoiseColor::Pink => self.pink,
            NoiseColor::Brown => self.brown,
            NoiseColor::Blue => self.blue,
            NoiseColor::Violet => self.violet,
        }
    }

    pub fn set(&mut self, color: NoiseColor, volume: f32) {
        let slot = match color {
            NoiseColor::White => &mut self.white,
            NoiseColor::Pink => &mut self.pink,
            NoiseColor::Brown => &mut self.brown,
            NoiseColor::Blue => &mut self.blue,
            NoiseColor::Violet => &mut self.violet,
        };
        *slot = volume.clamp(0.0, 1.0);
    }

    /// Every color at the same volume
    pub fn uniform(volume: f32) -> Self {
        let v = volume.clamp(0.0, 1.0);
        Self {
            white: v,
            pink: v,
            brown: v,
            blue: v,
            violet: v,
        }
    }
}

/// Snapshot of the masking engine's tunable parameters
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    pub noise_volumes: NoiseColorMix,
    /// Gain per EQ band in dB
    pub eq_gains_db: [f32; EQ_BAND_COUNT],
    pub rumble_intensity: f32,
    pub rumble_crossover_hz: f32,
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            noise_volumes: NoiseColorMix::default(),
            eq_gains_db: [0.0; EQ_BAND_COUNT],
            rumble_intensity: 0.0,
            rumble_crossover_hz: 90.0,
            highpass_hz: 20.0,
            lowpass_hz: 16000.0,
        }
    }
}

/// Partial update to a [`MaskingConfig`]
///
/// Never a full configuration: `None` fields are untouched by the merge.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct MaskingDelta {
    pub noise_volumes: Option<NoiseColorMix>,
    pub eq_gains_db: Option<[f32; EQ_BAND_COUNT]>,
    pub rumble_intensity: Option<f32>,
    pub rumble_crossover_hz: Option<f32>,
    pub highpass_hz: Option<f32>,
    pub lowpass_hz: Option<f32>,
}

impl MaskingDelta {
    pub fn is_empty(&self) -> bool {
        self.noise_volumes.is_none()
            && self.eq_gains_db.is_none()
            && self.rumble_intensity.is_none()
            && self.rumble_crossover_hz.is_none()
            && self.highpass_hz.is_none()
            && self.lowpass_hz.is_none()
    }

    /// Merge this delta onto a configuration, leaving `None` fields alone
    pub fn apply_to(&self, config: &mut MaskingConfig) {
        if let Some(volumes) = self.noise_volumes {
            config.noise_volumes = volumes;
        }
        if let Some(gains) = self.eq_gains_db {
            config.eq_gains_db = gains;
        }
        if let Some(intensity) = self.rumble_intensity {
            config.rumble_intensity = intensity;
        }
        if let Some(crossover) = self.rumble_crossover_hz {
            config.rumble_crossover_hz = crossover;
        }
        if let Some(highpass) = self.highpass_hz {
            config.highpass_hz = highpass;
        }
        if let Some(lowpass) = self.lowpass_hz {
            config.lowpass_hz = lowpass;
        }
    }
}

/// Mean magnitude per band of the 5-band split
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BandLevels {
    low: f32,
    mid_low: f32,
    mid: f32,
    mid_high: f32,
    high: f32,
}

fn band_levels(frame: &[u8], sample_rate: u32) -> BandLevels {
    let bin_count = frame.len();
    if bin_count == 0 {
        return BandLevels::default();
    }
    let hz_per_bin = (sample_rate as f32 / 2.0) / bin_count as f32;

    let mut sums = [0.0f32; 5];
    let mut counts = [0u32; 5];
    for (i, &mag) in frame.iter().enumerate() {
        let freq = i as f32 * hz_per_bin;
        let band = BAND_EDGES_HZ.iter().position(|&edge| freq < edge).unwrap_or(4);
        sums[band] += mag as f32;
        counts[band] += 1;
    }

    let mean = |band: usize| {
        if counts[band] > 0 {
            sums[band] / counts[band] as f32
        } else {
            0.0
        }
    };

    BandLevels {
        low: mean(0),
        mid_low: mean(1),
        mid: mean(2),
        mid_high: mean(3),
        high: mean(4),
    }
}

/// Map a band level onto a noise volume
///
/// Quiet bands get a small floor so the mask never fully drops out; above
/// the quiet level the volume grows linearly and saturates at 1.
fn normalize_level(level: f32) -> f32 {
    if level < QUIET_LEVEL {
        FLOOR_VOLUME
    } else {
        (0.2 + (level - QUIET_LEVEL) / 120.0).min(1.0)
    }
}

fn eq_gain_for_level(level: f32) -> f32 {
    if level > EQ_BASELINE {
        ((level - EQ_BASELINE) / 20.0).min(6.0)
    } else {
        ((level - EQ_BASELINE) / 30.0).max(-3.0)
    }
}

/// Emit `new` only when it actually differs from the current value
fn changed(new: f32, current: f32) -> Option<f32> {
    if (new - current).abs() > f32::EPSILON {
        Some(new)
    } else {
        None
    }
}

/// Maps observed noise characteristics onto masking-engine parameters
///
/// Stateless; the sample rate is injected at construction so every mode
/// shares one bin-to-frequency mapping.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveMaskingCalculator {
    sample_rate: u32,
}

impl AdaptiveMaskingCalculator {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Instantaneous mode: one magnitude frame to a parameter delta
    pub fn from_frame(&self, frame: &[u8], current: &MaskingConfig) -> MaskingDelta {
        let bands = band_levels(frame, self.sample_rate);
        self.delta_from_bands(bands, frame, current)
    }

    /// Learned mode: history aggregate through the instantaneous mapping
    ///
    /// An empty history yields an empty delta.
    pub fn from_history(&self, history: &SpectrumHistory, current: &MaskingConfig) -> MaskingDelta {
        match history.aggregate() {
            Some(representative) => self.from_frame(&representative, current),
            None => MaskingDelta::default(),
        }
    }

    /// Event-log mode: bias the mix toward the dominant disturbance band
    ///
    /// Events bucket by frequency-range midpoint into four coarse bands
    /// (< 300, 300-800, 800-2000, > 2000 Hz). The dominant band's fraction
    /// drives a color boost on top of the current mix, with a floor once a
    /// band clearly dominates (fraction > 0.5). Rumble rises with the
    /// low-band fraction.
    pub fn from_event_log(&self, log: &EventLog, current: &MaskingConfig) -> MaskingDelta {
        if log.is_empty() {
            return MaskingDelta::default();
        }

        let mut counts = [0usize; 4];
        for event in log.iter() {
            let mid = event.range.midpoint_hz();
            let bucket = if mid < 300.0 {
                0
            } else if mid < 800.0 {
                1
            } else if mid < 2000.0 {
                2
            } else {
                3
            };
            counts[bucket] += 1;
        }

        let total = log.len() as f32;
        let fractions = [
            counts[0] as f32 / total,
            counts[1] as f32 / total,
            counts[2] as f32 / total,
            counts[3] as f32 / total,
        ];
        let dominant = fractions
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let dominant_fraction = fractions[dominant];

        let mut volumes = current.noise_volumes;
        match dominant {
            0 => {
                volumes.set(
                    NoiseColor::Brown,
                    volumes.brown.max(0.2 + dominant_fraction * 0.6),
                );
                if dominant_fraction > 0.5 {
                    volumes.set(NoiseColor::Brown, volumes.brown.max(0.6));
                }
            }
            1 => {
                volumes.set(
                    NoiseColor::Pink,
                    volumes.pink.max(0.2 + dominant_fraction * 0.6),
                );
                if dominant_fraction > 0.5 {
                    volumes.set(NoiseColor::Pink, volumes.pink.max(0.5));
                }
            }
            2 => {
                volumes.set(
                    NoiseColor::White,
                    volumes.white.max(0.2 + dominant_fraction * 0.5),
                );
            }
            _ => {
                volumes.set(
                    NoiseColor::White,
                    volumes.white.max(0.2 + dominant_fraction * 0.4),
                );
                volumes.set(
                    NoiseColor::Blue,
                    volumes.blue.max(0.1 + dominant_fraction * 0.3),
                );
            }
        }

        let mut delta = MaskingDelta {
            noise_volumes: Some(volumes),
            ..MaskingDelta::default()
        };

        if fractions[0] > 0.0 {
            let boosted = (current.rumble_intensity + fractions[0] * 0.4).min(1.0);
            delta.rumble_intensity = changed(boosted, current.rumble_intensity);
        }

        delta
    }

    /// Single-event mode: immediate response to one classified disturbance
    ///
    /// The mix is reset to a low baseline and one primary color is raised
    /// by the event's center frequency; the event type adds its own floor
    /// (friction keeps pink up, footsteps keep brown up).
    pub fn from_event(&self, event: &NoiseEvent, current: &MaskingConfig) -> MaskingDelta {
        let mut volumes = NoiseColorMix::uniform(FLOOR_VOLUME);
        let mut delta = MaskingDelta::default();

        let center = event.range.midpoint_hz();
        if center < 300.0 {
            volumes.set(NoiseColor::Brown, 0.8);
            let boosted = (current.rumble_intensity + 0.3).min(1.0).max(0.4);
            delta.rumble_intensity = changed(boosted, current.rumble_intensity);
        } else if center < 1000.0 {
            volumes.set(NoiseColor::Pink, 0.7);
        } else {
            volumes.set(NoiseColor::White, 0.7);
        }

        match event.kind {
            NoiseEventKind::Friction => {
                volumes.set(NoiseColor::Pink, volumes.pink.max(0.5));
            }
            NoiseEventKind::Footstep => {
                volumes.set(NoiseColor::Brown, volumes.brown.max(0.6));
            }
            _ => {}
        }

        delta.noise_volumes = Some(volumes);
        delta
    }

    /// Shared band mapping for the instantaneous and learned modes
    fn delta_from_bands(
        &self,
        bands: BandLevels,
        frame: &[u8],
        current: &MaskingConfig,
    ) -> MaskingDelta {
        // Color mix. Pink carries a small leak of the low band so a purely
        // low-frequency environment still orders brown > pink > white.
        let volumes = NoiseColorMix {
            brown: normalize_level((bands.low + bands.mid_low) / 2.0),
            pink: normalize_level((bands.mid_low + bands.mid) / 2.0 + bands.low * 0.25),
            white: normalize_level((bands.mid_high + bands.high) / 2.0),
            blue: normalize_level(bands.high),
            violet: normalize_level(bands.high) * 0.5,
        };

        // EQ gains from per-band levels around each EQ center frequency
        let mut eq_gains_db = [0.0f32; EQ_BAND_COUNT];
        for (gain, &center) in eq_gains_db.iter_mut().zip(EQ_BAND_HZ.iter()) {
            let level = eq_band_level(frame, self.sample_rate, center);
            *gain = eq_gain_for_level(level);
        }

        let mut delta = MaskingDelta {
            noise_volumes: Some(volumes),
            eq_gains_db: Some(eq_gains_db),
            ..MaskingDelta::default()
        };

        // Rumble engages only on a genuinely loud low band
        if bands.low > RUMBLE_LEVEL {
            let intensity = (0.3 + (bands.low - RUMBLE_LEVEL) / 200.0).min(1.0);
            let crossover = if bands.low > 200.0 { 120.0 } else { 90.0 };
            delta.rumble_intensity = changed(intensity, current.rumble_intensity);
            delta.rumble_crossover_hz = changed(crossover, current.rumble_crossover_hz);
        }

        // Three-tier cutoff steps from the coarse band levels
        let highpass = if bands.low < 30.0 {
            80.0
        } else if bands.low < 80.0 {
            40.0
        } else {
            20.0
        };
        let lowpass = if bands.high > 120.0 {
            16000.0
        } else if bands.high > 60.0 {
            12000.0
        } else {
            8000.0
        };
        delta.highpass_hz = changed(highpass, current.highpass_hz);
        delta.lowpass_hz = changed(lowpass, current.lowpass_hz);

        delta
    }
}

/// Mean magnitude of the bins within half an octave of `center_hz`
fn eq_band_level(frame: &[u8], sample_rate: u32, center_hz: f32) -> f32 {
    let bin_count = frame.len();
    if bin_count == 0 {
        return 0.0;
    }
    let hz_per_bin = (sample_rate as f32 / 2.0) / bin_count as f32;
    let lo = center_hz / std::f32::consts::SQRT_2;
    let hi = center_hz * std::f32::consts::SQRT_2;

    let mut sum = 0.0f32;
    let mut count = 0u32;
    for (i, &mag) in frame.iter().enumerate() {
        let freq = i as f32 * hz_per_bin;
        if freq >= lo && freq < hi {
            sum += mag as f32;
            count += 1;
        }
    }

    if count > 0 {
        sum / count as f32
    } else {
        0.0
    }
}
