// SpectralAnalyzer - per-frame feature extraction from byte magnitude spectra
//
// The host delivers one magnitude-per-bin snapshot (0-255) per analysis frame.
// This module reduces each snapshot to a compact feature vector used by the
// event detectors and the adaptive masking calculator:
//
// 1. Total energy: sum of per-bin magnitudes
// 2. Band energies: low (< 300 Hz), mid (300-2000 Hz), high (> 2000 Hz)
// 3. Spectral flux: L1 distance to the previous frame's raw magnitudes
// 4. Spectral centroid: energy-weighted mean frequency (brightness measure)
// 5. Peak frequency: frequency of the maximum-magnitude bin
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Low band upper boundary in Hz (impact / rumble energy lives below this)
pub const LOW_BAND_HZ: f32 = 300.0;

/// Mid band upper boundary in Hz
pub const MID_BAND_HZ: f32 = 2000.0;

/// Features extracted from one magnitude frame
///
/// All energies are in raw byte-magnitude units (each bin contributes 0-255).
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct SpectralFeatures {
    /// Sum of all per-bin magnitudes
    pub total_energy: f32,
    /// Energy below 300 Hz
    pub low_energy: f32,
    /// Energy between 300 Hz and 2000 Hz
    pub mid_energy: f32,
    /// Energy above 2000 Hz
    pub high_energy: f32,
    /// L1 distance to the previous frame (0.0 on the first frame)
    pub flux: f32,
    /// Energy-weighted mean frequency in Hz (0.0 for a silent frame)
    pub centroid_hz: f32,
    /// Frequency of the loudest bin in Hz (0.0 for a silent frame)
    pub peak_hz: f32,
}

/// Stateful analyzer reducing magnitude frames to [`SpectralFeatures`]
///
/// Owns a private copy of the previous frame for the flux computation.
/// The history is overwritten on every call and cleared by [`reset`],
/// which callers should invoke on silence gaps or stream restarts.
///
/// [`reset`]: SpectralAnalyzer::reset
#[derive(Debug, Default)]
pub struct SpectralAnalyzer {
    prev_frame: Vec<u8>,
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze one magnitude frame
    ///
    /// Bin index maps to frequency as `i * (sample_rate / 2) / bin_count`.
    /// Degenerate input (all-zero frame) yields all-zero features; the
    /// centroid's division by total energy is guarded to 0.
    ///
    /// # Arguments
    /// * `frame` - Per-bin magnitudes (0-255), one value per frequency bin
    /// * `sample_rate` - Sample rate of the originating audio stream in Hz
    pub fn analyze(&mut self, frame: &[u8], sample_rate: u32) -> SpectralFeatures {
        let bin_count = frame.len();
        if bin_count == 0 {
            self.prev_frame.clear();
            return SpectralFeatures::default();
        }

        let hz_per_bin = (sample_rate as f32 / 2.0) / bin_count as f32;

        let mut total_energy = 0.0f32;
        let mut weighted_index_sum = 0.0f32;
        let mut low_energy = 0.0f32;
        let mut mid_energy = 0.0f32;
        let mut high_energy = 0.0f32;
        let mut peak_mag = 0u8;
        let mut peak_index = 0usize;

        for (i, &mag) in frame.iter().enumerate() {
            let mag_f = mag as f32;
            total_energy += mag_f;
            weighted_index_sum += i as f32 * mag_f;

            let freq = i as f32 * hz_per_bin;
            if freq < LOW_BAND_HZ {
                low_energy += mag_f;
            } else if freq < MID_BAND_HZ {
                mid_energy += mag_f;
            } else {
                high_energy += mag_f;
            }

            if mag > peak_mag {
                peak_mag = mag;
                peak_index = i;
            }
        }

        let flux = if self.prev_frame.len() == bin_count {
            frame
                .iter()
                .zip(self.prev_frame.iter())
                .map(|(&curr, &prev)| (curr as f32 - prev as f32).abs())
                .sum()
        } else {
            0.0
        };

        // Keep a copy of the raw frame for the next call's flux
        self.prev_frame.clear();
        self.prev_frame.extend_from_slice(frame);

        let centroid_hz = if total_energy > 0.0 {
            (weighted_index_sum / total_energy) * hz_per_bin
        } else {
            0.0
        };

        let peak_hz = if peak_mag > 0 {
            peak_index as f32 * hz_per_bin
        } else {
            0.0
        };

        SpectralFeatures {
            total_energy,
            low_energy,
            mid_energy,
            high_energy,
            flux,
            centroid_hz,
            peak_hz,
        }
    }

    /// Clear the flux history (next frame reports flux = 0)
    pub fn reset(&mut self) {
        self.prev_frame.clear();
    }
}
