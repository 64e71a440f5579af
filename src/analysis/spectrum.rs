// SpectrumProcessor - byte magnitude frames from time-domain audio
//
// The detection pipeline consumes 0-255 magnitude-per-bin frames, the format
// the deployed host's analyser hands over. For offline analysis and tests
// this module produces equivalent frames from raw audio: Hann-windowed FFT,
// per-bin amplitude smoothing across frames, then a decibel mapping onto the
// byte range.

use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::{Arc, Mutex};

/// Default FFT window size (bin count = fft_size / 2)
pub const DEFAULT_FFT_SIZE: usize = 1024;

/// Decibel value mapped to byte 0
const MIN_DB: f32 = -100.0;

/// Decibel value mapped to byte 255
const MAX_DB: f32 = -30.0;

/// Per-bin temporal smoothing factor (fraction of the previous frame kept)
const SMOOTHING: f32 = 0.8;

/// Converts audio windows into smoothed byte magnitude frames
pub struct SpectrumProcessor {
    fft_planner: Arc<Mutex<FftPlanner<f32>>>,
    fft_size: usize,
    /// Hann window (pre-computed)
    window: Vec<f32>,
    /// Smoothed linear magnitudes carried across frames
    smoothed: Vec<f32>,
}

impl SpectrumProcessor {
    pub fn new(fft_size: usize) -> Self {
        // Pre-compute Hann window to reduce spectral leakage
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (fft_size as f32 - 1.0)).cos())
            })
            .collect();

        Self {
            fft_planner: Arc::new(Mutex::new(FftPlanner::new())),
            fft_size,
            window,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Number of bins in each produced frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Produce one byte magnitude frame from an audio window
    ///
    /// Input shorter than the FFT size is zero-padded; extra samples are
    /// ignored. Smoothing state carries across calls until [`reset`].
    ///
    /// [`reset`]: SpectrumProcessor::reset
    pub fn process(&mut self, audio: &[f32]) -> Vec<u8> {
        let mut buffer: Vec<Complex<f32>> = Vec::with_capacity(self.fft_size);
        for (i, &sample) in audio.iter().take(self.fft_size).enumerate() {
            buffer.push(Complex::new(sample * self.window[i], 0.0));
        }
        while buffer.len() < self.fft_size {
            buffer.push(Complex::new(0.0, 0.0));
        }

        let mut planner = self.fft_planner.lock().expect("fft planner poisoned");
        let fft = planner.plan_fft_forward(self.fft_size);
        fft.process(&mut buffer);
        drop(planner);

        let scale = 2.0 / self.fft_size as f32;
        let mut frame = Vec::with_capacity(self.bin_count());
        for (bin, value) in buffer[..self.bin_count()].iter().enumerate() {
            let magnitude = value.norm() * scale;
            let smoothed = SMOOTHING * self.smoothed[bin] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[bin] = smoothed;

            let db = if smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                MIN_DB
            };
            let normalized = ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0);
            frame.push((normalized * 255.0).round() as u8);
        }

        frame
    }

    /// Clear the smoothing state
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate pure sine wave for testing
    fn generate_sine_wave(sample_rate: u32, frequency: f32, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_frame_has_half_fft_size_bins() {
        let mut processor = SpectrumProcessor::new(DEFAULT_FFT_SIZE);
        let frame = processor.process(&vec![0.0; DEFAULT_FFT_SIZE]);
        assert_eq!(frame.len(), DEFAULT_FFT_SIZE / 2);
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let sample_rate = 48000u32;
        let mut processor = SpectrumProcessor::new(DEFAULT_FFT_SIZE);
        let sine = generate_sine_wave(sample_rate, 1000.0, DEFAULT_FFT_SIZE);

        // Run several frames so the smoothing settles
        let mut frame = Vec::new();
        for _ in 0..10 {
            frame = processor.process(&sine);
        }

        let peak_bin = frame
            .iter()
            .enumerate()
            .max_by_key(|(_, &mag)| mag)
            .map(|(i, _)| i)
            .unwrap();
        let hz_per_bin = sample_rate as f32 / DEFAULT_FFT_SIZE as f32;
        let peak_hz = peak_bin as f32 * hz_per_bin;

        assert!(
            (peak_hz - 1000.0).abs() < 2.0 * hz_per_bin,
            "peak at {peak_hz} Hz, expected near 1000 Hz"
        );
    }

    #[test]
    fn test_silence_maps_to_zero_bytes() {
        let mut processor = SpectrumProcessor::new(DEFAULT_FFT_SIZE);
        let frame = processor.process(&vec![0.0; DEFAULT_FFT_SIZE]);
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reset_drops_smoothed_history() {
        let sample_rate = 48000u32;
        let mut processor = SpectrumProcessor::new(DEFAULT_FFT_SIZE);
        let sine = generate_sine_wave(sample_rate, 1000.0, DEFAULT_FFT_SIZE);

        for _ in 0..10 {
            processor.process(&sine);
        }
        processor.reset();

        let frame = processor.process(&vec![0.0; DEFAULT_FFT_SIZE]);
        assert!(
            frame.iter().all(|&b| b == 0),
            "smoothing must not leak past reset"
        );
    }
}
