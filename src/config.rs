//! Configuration management for dynamic parameter tuning
//!
//! Runtime configuration loading from JSON files, enabling threshold and
//! pipeline tuning without recompilation. Missing or malformed files fall
//! back to defaults with a warning; loading never fails.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::DetectionConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub analyser: AnalyserConfig,
    pub pipeline: PipelineConfig,
}

/// Spectrum front-end parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size in samples (bin count = half of this)
    pub fft_size: usize,
    /// Sample rate the magnitude frames describe, in Hz
    pub sample_rate: u32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            sample_rate: 48000,
        }
    }
}

/// Pipeline bookkeeping parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of the bounded recent-event log
    pub event_log_capacity: usize,
    /// Nominal frame period driven by the host, in milliseconds
    pub frame_period_ms: u64,
    /// Buffer size of the broadcast channel carrying arbitrated events
    pub event_channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: 50,
            frame_period_ms: 16,
            event_channel_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// Returns defaults (with a warning) if the file is missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.analyser.fft_size, 1024);
        assert_eq!(config.pipeline.event_log_capacity, 50);
        assert_eq!(config.detection.footstep.sensitivity, 1.0);
        assert!(config.detection.friction.base_threshold.is_none());
    }

    #[test]
    fn test_partial_json_fills_missing_sections() {
        let json = r#"{
            "detection": {
                "footstep": { "base_threshold": 500.0, "sensitivity": 1.5 }
            }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detection.footstep.base_threshold, Some(500.0));
        assert_eq!(config.detection.footstep.sensitivity, 1.5);
        // Untouched sections keep defaults
        assert_eq!(config.detection.generic.sensitivity, 1.0);
        assert_eq!(config.analyser.sample_rate, 48000);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/soundmask.json");
        assert_eq!(config.pipeline.frame_period_ms, 16);
    }
}
