// SpectrumHistory - learned-mode sample buffer
//
// Holds up to one minute of magnitude frames sampled at 100 ms spacing.
// The interval is enforced here rather than trusted from the caller's
// cadence: frames arriving early are ignored. Oldest frames are evicted
// once the capacity is reached.

use std::collections::VecDeque;

/// Maximum retained frames (600 x 100 ms = 1 minute)
pub const MAX_FRAMES: usize = 600;

/// Minimum spacing between accepted frames
pub const MIN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Default)]
pub struct SpectrumHistory {
    frames: VecDeque<Vec<u8>>,
    last_accepted_ms: Option<u64>,
}

impl SpectrumHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a frame; returns whether it was accepted
    ///
    /// Rejected when less than [`MIN_INTERVAL_MS`] has elapsed since the
    /// last accepted frame.
    pub fn record(&mut self, frame: &[u8], timestamp_ms: u64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if timestamp_ms.saturating_sub(last) < MIN_INTERVAL_MS {
                return false;
            }
        }

        if self.frames.len() == MAX_FRAMES {
            self.frames.pop_front();
        }
        self.frames.push_back(frame.to_vec());
        self.last_accepted_ms = Some(timestamp_ms);
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.last_accepted_ms = None;
    }

    /// Collapse the history into one representative frame
    ///
    /// Per bin: `0.7 * max + 0.3 * median`. The max term favors the
    /// transient peaks a masking signal has to cover; the median term damps
    /// one-off outliers. Returns `None` on an empty history.
    pub fn aggregate(&self) -> Option<Vec<u8>> {
        let first = self.frames.front()?;
        let bin_count = first.len();

        let mut representative = Vec::with_capacity(bin_count);
        let mut values = Vec::with_capacity(self.frames.len());
        for bin in 0..bin_count {
            values.clear();
            for frame in &self.frames {
                values.push(frame.get(bin).copied().unwrap_or(0));
            }
            values.sort_unstable();

            let max = *values.last().unwrap_or(&0) as f32;
            let median = if values.len() % 2 == 0 {
                let mid = values.len() / 2;
                (values[mid - 1] as f32 + values[mid] as f32) / 2.0
            } else {
                values[values.len() / 2] as f32
            };

            representative.push((0.7 * max + 0.3 * median).round().clamp(0.0, 255.0) as u8);
        }

        Some(representative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_enforced() {
        let mut history = SpectrumHistory::new();
        assert!(history.record(&[1, 2, 3], 0));
        assert!(!history.record(&[1, 2, 3], 50), "50 ms gap must be rejected");
        assert!(history.record(&[1, 2, 3], 100));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = SpectrumHistory::new();
        for i in 0..(MAX_FRAMES + 10) {
            history.record(&[i as u8], i as u64 * MIN_INTERVAL_MS);
        }
        assert_eq!(history.len(), MAX_FRAMES);
    }

    #[test]
    fn test_aggregate_blends_max_and_median() {
        let mut history = SpectrumHistory::new();
        // Bin 0 values: 10, 10, 100 -> median 10, max 100
        history.record(&[10], 0);
        history.record(&[10], 100);
        history.record(&[100], 200);

        let representative = history.aggregate().unwrap();
        let expected = (0.7 * 100.0 + 0.3 * 10.0_f32).round() as u8;
        assert_eq!(representative[0], expected);
    }

    #[test]
    fn test_empty_history_aggregates_to_none() {
        let history = SpectrumHistory::new();
        assert!(history.aggregate().is_none());
    }

    #[test]
    fn test_clear_resets_interval_gate() {
        let mut history = SpectrumHistory::new();
        history.record(&[1], 1000);
        history.clear();
        assert!(history.is_empty());
        assert!(history.record(&[1], 1001), "cleared history accepts immediately");
    }
}
