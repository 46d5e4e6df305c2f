use serde::{Deserialize, Serialize};

use crate::sample::{CoverageSample, SampleFlags};

/// Frame-level diagnostic counters.
///
/// The per-sample path only sets flags; callers fold samples into one of
/// these per frame (or per worker, then `merge`) and log once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub samples: u64,
    pub invalid_windows: u64,
    /// Samples with at least one ignored orphan back face.
    pub orphan_backs: u64,
    /// Samples with at least one discarded crossing.
    pub discarded: u64,
    /// Samples whose crossing list was truncated.
    pub approximate: u64,
    pub visibility_sum: f64,
}

impl CoverageStats {
    pub fn record(&mut self, sample: &CoverageSample) {
        self.samples += 1;
        if sample.flags.contains(SampleFlags::INVALID_WINDOW) {
            self.invalid_windows += 1;
        }
        if sample.flags.contains(SampleFlags::ORPHAN_BACK) {
            self.orphan_backs += 1;
        }
        if sample.flags.contains(SampleFlags::DISCARDED) {
            self.discarded += 1;
        }
        if sample.flags.contains(SampleFlags::APPROXIMATE) {
            self.approximate += 1;
        }
        self.visibility_sum += sample.visibility() as f64;
    }

    pub fn merge(&mut self, other: &CoverageStats) {
        self.samples += other.samples;
        self.invalid_windows += other.invalid_windows;
        self.orphan_backs += other.orphan_backs;
        self.discarded += other.discarded;
        self.approximate += other.approximate;
        self.visibility_sum += other.visibility_sum;
    }

    /// Mean visible fraction over all recorded samples (1.0 when empty).
    pub fn mean_visibility(&self) -> f64 {
        if self.samples == 0 {
            1.0
        } else {
            self.visibility_sum / self.samples as f64
        }
    }

    /// Whether any sample hit a condition worth reporting. Discarded
    /// crossings are expected and do not count.
    pub fn has_diagnostics(&self) -> bool {
        self.invalid_windows > 0 || self.orphan_backs > 0 || self.approximate > 0
    }

    /// Emit one summary line for the frame.
    pub fn log_summary(&self, label: &str) {
        if self.has_diagnostics() {
            log::warn!(
                "{label}: {} samples, {} invalid windows, {} with orphan back faces, {} approximate",
                self.samples,
                self.invalid_windows,
                self.orphan_backs,
                self.approximate
            );
        } else {
            log::debug!(
                "{label}: {} samples, mean visibility {:.3}, {} with discarded crossings",
                self.samples,
                self.mean_visibility(),
                self.discarded
            );
        }
    }
}
