use std::time::Instant;

use aoshell_coverage::{CoverageEstimator, CoverageStats};
use aoshell_kernel::KernelSample;

use crate::scenes::{generate_frame, SceneConfig};

/// Frame-time distribution of one scene, in milliseconds.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl TimingSeries {
    /// Summarise frame times. Percentiles use the nearest-rank method; an
    /// empty series is all zeros.
    pub fn from_frame_times(frame_ms: &[f64]) -> Self {
        let mut sorted = frame_ms.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (Some(&min_ms), Some(&max_ms)) = (sorted.first(), sorted.last()) else {
            return Self::default();
        };

        let n = sorted.len();
        let median_ms = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Self {
            mean_ms: sorted.iter().sum::<f64>() / n as f64,
            median_ms,
            p95_ms: nearest_rank(&sorted, 0.95),
            p99_ms: nearest_rank(&sorted, 0.99),
            min_ms,
            max_ms,
        }
    }
}

fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub samples: u32,
    pub crossings_per_sample: u32,
    pub frame_count: u32,
    pub stats: CoverageStats,
    pub timings: TimingSeries,
}

/// Times batch evaluation of synthetic crossing buffers on the CPU.
pub struct BenchmarkRunner {
    estimator: CoverageEstimator,
    kernel: Vec<KernelSample>,
    stride: u32,
    samples: usize,
    frame_count: u32,
}

impl BenchmarkRunner {
    pub fn new(
        estimator: CoverageEstimator,
        kernel: Vec<KernelSample>,
        stride: u32,
        samples: usize,
        frame_count: u32,
    ) -> Self {
        Self {
            estimator,
            kernel,
            stride,
            samples,
            frame_count,
        }
    }

    /// Run a single benchmark scene and return timing results.
    ///
    /// Frame generation is not timed; only `evaluate_buffer` is.
    pub fn run_scene(&self, config: &SceneConfig) -> BenchmarkResult {
        log::info!(
            "Running scene '{}' ({} samples, {} crossings each)...",
            config.name,
            self.samples,
            config.emitted_per_sample()
        );

        let mut frame_times = Vec::with_capacity(self.frame_count as usize);
        let mut stats = CoverageStats::default();

        for frame in 0..self.frame_count {
            let buffer = generate_frame(config, &self.kernel, self.samples, frame, self.stride);

            let frame_start = Instant::now();
            let (samples, frame_stats) = self.estimator.evaluate_buffer(&buffer);
            let elapsed = frame_start.elapsed().as_secs_f64() * 1000.0;

            debug_assert_eq!(samples.len(), buffer.sample_count());
            stats.merge(&frame_stats);
            frame_times.push(elapsed);
        }

        stats.log_summary(config.name);

        let timings = TimingSeries::from_frame_times(&frame_times);
        log::info!(
            "  Done: mean={:.3}ms, p95={:.3}ms, p99={:.3}ms, visibility={:.3}",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms,
            stats.mean_visibility()
        );

        BenchmarkResult {
            scene_name: config.name.to_string(),
            samples: self.samples as u32,
            crossings_per_sample: config.emitted_per_sample(),
            frame_count: self.frame_count,
            stats,
            timings,
        }
    }
}
