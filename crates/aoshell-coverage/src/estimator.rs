//! Reduction of an ordered crossing sequence to the visible length of a
//! sampling window.
//!
//! Crossings off the traced segment `[0, window.end]` are dropped, the rest
//! are paired in emission order into occluded intervals, and the union of
//! those intervals is subtracted from the window. The hot-path entry points
//! never fail: every abnormal input is recovered with a numeric fallback and
//! recorded in the sample's flags.

use aoshell_core::constants::INLINE_INTERVALS;
use aoshell_core::math::covered_length;
use aoshell_core::{Crossing, CoverageError, OccludedInterval, PackedCrossing, PackedWindow, SamplingWindow};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::buffers::CrossingBuffer;
use crate::sample::{CoverageSample, SampleFlags};
use crate::stats::CoverageStats;

/// Estimator settings, loaded from RON alongside the kernel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Maximum crossings processed per sample. Longer sequences are truncated
    /// to their first `n` emitted crossings and flagged approximate.
    /// `None` processes every crossing.
    #[serde(default)]
    pub max_crossings: Option<u32>,
}

/// Stateless visible-length estimator. Cheap to copy into worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageEstimator {
    config: EstimatorConfig,
}

/// Visible length of `window` given `crossings` in emission order, with
/// every crossing processed.
pub fn compute(crossings: &[Crossing], window: SamplingWindow) -> f32 {
    CoverageEstimator::default().evaluate(crossings, window).visible
}

struct Reduction {
    sample: CoverageSample,
    first_error: Option<CoverageError>,
}

impl CoverageEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn capacity(&self) -> Option<usize> {
        self.config.max_crossings.map(|n| n as usize)
    }

    /// Evaluate one sample. Never fails.
    pub fn evaluate(&self, crossings: &[Crossing], window: SamplingWindow) -> CoverageSample {
        self.reduce(
            crossings.iter().copied().map(Some),
            crossings.len(),
            self.capacity(),
            window,
        )
        .sample
    }

    /// Evaluate one sample, surfacing the first abnormal condition as an error.
    ///
    /// Discarded off-ray crossings are part of normal operation and are not
    /// reported here.
    pub fn evaluate_strict(
        &self,
        crossings: &[Crossing],
        window: SamplingWindow,
    ) -> Result<CoverageSample, CoverageError> {
        let reduction = self.reduce(
            crossings.iter().copied().map(Some),
            crossings.len(),
            self.capacity(),
            window,
        );
        match reduction.first_error {
            Some(err) => Err(err),
            None => Ok(reduction.sample),
        }
    }

    /// Evaluate one sample from its GPU layout. Crossings with an unknown
    /// kind tag are discarded.
    pub fn evaluate_packed(&self, crossings: &[PackedCrossing], window: PackedWindow) -> CoverageSample {
        self.reduce(
            crossings.iter().map(|c| c.unpack()),
            crossings.len(),
            self.capacity(),
            window.into(),
        )
        .sample
    }

    /// Evaluate every slot of a crossing buffer and aggregate frame stats.
    ///
    /// A slot whose emitted count exceeded the buffer stride (or this
    /// estimator's own bound, whichever is smaller) is flagged approximate.
    pub fn evaluate_buffer(&self, buffer: &CrossingBuffer) -> (Vec<CoverageSample>, CoverageStats) {
        let stride = buffer.stride();
        let capacity = Some(self.capacity().map_or(stride, |cap| cap.min(stride)));

        let mut samples = Vec::with_capacity(buffer.sample_count());
        let mut stats = CoverageStats::default();
        for index in 0..buffer.sample_count() {
            let slot = buffer.crossings(index);
            let sample = self
                .reduce(
                    slot.iter().map(|c| c.unpack()),
                    buffer.emitted_count(index),
                    capacity,
                    buffer.window(index),
                )
                .sample;
            stats.record(&sample);
            samples.push(sample);
        }
        (samples, stats)
    }

    fn reduce<I>(
        &self,
        crossings: I,
        emitted: usize,
        capacity: Option<usize>,
        window: SamplingWindow,
    ) -> Reduction
    where
        I: Iterator<Item = Option<Crossing>>,
    {
        if !window.is_valid() {
            return Reduction {
                sample: CoverageSample::invalid(),
                first_error: Some(CoverageError::InvalidWindow {
                    start: window.start,
                    end: window.end,
                }),
            };
        }

        let ray_length = window.ray_length();
        let mut flags = SampleFlags::empty();
        let mut first_error = None;

        let limit = match capacity {
            Some(cap) if emitted > cap => {
                flags.insert(SampleFlags::APPROXIMATE);
                first_error = Some(CoverageError::Overflow {
                    count: emitted,
                    capacity: cap,
                });
                cap
            }
            _ => usize::MAX,
        };

        // Unmatched fronts form a stack: a back face closes the most recent one.
        let mut open: SmallVec<[f32; INLINE_INTERVALS]> = SmallVec::new();
        let mut intervals: SmallVec<[OccludedInterval; INLINE_INTERVALS]> = SmallVec::new();

        for (index, crossing) in crossings.take(limit).enumerate() {
            let crossing = match crossing {
                Some(c) if c.is_on_ray(ray_length) => c,
                _ => {
                    flags.insert(SampleFlags::DISCARDED);
                    continue;
                }
            };

            match crossing {
                Crossing::Front(position) => open.push(position),
                Crossing::Back(position) => match open.pop() {
                    Some(front) => {
                        intervals.push(OccludedInterval::from_pair(front, position, ray_length))
                    }
                    None => {
                        flags.insert(SampleFlags::ORPHAN_BACK);
                        if first_error.is_none() {
                            first_error = Some(CoverageError::MalformedCrossingSequence {
                                index,
                                position,
                            });
                        }
                    }
                },
            }
        }

        // Unterminated fronts are opaque to the end of the ray.
        intervals.extend(
            open.drain(..)
                .map(|front| OccludedInterval::to_ray_end(front, ray_length)),
        );

        let window_length = window.length();
        let occluded = covered_length(&mut intervals, &window);
        let visible = (window_length - occluded).clamp(0.0, window_length);

        Reduction {
            sample: CoverageSample {
                visible,
                window_length,
                flags,
            },
            first_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use aoshell_core::Crossing::{Back, Front};

    const TOL: f32 = 1e-5;

    fn ray(ray_length: f32, radius: f32) -> SamplingWindow {
        SamplingWindow::from_ray(ray_length, radius)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < TOL,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty() {
        assert_close(compute(&[], ray(4.0, 2.0)), 2.0);
    }

    #[test]
    fn test_occluder_inside_full_window() {
        assert_close(compute(&[Front(1.0), Back(3.0)], ray(4.0, 4.0)), 2.0);
    }

    #[test]
    fn test_occluder_partially_inside() {
        assert_close(compute(&[Front(1.0), Back(3.0)], ray(4.0, 2.0)), 1.0);
    }

    #[test]
    fn test_occluder_outside_window() {
        assert_close(compute(&[Front(1.0), Back(1.5)], ray(4.0, 2.0)), 2.0);
    }

    #[test]
    fn test_back_beyond_ray_is_clipped() {
        assert_close(compute(&[Front(3.5), Back(5.0)], ray(4.0, 2.0)), 1.5);
    }

    #[test]
    fn test_occluder_swallows_window() {
        assert_close(compute(&[Front(1.0), Back(5.0)], ray(4.0, 2.0)), 0.0);
    }

    #[test]
    fn test_two_disjoint_occluders() {
        let c = [Front(2.0), Back(3.0), Front(3.5), Back(4.0)];
        assert_close(compute(&c, ray(5.0, 4.0)), 2.5);
    }

    #[test]
    fn test_two_overlapping_occluders() {
        let c = [Front(2.0), Back(3.5), Front(3.0), Back(4.0)];
        assert_close(compute(&c, ray(5.0, 4.0)), 2.0);
    }

    #[test]
    fn test_nested_occluders() {
        let c = [Front(1.0), Back(4.0), Front(1.5), Back(3.5)];
        assert_close(compute(&c, ray(5.0, 2.0)), 1.0);
    }

    #[test]
    fn test_nested_emission_order() {
        // Entering a solid inside another solid before leaving either
        let c = [Front(1.0), Front(2.0), Back(3.0), Back(4.5)];
        assert_close(compute(&c, ray(5.0, 4.0)), 0.5);
    }

    #[test]
    fn test_unterminated_front_runs_to_ray_end() {
        assert_close(compute(&[Front(3.0)], ray(4.0, 2.0)), 1.0);
    }

    #[test]
    fn test_window_explicit_span() {
        let c = [Front(1.0), Back(3.0)];
        assert_close(compute(&c, SamplingWindow::new(2.0, 4.0)), 1.0);
    }

    #[test]
    fn test_radius_longer_than_ray() {
        // The part of the window before the ray origin can never be occluded
        let c = [Front(0.0), Back(4.0)];
        let sample = CoverageEstimator::default().evaluate(&c, ray(4.0, 5.0));
        assert_close(sample.window_length, 5.0);
        assert_close(sample.visible, 1.0);
    }

    #[test]
    fn test_window_ending_before_origin() {
        // Crossings at the origin are within tolerance of a ray ending just short of it
        let window = SamplingWindow::new(-2.0, -5e-7);
        let estimator = CoverageEstimator::default();

        let unterminated = estimator.evaluate(&[Front(0.0)], window);
        assert_close(unterminated.visible, window.length());

        let pair = estimator.evaluate(&[Front(0.0), Back(0.0)], window);
        assert_close(pair.visible, window.length());
        assert!(!pair.flags.contains(SampleFlags::INVALID_WINDOW));

        assert_close(compute(&[Front(0.0)], window), window.length());
    }

    #[test]
    fn test_invalid_window_returns_zero() {
        let estimator = CoverageEstimator::default();
        let sample = estimator.evaluate(&[Front(1.0)], SamplingWindow::new(3.0, 3.0));
        assert_eq!(sample.visible, 0.0);
        assert!(sample.flags.contains(SampleFlags::INVALID_WINDOW));

        let err = estimator
            .evaluate_strict(&[], SamplingWindow::new(4.0, 2.0))
            .unwrap_err();
        assert_eq!(err, CoverageError::InvalidWindow { start: 4.0, end: 2.0 });
    }

    #[test]
    fn test_orphan_back_ignored() {
        let estimator = CoverageEstimator::default();
        let c = [Back(2.5), Front(3.0), Back(3.5)];
        let sample = estimator.evaluate(&c, ray(4.0, 2.0));
        assert_close(sample.visible, 1.5);
        assert!(sample.flags.contains(SampleFlags::ORPHAN_BACK));

        match estimator.evaluate_strict(&c, ray(4.0, 2.0)) {
            Err(CoverageError::MalformedCrossingSequence { index, position }) => {
                assert_eq!(index, 0);
                assert_eq!(position, 2.5);
            }
            other => panic!("expected MalformedCrossingSequence, got {other:?}"),
        }
    }

    #[test]
    fn test_off_ray_crossings_discarded() {
        let estimator = CoverageEstimator::default();
        let c = [Front(-1.0), Front(3.0), Back(4.5), Back(f32::NAN)];
        let sample = estimator.evaluate(&c, ray(4.0, 2.0));
        assert_close(sample.visible, 1.0);
        assert!(sample.flags.contains(SampleFlags::DISCARDED));
        // Discarding is normal operation, not an error
        assert!(estimator.evaluate_strict(&c, ray(4.0, 2.0)).is_ok());
    }

    #[test]
    fn test_overflow_truncates_and_flags() {
        let estimator = CoverageEstimator::new(EstimatorConfig {
            max_crossings: Some(2),
        });
        let c = [Front(2.0), Back(2.5), Front(3.0), Back(3.5)];
        let sample = estimator.evaluate(&c, ray(4.0, 2.0));
        assert_close(sample.visible, 1.5);
        assert!(sample.is_approximate());

        assert_eq!(
            estimator.evaluate_strict(&c, ray(4.0, 2.0)).unwrap_err(),
            CoverageError::Overflow {
                count: 4,
                capacity: 2
            }
        );
    }

    #[test]
    fn test_within_capacity_is_exact() {
        let estimator = CoverageEstimator::new(EstimatorConfig {
            max_crossings: Some(4),
        });
        let c = [Front(2.0), Back(2.5), Front(3.0), Back(3.5)];
        let sample = estimator.evaluate(&c, ray(4.0, 2.0));
        assert_close(sample.visible, 1.0);
        assert!(sample.flags.is_empty());
    }

    #[test]
    fn test_packed_matches_unpacked() {
        let estimator = CoverageEstimator::default();
        let c = [Front(2.0), Back(3.5), Front(3.0), Back(4.0)];
        let packed: Vec<PackedCrossing> = c.iter().copied().map(PackedCrossing::from).collect();
        let window = ray(5.0, 4.0);
        let a = estimator.evaluate(&c, window);
        let b = estimator.evaluate_packed(&packed, window.into());
        assert_eq!(a, b);
    }

    #[test]
    fn test_packed_unknown_kind_discarded() {
        let estimator = CoverageEstimator::default();
        let packed = [
            PackedCrossing::from(Front(3.0)),
            PackedCrossing {
                position: 3.2,
                kind: 9,
            },
        ];
        let sample = estimator.evaluate_packed(&packed, ray(4.0, 2.0).into());
        assert_close(sample.visible, 1.0);
        assert!(sample.flags.contains(SampleFlags::DISCARDED));
    }

    fn random_sequence(rng: &mut ChaCha8Rng, ray_length: f32) -> Vec<Crossing> {
        let count = rng.random_range(0..12usize);
        (0..count)
            .map(|_| {
                let pos = rng.random_range(-1.0f32..ray_length + 1.0);
                if rng.random_bool(0.5) {
                    Front(pos)
                } else {
                    Back(pos)
                }
            })
            .collect()
    }

    fn random_window(rng: &mut ChaCha8Rng) -> SamplingWindow {
        let ray_length = rng.random_range(0.5f32..8.0);
        let radius = rng.random_range(0.1f32..ray_length);
        ray(ray_length, radius)
    }

    #[test]
    fn test_property_result_within_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for case in 0..2000 {
            let window = random_window(&mut rng);
            let c = random_sequence(&mut rng, window.end);
            let v = compute(&c, window);
            assert!(
                v >= 0.0 && v <= window.length() + TOL,
                "case {case}: {v} outside [0, {}] for {c:?}",
                window.length()
            );
        }
    }

    #[test]
    fn test_property_empty_is_full_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let window = random_window(&mut rng);
            assert_close(compute(&[], window), window.length());
        }
    }

    #[test]
    fn test_property_adding_occluder_never_increases() {
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        for case in 0..2000 {
            let window = random_window(&mut rng);
            let mut c = random_sequence(&mut rng, window.end);
            let before = compute(&c, window);

            let a = rng.random_range(0.0f32..window.end);
            let b = rng.random_range(0.0f32..window.end);
            c.push(Front(a));
            c.push(Back(b));
            let after = compute(&c, window);

            assert!(
                after <= before + TOL,
                "case {case}: {before} -> {after} after adding [{a}, {b}]"
            );
        }
    }

    #[test]
    fn test_property_disjoint_occluders_sum() {
        let mut rng = ChaCha8Rng::seed_from_u64(41);
        for case in 0..1000 {
            let window = random_window(&mut rng);
            let ray_length = window.end;

            // Sorted cut points give pairwise disjoint intervals
            let n = rng.random_range(1..5usize);
            let mut cuts: Vec<f32> = (0..2 * n)
                .map(|_| rng.random_range(0.0f32..ray_length))
                .collect();
            cuts.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let mut c = Vec::new();
            let mut expected_occluded = 0.0f32;
            for pair in cuts.chunks(2) {
                c.push(Front(pair[0]));
                c.push(Back(pair[1]));
                let lo = pair[0].max(window.start);
                let hi = pair[1].min(window.end);
                expected_occluded += (hi - lo).max(0.0);
            }

            let sample = CoverageEstimator::default().evaluate(&c, window);
            assert!(
                (sample.occluded() - expected_occluded).abs() < 1e-4,
                "case {case}: occluded {} expected {expected_occluded}",
                sample.occluded()
            );
        }
    }
}
