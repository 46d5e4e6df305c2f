use std::cmp::Ordering;

use crate::constants::COVERAGE_EPSILON;
use crate::types::{OccludedInterval, SamplingWindow};

/// Total length of `window` covered by the union of `intervals`.
///
/// Sorts `intervals` in place by start, then sweeps once, merging intervals
/// that overlap or touch (within `COVERAGE_EPSILON`) so that overlap is never
/// counted twice. Each merged run is intersected with the window before its
/// length is added.
pub fn covered_length(intervals: &mut [OccludedInterval], window: &SamplingWindow) -> f32 {
    if intervals.is_empty() {
        return 0.0;
    }

    intervals.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let mut total = 0.0f32;
    let mut current = intervals[0];
    for next in &intervals[1..] {
        if next.start <= current.end + COVERAGE_EPSILON {
            current.end = current.end.max(next.end);
        } else {
            total += current.clip_to(window).map_or(0.0, |c| c.length());
            current = *next;
        }
    }
    total += current.clip_to(window).map_or(0.0, |c| c.length());

    total
}
