use thiserror::Error;

/// Conditions detected while reducing a crossing sequence to a visible length.
///
/// The estimator's hot path never returns these; it recovers with a numeric
/// fallback and records a sample flag instead. Strict evaluation surfaces the
/// first condition found as one of these variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoverageError {
    #[error("invalid sampling window [{start}, {end}]: end must exceed start")]
    InvalidWindow { start: f32, end: f32 },

    #[error("back-face crossing at index {index} (position {position}) has no open front face")]
    MalformedCrossingSequence { index: usize, position: f32 },

    #[error("crossing count {count} exceeds buffer capacity {capacity}")]
    Overflow { count: usize, capacity: usize },
}
