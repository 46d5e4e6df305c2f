//! Sphere-traced visibility estimator: reduces per-sample surface crossings
//! to the unoccluded length of the sampling window.

pub mod buffers;
pub mod estimator;
pub mod sample;
pub mod stats;

pub use buffers::CrossingBuffer;
pub use estimator::{compute, CoverageEstimator, EstimatorConfig};
pub use sample::{CoverageSample, SampleFlags};
pub use stats::CoverageStats;
