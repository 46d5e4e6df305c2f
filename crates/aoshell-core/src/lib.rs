//! Shared data model for sphere-traced visibility coverage: surface
//! crossings, sampling windows, occluded intervals and their GPU layouts.

pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use error::CoverageError;
pub use types::{Crossing, OccludedInterval, PackedCrossing, PackedWindow, SamplingWindow};
