//! Single source of truth for shared constants.
//! The packed layouts and buffer bounds here must match the trace shaders
//! that fill crossing buffers on the GPU.

/// Absolute tolerance for all interval comparisons (merge, clip, intersect).
pub const COVERAGE_EPSILON: f32 = 1e-6;

/// Default per-sample crossing capacity of a fixed-stride crossing buffer.
pub const DEFAULT_MAX_CROSSINGS: u32 = 16;

/// Upper bound accepted for any configured per-sample crossing capacity.
/// Matches the largest depth-peel layer count the trace passes allocate.
pub const MAX_BUFFER_CROSSINGS: u32 = 64;

/// Inline capacity of per-sample pairing scratch before spilling to the heap.
pub const INLINE_INTERVALS: usize = 16;

/// Packed crossing kind tag: ray enters geometry.
pub const KIND_FRONT: u32 = 0;

/// Packed crossing kind tag: ray leaves geometry.
pub const KIND_BACK: u32 = 1;

/// Bytes per packed crossing (position f32 + kind u32).
pub const PACKED_CROSSING_BYTES: u32 = 8;

/// Bytes per packed sampling window (start f32 + end f32).
pub const PACKED_WINDOW_BYTES: u32 = 8;

/// Maximum number of disc samples in one AO kernel.
pub const MAX_KERNEL_SIZE: u32 = 32;

/// Default number of disc samples in one AO kernel.
pub const DEFAULT_KERNEL_SIZE: u32 = 8;

/// Fixed seed for kernel generation, so every run uploads the same kernel.
pub const KERNEL_SEED: u64 = 5_960_372;

/// Fixed seed for the rotation noise texture.
pub const NOISE_SEED: u64 = 2346;

/// Default rotation noise texture side length in texels.
pub const DEFAULT_NOISE_SIZE: u32 = 4;

/// Dart-throwing retries per Poisson attempt before starting over.
pub const POISSON_MAX_RETRIES: u32 = 10_000;

/// Failed Poisson attempts between minimum-distance shrink steps.
pub const POISSON_SHRINK_INTERVAL: u32 = 1000;

/// Amount the Poisson disc radius shrinks per shrink step.
pub const POISSON_SHRINK_STEP: f32 = 0.01;
