//! AO sample kernel: disc-sample distributions, the per-sample sphere-chord
//! sampling window, and the rotation noise texture.

pub mod config;
pub mod generate;
pub mod noise;
pub mod sample;

pub use config::{KernelConfig, SampleDistribution};
pub use generate::{generate_kernel, radical_inverse};
pub use noise::{generate_rotation_noise, RotationNoise};
pub use sample::{pack_kernel, KernelSample};

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("Poisson kernel of {size} samples not found after {attempts} attempts")]
    PoissonExhausted { size: u32, attempts: u32 },

    #[error("invalid noise texture size {width}x{height}")]
    InvalidNoiseSize { width: u32, height: u32 },
}
