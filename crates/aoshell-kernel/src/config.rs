use aoshell_core::constants::{
    DEFAULT_KERNEL_SIZE, DEFAULT_NOISE_SIZE, KERNEL_SEED, MAX_KERNEL_SIZE, NOISE_SEED,
};
use serde::{Deserialize, Serialize};

/// How disc samples of the AO kernel are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleDistribution {
    /// Independent uniform draws, mapped onto the disc.
    Random,
    /// Stratified angle plus base-2 radical inverse radius. Only evenly
    /// spread when the kernel size is a power of two.
    #[default]
    VanDerCorput,
    /// Dart throwing with a minimum spacing between samples.
    Poisson,
}

/// Kernel and rotation-noise settings, loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Number of disc samples (clamped to `1..=MAX_KERNEL_SIZE`).
    #[serde(default = "default_kernel_size")]
    pub size: u32,
    #[serde(default)]
    pub distribution: SampleDistribution,
    #[serde(default = "default_kernel_seed")]
    pub seed: u64,
    /// Rotation noise texture size in texels.
    #[serde(default = "default_noise_size")]
    pub noise_size: (u32, u32),
    #[serde(default = "default_noise_seed")]
    pub noise_seed: u64,
}

fn default_kernel_size() -> u32 {
    DEFAULT_KERNEL_SIZE
}

fn default_kernel_seed() -> u64 {
    KERNEL_SEED
}

fn default_noise_size() -> (u32, u32) {
    (DEFAULT_NOISE_SIZE, DEFAULT_NOISE_SIZE)
}

fn default_noise_seed() -> u64 {
    NOISE_SEED
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_KERNEL_SIZE,
            distribution: SampleDistribution::default(),
            seed: KERNEL_SEED,
            noise_size: default_noise_size(),
            noise_seed: NOISE_SEED,
        }
    }
}

impl KernelConfig {
    pub fn clamped_size(&self) -> u32 {
        self.size.clamp(1, MAX_KERNEL_SIZE)
    }
}
