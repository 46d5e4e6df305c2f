//! CPU-side AO kernel generation.
//!
//! Kernels are generated once when settings change and uploaded as a
//! constant buffer. Generation is seeded so every run produces the same
//! kernel for the same configuration.

use std::f32::consts::TAU;

use aoshell_core::constants::{POISSON_MAX_RETRIES, POISSON_SHRINK_INTERVAL, POISSON_SHRINK_STEP};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{KernelConfig, SampleDistribution};
use crate::sample::KernelSample;
use crate::KernelError;

/// Base-2 radical inverse (Van der Corput sequence) of `i`, in `[0, 1)`.
pub fn radical_inverse(i: u32) -> f32 {
    (i.reverse_bits() as f64 / 4_294_967_296.0) as f32
}

/// Map a uniform pair to the unit disc: angle from `u.x`, radius weighted so
/// samples are spread by sphere volume rather than disc area.
fn disc_from_uniform(u: Vec2) -> Vec2 {
    let theta = u.x * TAU;
    let r = (1.0 - u.y.powf(2.0 / 3.0)).max(0.0).sqrt();
    Vec2::new(r * theta.sin(), r * theta.cos())
}

fn random_jitter(rng: &mut ChaCha8Rng) -> Vec2 {
    Vec2::new(rng.random::<f32>(), rng.random::<f32>())
}

/// Starting minimum-spacing radius for Poisson kernels of `size` samples.
pub fn poisson_radius(size: u32) -> f32 {
    match size {
        32.. => 0.13,
        24.. => 0.15,
        16.. => 0.19,
        _ => 0.28,
    }
}

/// Generate the AO sample kernel described by `config`.
pub fn generate_kernel(config: &KernelConfig) -> Result<Vec<KernelSample>, KernelError> {
    let size = config.clamped_size();
    if size != config.size {
        log::warn!("Kernel size {} clamped to {}", config.size, size);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let kernel = match config.distribution {
        SampleDistribution::Poisson => poisson_kernel(size, &mut rng)?,
        SampleDistribution::Random => {
            let mut kernel = Vec::with_capacity(size as usize);
            for _ in 0..size {
                let u = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
                kernel.push(KernelSample {
                    disc: disc_from_uniform(u),
                    jitter: random_jitter(&mut rng),
                });
            }
            kernel
        }
        SampleDistribution::VanDerCorput => {
            if !size.is_power_of_two() {
                log::warn!(
                    "VanDerCorput kernel of size {} is unevenly spread; use a power of two",
                    size
                );
            }
            // Offsetting by `size` skips index 0, whose (0, 0) draw would put
            // every rotation's sample on the same point.
            let mut kernel = Vec::with_capacity(size as usize);
            for i in 0..size {
                let u = Vec2::new(i as f32 / size as f32, radical_inverse(size + i));
                kernel.push(KernelSample {
                    disc: disc_from_uniform(u),
                    jitter: random_jitter(&mut rng),
                });
            }
            kernel
        }
    };

    log::debug!(
        "Generated {:?} kernel with {} samples",
        config.distribution,
        kernel.len()
    );
    Ok(kernel)
}

/// Brute-force dart throwing inside the disc of radius `1 - rho`, keeping
/// samples at least `2 * rho` apart. Restarts when an attempt runs out of
/// retries, and relaxes `rho` every `POISSON_SHRINK_INTERVAL` attempts.
fn poisson_kernel(size: u32, rng: &mut ChaCha8Rng) -> Result<Vec<KernelSample>, KernelError> {
    let target = size as usize;
    let mut rho = poisson_radius(size);
    let mut attempts = 0u32;

    loop {
        let mut points: Vec<Vec2> = Vec::with_capacity(target);
        let max_radius_sq = (1.0 - rho) * (1.0 - rho);
        let min_dist_sq = (2.0 * rho) * (2.0 * rho);

        let mut retries = 0u32;
        while points.len() < target && retries < POISSON_MAX_RETRIES {
            retries += 1;
            let p = Vec2::new(rng.random_range(-1.0f32..1.0), rng.random_range(-1.0f32..1.0));
            if p.length_squared() > max_radius_sq {
                continue;
            }
            if points.iter().any(|q| p.distance_squared(*q) < min_dist_sq) {
                continue;
            }
            points.push(p);
        }
        attempts += 1;

        if points.len() == target {
            log::debug!(
                "Poisson kernel: {} samples after {} attempts (spacing radius {:.2})",
                target,
                attempts,
                rho
            );
            return Ok(points
                .into_iter()
                .map(|disc| KernelSample {
                    disc,
                    jitter: random_jitter(rng),
                })
                .collect());
        }

        if attempts % POISSON_SHRINK_INTERVAL == 0 {
            rho -= POISSON_SHRINK_STEP;
            if rho <= 0.0 {
                return Err(KernelError::PoissonExhausted { size, attempts });
            }
            log::debug!(
                "Poisson kernel: shrinking spacing radius to {:.2} after {} attempts",
                rho,
                attempts
            );
        }
    }
}
