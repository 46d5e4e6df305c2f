use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::KernelError;

/// Per-pixel kernel rotation texture (RG8 snorm), tiled over the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationNoise {
    pub width: u32,
    pub height: u32,
    /// One packed `(sin θ, cos θ)` pair per texel, row-major.
    pub texels: Vec<u16>,
}

impl RotationNoise {
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn direction(&self, x: u32, y: u32) -> (f32, f32) {
        let idx = ((y % self.height) * self.width + (x % self.width)) as usize;
        unpack_snorm8x2(self.texels[idx])
    }
}

/// Pack two values in `[-1, 1]` as snorm8, `x` in the low byte.
pub fn pack_snorm8x2(x: f32, y: f32) -> u16 {
    let to_byte = |v: f32| ((v.clamp(-1.0, 1.0) * 127.0).round() as i8) as u8 as u16;
    to_byte(x) | (to_byte(y) << 8)
}

pub fn unpack_snorm8x2(packed: u16) -> (f32, f32) {
    let from_byte = |b: u16| ((b as u8 as i8) as f32 / 127.0).max(-1.0);
    (from_byte(packed & 0xFF), from_byte(packed >> 8))
}

/// Random in-plane rotation per texel, seeded so the texture never changes
/// between runs.
pub fn generate_rotation_noise(width: u32, height: u32, seed: u64) -> Result<RotationNoise, KernelError> {
    if width == 0 || height == 0 {
        return Err(KernelError::InvalidNoiseSize { width, height });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let texels = (0..width * height)
        .map(|_| {
            let theta = rng.random_range(0.0f32..TAU);
            pack_snorm8x2(theta.sin(), theta.cos())
        })
        .collect();

    Ok(RotationNoise {
        width,
        height,
        texels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_snorm_extremes() {
        assert_eq!(pack_snorm8x2(0.0, 0.0), 0);
        assert_eq!(pack_snorm8x2(1.0, 0.0), 127);
        assert_eq!(pack_snorm8x2(-1.0, 0.0), 0x81);
        assert_eq!(pack_snorm8x2(0.0, 1.0), 127 << 8);
        // Out-of-range values clamp
        assert_eq!(pack_snorm8x2(3.0, -3.0), pack_snorm8x2(1.0, -1.0));
    }

    #[test]
    fn test_unpack_close_to_input() {
        let (x, y) = unpack_snorm8x2(pack_snorm8x2(0.5, -0.25));
        assert!((x - 0.5).abs() < 1.0 / 127.0);
        assert!((y + 0.25).abs() < 1.0 / 127.0);
    }

    #[test]
    fn test_noise_directions_unit_length() {
        let noise = generate_rotation_noise(4, 4, 2346).expect("noise");
        assert_eq!(noise.texels.len(), 16);
        assert_eq!(noise.bytes().len(), 32);
        for y in 0..4 {
            for x in 0..4 {
                let (s, c) = noise.direction(x, y);
                let len = (s * s + c * c).sqrt();
                assert!((len - 1.0).abs() < 0.02, "texel ({x},{y}) length {len}");
            }
        }
    }

    #[test]
    fn test_noise_tiles() {
        let noise = generate_rotation_noise(4, 4, 2346).expect("noise");
        assert_eq!(noise.direction(1, 2), noise.direction(5, 6));
    }

    #[test]
    fn test_noise_deterministic() {
        let a = generate_rotation_noise(4, 4, 2346).expect("a");
        let b = generate_rotation_noise(4, 4, 2346).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            generate_rotation_noise(0, 4, 1),
            Err(KernelError::InvalidNoiseSize { width: 0, height: 4 })
        ));
    }
}
