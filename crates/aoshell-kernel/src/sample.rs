use aoshell_core::SamplingWindow;
use glam::Vec2;

/// One AO kernel entry: a point in the unit disc plus two uniform jitter
/// values the trace pass uses for per-sample randomization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSample {
    pub disc: Vec2,
    pub jitter: Vec2,
}

impl KernelSample {
    /// Half-height of the unit sphere's chord through this disc point.
    pub fn sphere_height(&self) -> f32 {
        (1.0 - self.disc.length_squared()).max(0.0).sqrt()
    }

    /// Sampling window along the view ray through this disc point, for a
    /// sphere of `radius` centred at `center_depth`.
    pub fn window(&self, center_depth: f32, radius: f32) -> SamplingWindow {
        let half = self.sphere_height() * radius;
        SamplingWindow::new(center_depth - half, center_depth + half)
    }

    /// GPU layout: `(disc.x, disc.y, jitter.x, jitter.y)`.
    pub fn to_packed(&self) -> [f32; 4] {
        [self.disc.x, self.disc.y, self.jitter.x, self.jitter.y]
    }
}

/// Pack a kernel into its uploadable layout.
pub fn pack_kernel(kernel: &[KernelSample]) -> Vec<[f32; 4]> {
    kernel.iter().map(KernelSample::to_packed).collect()
}
