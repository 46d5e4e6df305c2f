use aoshell_core::Crossing;
use aoshell_coverage::CrossingBuffer;
use aoshell_kernel::KernelSample;

/// Configuration for a single synthetic workload.
pub struct SceneConfig {
    pub name: &'static str,
    /// Occluders crossed per sample, each emitting a front and (usually) a
    /// back face.
    pub occluders: u32,
    /// Percent of samples whose trace starts inside geometry and emits a
    /// leading back face.
    pub orphan_pct: u32,
    /// Depth of the sphere centre along the view ray.
    pub center_depth: f32,
    pub radius: f32,
}

impl SceneConfig {
    /// Crossings emitted per sample before any buffer truncation.
    pub fn emitted_per_sample(&self) -> u32 {
        self.occluders * 2 + u32::from(self.orphan_pct > 0)
    }
}

/// Return the standard suite of workloads, from an open sky to traces that
/// overflow a 16-slot crossing buffer.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "open",
            occluders: 0,
            orphan_pct: 0,
            center_depth: 4.0,
            radius: 1.0,
        },
        SceneConfig {
            name: "sparse",
            occluders: 2,
            orphan_pct: 0,
            center_depth: 4.0,
            radius: 1.0,
        },
        SceneConfig {
            name: "dense",
            occluders: 6,
            orphan_pct: 5,
            center_depth: 8.0,
            radius: 2.0,
        },
        SceneConfig {
            name: "overflow",
            occluders: 12,
            orphan_pct: 5,
            center_depth: 8.0,
            radius: 2.0,
        },
    ]
}

/// Stateless hash of a sample index, frame and crossing slot.
pub fn scene_hash(sample: u32, frame: u32, slot: u32) -> u32 {
    let mut state = sample
        .wrapping_mul(0x9E3779B9)
        .wrapping_add(frame.wrapping_mul(0x517CC1B7))
        .wrapping_add(slot.wrapping_mul(0x2545F491));

    state ^= state >> 16;
    state = state.wrapping_mul(0x45D9F3B);
    state ^= state >> 16;
    state = state.wrapping_mul(0x45D9F3B);
    state ^= state >> 16;

    state
}

/// Convert a hash value to a float in [0, 1).
pub fn hash_to_float(hash: u32) -> f32 {
    (hash >> 8) as f32 / 16_777_216.0
}

/// Crossings for one sample along a ray of `ray_length`, in emission order.
///
/// Occluders are placed anywhere on the ray, so some back faces land past
/// its end and are dropped by the estimator, leaving the front unterminated.
pub fn generate_crossings(config: &SceneConfig, sample: u32, frame: u32, ray_length: f32) -> Vec<Crossing> {
    let mut crossings = Vec::with_capacity(config.emitted_per_sample() as usize);

    if config.orphan_pct > 0 && scene_hash(sample, frame, u32::MAX) % 100 < config.orphan_pct {
        let exit = hash_to_float(scene_hash(sample, frame, u32::MAX - 1)) * ray_length;
        crossings.push(Crossing::Back(exit));
    }

    for occluder in 0..config.occluders {
        let front = hash_to_float(scene_hash(sample, frame, occluder * 2)) * ray_length;
        let thickness = hash_to_float(scene_hash(sample, frame, occluder * 2 + 1)) * config.radius;
        crossings.push(Crossing::Front(front));
        crossings.push(Crossing::Back(front + thickness));
    }

    crossings
}

/// Fill a crossing buffer with one frame of `samples` samples. Each sample
/// takes its window from the kernel entry it maps to.
pub fn generate_frame(
    config: &SceneConfig,
    kernel: &[KernelSample],
    samples: usize,
    frame: u32,
    stride: u32,
) -> CrossingBuffer {
    let mut buffer = CrossingBuffer::with_samples(stride, samples);
    if kernel.is_empty() {
        return buffer;
    }

    for sample in 0..samples {
        let entry = &kernel[sample % kernel.len()];
        let window = entry.window(config.center_depth, config.radius);
        let crossings = generate_crossings(config, sample as u32, frame, window.ray_length());
        buffer.push_sample(&crossings, window);
    }

    buffer
}
