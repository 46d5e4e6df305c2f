use aoshell_core::constants::{MAX_BUFFER_CROSSINGS, PACKED_CROSSING_BYTES};
use aoshell_core::{Crossing, PackedCrossing, PackedWindow, SamplingWindow};

/// Fixed-stride per-sample crossing storage, laid out the way the trace pass
/// writes it on the GPU.
///
/// Each sample owns `stride` packed crossing slots. A sample whose trace
/// emitted more crossings than that keeps only the first `stride`; its true
/// emitted count is retained so evaluation can flag it approximate.
///
/// Three parallel arrays are kept, each directly uploadable:
/// - `crossings`: `sample_count * stride` packed crossings (unused slots zeroed)
/// - `counts`: stored crossing count per sample
/// - `windows`: packed sampling window per sample
#[derive(Debug, Clone)]
pub struct CrossingBuffer {
    stride: usize,
    crossings: Vec<PackedCrossing>,
    counts: Vec<u32>,
    emitted: Vec<u32>,
    windows: Vec<PackedWindow>,
}

impl CrossingBuffer {
    /// Create an empty buffer. The stride is clamped to
    /// `1..=MAX_BUFFER_CROSSINGS`.
    pub fn new(stride: u32) -> Self {
        let clamped = stride.clamp(1, MAX_BUFFER_CROSSINGS);
        if clamped != stride {
            log::warn!(
                "CrossingBuffer: stride {} out of range, clamped to {}",
                stride,
                clamped
            );
        }
        Self {
            stride: clamped as usize,
            crossings: Vec::new(),
            counts: Vec::new(),
            emitted: Vec::new(),
            windows: Vec::new(),
        }
    }

    /// Create an empty buffer with room for `samples` samples.
    pub fn with_samples(stride: u32, samples: usize) -> Self {
        let mut buffer = Self::new(stride);
        buffer.crossings.reserve(samples * buffer.stride);
        buffer.counts.reserve(samples);
        buffer.emitted.reserve(samples);
        buffer.windows.reserve(samples);
        log::debug!(
            "CrossingBuffer: {} samples x {} slots, {} KB of crossings",
            samples,
            buffer.stride,
            samples * buffer.stride * PACKED_CROSSING_BYTES as usize / 1024
        );
        buffer
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn sample_count(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Append one sample. Crossings past the stride are dropped but counted.
    pub fn push_sample(&mut self, crossings: &[Crossing], window: SamplingWindow) {
        let stored = crossings.len().min(self.stride);
        let base = self.crossings.len();
        self.crossings
            .resize(base + self.stride, PackedCrossing::default());
        for (slot, crossing) in self.crossings[base..base + stored]
            .iter_mut()
            .zip(crossings)
        {
            *slot = PackedCrossing::from(*crossing);
        }

        self.counts.push(stored as u32);
        self.emitted
            .push(u32::try_from(crossings.len()).unwrap_or(u32::MAX));
        self.windows.push(window.into());
    }

    /// Stored crossings of sample `index`, in emission order.
    pub fn crossings(&self, index: usize) -> &[PackedCrossing] {
        let base = index * self.stride;
        &self.crossings[base..base + self.counts[index] as usize]
    }

    pub fn window(&self, index: usize) -> SamplingWindow {
        self.windows[index].into()
    }

    /// Number of crossings the trace emitted for sample `index`, including
    /// any that did not fit.
    pub fn emitted_count(&self, index: usize) -> usize {
        self.emitted[index] as usize
    }

    pub fn is_truncated(&self, index: usize) -> bool {
        self.emitted[index] > self.counts[index]
    }

    pub fn clear(&mut self) {
        self.crossings.clear();
        self.counts.clear();
        self.emitted.clear();
        self.windows.clear();
    }

    pub fn crossing_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.crossings)
    }

    pub fn count_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.counts)
    }

    pub fn window_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.windows)
    }
}
