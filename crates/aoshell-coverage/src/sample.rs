use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-sample condition bits recorded by the estimator instead of failing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SampleFlags: u32 {
        /// Window had `end <= start` (or a non-finite bound); result forced to 0.
        const INVALID_WINDOW = 1 << 0;
        /// At least one back face arrived with no open front face and was ignored.
        const ORPHAN_BACK    = 1 << 1;
        /// At least one crossing was off the ray, non-finite, or had an unknown tag.
        const DISCARDED      = 1 << 2;
        /// The crossing list was truncated to the buffer capacity.
        const APPROXIMATE    = 1 << 3;
    }
}

/// Result of reducing one crossing sequence against one sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSample {
    /// Unoccluded length of the window, in `[0, window_length]`.
    pub visible: f32,
    /// Window length, or 0 for an invalid window.
    pub window_length: f32,
    pub flags: SampleFlags,
}

impl CoverageSample {
    pub(crate) fn invalid() -> Self {
        Self {
            visible: 0.0,
            window_length: 0.0,
            flags: SampleFlags::INVALID_WINDOW,
        }
    }

    /// Visible fraction of the window: the factor the shading pass multiplies
    /// into the ambient term. 0 for an invalid window.
    pub fn visibility(&self) -> f32 {
        if self.window_length > 0.0 {
            (self.visible / self.window_length).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn occluded(&self) -> f32 {
        (self.window_length - self.visible).max(0.0)
    }

    pub fn is_approximate(&self) -> bool {
        self.flags.contains(SampleFlags::APPROXIMATE)
    }
}
