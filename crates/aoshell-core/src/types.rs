use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::{COVERAGE_EPSILON, KIND_BACK, KIND_FRONT};
use crate::error::CoverageError;

/// A surface crossing recorded along a traced probe segment.
///
/// The payload is the distance from the ray origin. Sequences of crossings
/// are kept in emission order; pairing follows that order, not position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Crossing {
    /// The probe enters opaque geometry.
    Front(f32),
    /// The probe leaves opaque geometry.
    Back(f32),
}

impl Crossing {
    /// Distance from the ray origin.
    pub fn position(self) -> f32 {
        match self {
            Crossing::Front(p) | Crossing::Back(p) => p,
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Crossing::Front(_))
    }

    /// Whether the crossing lies on the traced segment `[0, ray_length]`.
    /// Non-finite positions never do.
    pub fn is_on_ray(self, ray_length: f32) -> bool {
        let p = self.position();
        p.is_finite() && p >= -COVERAGE_EPSILON && p <= ray_length + COVERAGE_EPSILON
    }
}

/// The shell tested for occlusion: `[start, end]` along the probe ray.
///
/// `end` doubles as the effective ray length; crossings beyond it are never
/// part of the traced segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingWindow {
    pub start: f32,
    pub end: f32,
}

impl SamplingWindow {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Window covering the last `radius` units of a ray of `ray_length`:
    /// `[ray_length - radius, ray_length]`.
    pub fn from_ray(ray_length: f32, radius: f32) -> Self {
        Self {
            start: ray_length - radius,
            end: ray_length,
        }
    }

    /// Effective ray length (the window's far end).
    pub fn ray_length(&self) -> f32 {
        self.end
    }

    /// `end - start`. Not clamped; check `is_valid` first.
    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    pub fn validate(&self) -> Result<(), CoverageError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoverageError::InvalidWindow {
                start: self.start,
                end: self.end,
            })
        }
    }
}

/// A stretch of the probe ray that lies inside opaque geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccludedInterval {
    pub start: f32,
    pub end: f32,
}

impl OccludedInterval {
    /// Interval spanned by a front/back pair, ordered and clipped to
    /// `[0, ray_length]`. A non-positive ray length yields an empty interval
    /// at the origin.
    pub fn from_pair(front: f32, back: f32, ray_length: f32) -> Self {
        let far = ray_length.max(0.0);
        let lo = front.min(back).clamp(0.0, far);
        let hi = front.max(back).clamp(0.0, far);
        Self { start: lo, end: hi }
    }

    /// Interval from an unterminated front face to the end of the ray.
    pub fn to_ray_end(front: f32, ray_length: f32) -> Self {
        Self::from_pair(front, ray_length, ray_length)
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }

    /// Portion of this interval inside `window`, or `None` when they do not
    /// overlap by more than the tolerance.
    pub fn clip_to(&self, window: &SamplingWindow) -> Option<Self> {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end);
        if end - start > COVERAGE_EPSILON {
            Some(Self { start, end })
        } else {
            None
        }
    }
}

/// GPU layout of a crossing: 8 bytes, `kind` 0 = front, 1 = back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedCrossing {
    pub position: f32,
    pub kind: u32,
}

impl PackedCrossing {
    /// Decode the kind tag. Unknown tags yield `None`.
    pub fn unpack(self) -> Option<Crossing> {
        match self.kind {
            KIND_FRONT => Some(Crossing::Front(self.position)),
            KIND_BACK => Some(Crossing::Back(self.position)),
            _ => None,
        }
    }
}

impl From<Crossing> for PackedCrossing {
    fn from(crossing: Crossing) -> Self {
        match crossing {
            Crossing::Front(position) => Self {
                position,
                kind: KIND_FRONT,
            },
            Crossing::Back(position) => Self {
                position,
                kind: KIND_BACK,
            },
        }
    }
}

/// GPU layout of a sampling window: 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PackedWindow {
    pub start: f32,
    pub end: f32,
}

impl From<SamplingWindow> for PackedWindow {
    fn from(window: SamplingWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

impl From<PackedWindow> for SamplingWindow {
    fn from(packed: PackedWindow) -> Self {
        SamplingWindow::new(packed.start, packed.end)
    }
}
