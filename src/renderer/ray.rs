//! Ray buffers records.

use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;

pub use crate::core::reflection::RayFlags;

/// A live path position, stored in the generation's ray buffer. The
/// direction is a unit vector once the generator has normalized it.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// World-space origin.
    pub origin: Vector3f,

    /// Minimum hit distance.
    pub min_distance: Float,

    /// World-space direction.
    pub direction: Vector3f,

    /// Maximum hit distance.
    pub max_distance: Float,

    /// Per-path random number state.
    pub prng: Prng,

    /// Path throughput carried so far.
    pub weight: Vector3f,

    /// Film column the path belongs to.
    pub x: u16,

    /// Film row the path belongs to.
    pub y: u16,

    /// Bounce count, 0 for camera rays.
    pub depth: u16,

    /// How this ray came to exist.
    pub flags: RayFlags,

    /// Density the previous scattering event produced this direction with.
    /// Infinite for camera rays and singular events, which disables
    /// light-hit MIS on the next segment.
    pub bsdf_pdf: Float,
}

/// An occlusion query carrying a premultiplied contribution. If nothing
/// blocks it before `max_distance`, the contribution lands on the film.
#[derive(Copy, Clone, Debug)]
pub struct ShadowRay {
    /// World-space origin.
    pub origin: Vector3f,

    /// Minimum hit distance.
    pub min_distance: Float,

    /// World-space direction.
    pub direction: Vector3f,

    /// Maximum hit distance.
    pub max_distance: Float,

    /// MIS-weighted contribution to deposit on a miss.
    pub weight: Vector3f,

    /// Film column.
    pub x: u16,

    /// Film row.
    pub y: u16,
}

/// The intersector's report for one ray. A non-positive distance is a miss.
#[derive(Copy, Clone, Debug, Default)]
pub struct Intersection {
    /// Hit distance along the ray, or a non-positive value for a miss.
    pub distance: Float,

    /// Triangle index within the instance.
    pub primitive_index: u32,

    /// Index of the hit instance.
    pub instance_index: u32,

    /// Barycentric hit coordinates (u, v); w = 1 - u - v is implicit.
    pub coordinates: Vector2f,
}

impl Intersection {
    /// Returns true if the ray missed all geometry.
    pub fn is_miss(&self) -> bool {
        self.distance <= 0.0
    }
}
