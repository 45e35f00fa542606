//! BSDF sample records.

use super::RayFlags;
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;

/// The outcome of sampling a scattering direction. For valid samples,
/// `weight / pdf` estimates the integrand contribution; an infinite `pdf`
/// marks a singular event whose weight is applied directly.
#[derive(Copy, Clone, Debug)]
pub struct BsdfSample {
    /// Sampled incident direction.
    pub wi: Vector3f,

    /// RGB throughput carried by the sample. For lobe samples this already
    /// contains the estimator division by the lobe's own density.
    pub weight: Vector3f,

    /// Density of the sample in solid angle, or ∞ for singular events.
    pub pdf: Float,

    /// Ray kind produced by the scattering event.
    pub flags: RayFlags,
}

impl BsdfSample {
    /// Create a new `BsdfSample`.
    ///
    /// * `wi`     - Sampled incident direction.
    /// * `weight` - RGB throughput.
    /// * `pdf`    - Density in solid angle.
    /// * `flags`  - Ray kind.
    pub fn new(wi: Vector3f, weight: Vector3f, pdf: Float, flags: RayFlags) -> Self {
        Self { wi, weight, pdf, flags }
    }

    /// The rejected sample: zero weight and density. Paths that draw it
    /// contribute nothing and terminate.
    pub fn invalid() -> Self {
        Self {
            wi: Vector3f::ZERO,
            weight: Vector3f::ZERO,
            pdf: 0.0,
            flags: RayFlags::empty(),
        }
    }

    /// Returns true if the sample can continue a path.
    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && self.weight.is_finite()
    }
}
