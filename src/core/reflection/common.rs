//! Shading frame trigonometry.
//!
//! These helpers read spherical quantities directly off unit vectors
//! expressed in the local shading frame (z = surface normal).

use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;

/// Cosine of the angle between a local direction and the surface normal.
#[inline(always)]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Squared cosine of the angle to the surface normal.
#[inline(always)]
pub fn cos_theta2(w: &Vector3f) -> Float {
    sqr(w.z)
}

/// Absolute cosine of the angle to the surface normal.
#[inline(always)]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Sine of the angle to the surface normal.
#[inline(always)]
pub fn sin_theta(w: &Vector3f) -> Float {
    safe_sqrt(1.0 - cos_theta2(w))
}

/// Squared sine of the angle to the surface normal.
#[inline(always)]
pub fn sin_theta2(w: &Vector3f) -> Float {
    1.0 - cos_theta2(w)
}

/// `cosφ·sinθ` of a local direction, which is simply its x-coordinate.
#[inline(always)]
pub fn cos_phi_sin_theta(w: &Vector3f) -> Float {
    w.x
}

/// `sinφ·sinθ` of a local direction, which is simply its y-coordinate.
#[inline(always)]
pub fn sin_phi_sin_theta(w: &Vector3f) -> Float {
    w.y
}

/// Tangent of the angle to the surface normal.
#[inline(always)]
pub fn tan_theta(w: &Vector3f) -> Float {
    let cos = cos_theta(w);
    safe_sqrt(1.0 - sqr(cos)) / cos
}

/// Squared tangent of the angle to the surface normal.
#[inline(always)]
pub fn tan_theta2(w: &Vector3f) -> Float {
    let cos2 = cos_theta2(w);
    (1.0 - cos2) / cos2
}

/// Returns true if two local directions lie in the same hemisphere relative
/// to the surface normal.
///
/// * `wi` - First direction.
/// * `wo` - Second direction.
#[inline(always)]
pub fn same_hemisphere(wi: &Vector3f, wo: &Vector3f) -> bool {
    cos_theta(wi) * cos_theta(wo) > 0.0
}
