//! Sampling warps and Monte Carlo helpers.

use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::pbrt::*;

mod distribution_1d;

// Re-export.
pub use distribution_1d::*;

/// Maps the unit square onto the sphere with equal areas. The density is
/// `1/(4π)` everywhere.
///
/// * `uv` - The square sample.
pub fn uniform_square_to_sphere(uv: &Vector2f) -> Vector3f {
    let z = 1.0 - 2.0 * uv.y;
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * uv.x;
    Vector3f::new(r * cos(phi), r * sin(phi), z)
}

/// Inverts `uniform_square_to_sphere`.
///
/// * `v` - The unit direction.
pub fn uniform_sphere_to_square(v: &Vector3f) -> Vector2f {
    let y = (1.0 - v.z) / 2.0;
    let x = atan2(v.y, v.x) * INV_TWO_PI;
    Vector2f::new(if x < 0.0 { x + 1.0 } else { x }, y)
}

/// Returns the density of `uniform_square_to_sphere` in solid angle.
#[inline]
pub fn uniform_square_to_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Maps a unit direction onto the square using the equirectangular
/// parameterization.
///
/// * `v` - The unit direction.
pub fn equirect_sphere_to_square(v: &Vector3f) -> Vector2f {
    Vector2f::new(
        (atan2(v.x, v.y) - PI) / TWO_PI,
        acos(clamp(v.z / v.length(), -1.0, 1.0)) * INV_PI,
    )
}

/// Maps the unit square onto the unit disk with the polar warp.
///
/// * `uv` - The square sample.
pub fn uniform_square_to_disk(uv: &Vector2f) -> Vector2f {
    let phi = TWO_PI * uv.x;
    let r = uv.y.sqrt();
    Vector2f::new(r * cos(phi), r * sin(phi))
}

/// Samples directions in the upper hemisphere weighted by their cosine.
/// The density is `cosθ/π`.
///
/// * `uv` - The square sample.
pub fn uniform_square_to_cosine_hemisphere(uv: &Vector2f) -> Vector3f {
    let cos_theta = uv.x.sqrt();
    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let phi = TWO_PI * uv.y;
    Vector3f::new(sin_theta * cos(phi), sin_theta * sin(phi), cos_theta)
}

/// Returns the density of cosine-weighted hemisphere sampling.
///
/// * `cos_theta` - Cosine of the sampled direction.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Maps the unit square onto barycentric coordinates distributed uniformly
/// over a triangle.
///
/// * `uv` - The square sample.
pub fn uniform_square_to_triangle_barycentric(uv: &Vector2f) -> Vector2f {
    let x = uv.x.sqrt();
    Vector2f::new(1.0 - x, x * uv.y)
}

/// Uniformly samples a direction from the cone of directions around the
/// z-axis whose angle to the axis stays below `acos(cos_theta_max)`.
///
/// * `uv`            - The square sample.
/// * `cos_theta_max` - Cosine of the cone's half angle.
pub fn uniform_sample_cone(uv: &Vector2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta = (1.0 - uv.x) + uv.x * cos_theta_max;
    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let phi = TWO_PI * uv.y;
    Vector3f::new(cos(phi) * sin_theta, sin(phi) * sin_theta, cos_theta)
}

/// Returns the density of `uniform_sample_cone` in solid angle.
///
/// * `cos_theta_max` - Cosine of the cone's half angle.
#[inline]
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Weight samples using the balance heuristic.
///
/// * `f_pdf` - First sampling distribution.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(f_pdf: Float, g_pdf: Float) -> Float {
    f_pdf / (f_pdf + g_pdf)
}

/// Weight samples using the power heuristic with exponent 2.
///
/// * `f_pdf` - First sampling distribution.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(f_pdf: Float, g_pdf: Float) -> Float {
    let f = f_pdf * f_pdf;
    let g = g_pdf * g_pdf;
    f / (f + g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sphere_warp_round_trips(u in 0.001f32..0.999, v in 0.001f32..0.999) {
            let uv = Vector2f::new(u, v);
            let dir = uniform_square_to_sphere(&uv);
            prop_assert!((dir.length() - 1.0).abs() < 1e-5);
            let back = uniform_sphere_to_square(&dir);
            prop_assert!((back.x - u).abs() < 1e-4);
            prop_assert!((back.y - v).abs() < 1e-4);
        }

        #[test]
        fn cosine_hemisphere_stays_above_plane(u in 0.0f32..1.0, v in 0.0f32..1.0) {
            let dir = uniform_square_to_cosine_hemisphere(&Vector2f::new(u, v));
            prop_assert!(dir.z >= 0.0);
            prop_assert!((dir.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn triangle_barycentrics_are_valid(u in 0.0f32..1.0, v in 0.0f32..1.0) {
            let b = uniform_square_to_triangle_barycentric(&Vector2f::new(u, v));
            prop_assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn cone_sample_respects_half_angle() {
        let cos_max = 0.9;
        for i in 0..64 {
            let uv = Vector2f::new((i as Float + 0.5) / 64.0, ((i * 7 % 64) as Float + 0.5) / 64.0);
            let dir = uniform_sample_cone(&uv, cos_max);
            assert!(dir.z >= cos_max - 1e-5);
        }
    }

    #[test]
    fn heuristics_partition_unity() {
        let f = 0.7;
        let g = 0.4;
        assert!((power_heuristic(f, g) + power_heuristic(g, f) - 1.0).abs() < 1e-6);
        assert!((balance_heuristic(f, g) + balance_heuristic(g, f) - 1.0).abs() < 1e-6);
    }
}
