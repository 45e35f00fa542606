//! Fresnel reflectance.

use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;

/// The Schlick interpolation weight `(1 - cosθ)^5`.
///
/// * `cos_theta` - Cosine of the angle to the surface normal.
#[inline]
pub fn schlick_weight(cos_theta: Float) -> Float {
    pow5(saturate(1.0 - cos_theta))
}

/// The Schlick approximation of the Fresnel term.
///
/// See "An Inexpensive BRDF Model for Physically-based Rendering"
/// [Schlick 1994].
///
/// * `f0`        - Reflectance at normal incidence.
/// * `cos_theta` - Cosine of the angle to the surface normal.
#[inline]
pub fn schlick(f0: Float, cos_theta: Float) -> Float {
    f0 + (1.0 - f0) * schlick_weight(cos_theta)
}

/// Unpolarized Fresnel term for dielectric materials. Returns the
/// reflectance and the cosine of the transmitted direction, which is -1 in
/// the case of total internal reflection.
///
/// * `i`   - Incident direction.
/// * `n`   - Surface normal.
/// * `eta` - Relative index of refraction (n1 / n2).
pub fn fresnel_dielectric(i: &Vector3f, n: &Vector3f, eta: Float) -> (Float, Float) {
    let cos_theta_t_sqr = 1.0 - eta * eta * (1.0 - sqr(n.dot(i)));

    if cos_theta_t_sqr <= 0.0 {
        // Total internal reflection.
        return (1.0, -1.0);
    }

    let cos_theta_i = abs(n.dot(i));
    let cos_theta_t = cos_theta_t_sqr.sqrt();

    let rs = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    let rp = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);

    // Average the power of both polarizations.
    (0.5 * (rs * rs + rp * rp), cos_theta_t)
}

/// Scalar form of the dielectric Fresnel term that only needs the cosine of
/// the incident angle.
///
/// * `cos_i` - Cosine of the incident angle.
/// * `eta`   - Relative index of refraction.
pub fn fresnel_dielectric_cos(cos_i: Float, eta: Float) -> Float {
    let c = abs(cos_i);
    let mut g = eta * eta - 1.0 + c * c;
    if g > 0.0 {
        g = g.sqrt();
        let a = (g - c) / (g + c);
        let b = (c * (g + c) - 1.0) / (c * (g - c) + 1.0);
        0.5 * a * a * (1.0 + b * b)
    } else {
        // Total internal reflection.
        1.0
    }
}

/// Blends a specular tint toward white as the Fresnel term rises from its
/// normal-incidence value toward 1.
///
/// * `wi`     - Incident direction.
/// * `wh`     - The microfacet normal.
/// * `ior`    - Index of refraction.
/// * `f0`     - Reflectance at normal incidence.
/// * `cspec0` - Specular tint at normal incidence.
pub fn interpolate_fresnel(
    wi: &Vector3f,
    wh: &Vector3f,
    ior: Float,
    f0: Float,
    cspec0: &Vector3f,
) -> Vector3f {
    let f0_norm = 1.0 / (1.0 - f0);
    let fh = (fresnel_dielectric_cos(wi.dot(wh), ior) - f0) * f0_norm;
    *cspec0 * (1.0 - fh) + Vector3f::splat(fh)
}

/// The tinted Fresnel reflection color used by the specular lobes.
///
/// * `wi`     - Incident direction.
/// * `wh`     - The microfacet normal.
/// * `ior`    - Index of refraction.
/// * `cspec0` - Specular tint at normal incidence.
pub fn fresnel_reflection_color(
    wi: &Vector3f,
    wh: &Vector3f,
    ior: Float,
    cspec0: &Vector3f,
) -> Vector3f {
    let f0 = fresnel_dielectric_cos(1.0, ior);
    interpolate_fresnel(wi, wh, ior, f0, cspec0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_incidence_matches_closed_form() {
        for eta in [1.2_f32, 1.5, 2.4] {
            let expected = sqr((eta - 1.0) / (eta + 1.0));
            let got = fresnel_dielectric_cos(1.0, eta);
            assert!((got - expected).abs() < 1e-5, "eta {eta}: {got} vs {expected}");
        }
    }

    #[test]
    fn total_internal_reflection_is_one() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        // Incident at 60° from inside glass (eta = 1.5 relative).
        let i = Vector3f::new(0.866, 0.0, 0.5);
        let (f, cos_t) = fresnel_dielectric(&i, &n, 1.5);
        assert_eq!(f, 1.0);
        assert_eq!(cos_t, -1.0);
    }

    #[test]
    fn vector_and_cos_forms_agree_at_normal_incidence() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let i = Vector3f::new(0.0, 0.0, 1.0);
        let eta = 1.0 / 1.5;
        let (f, _) = fresnel_dielectric(&i, &n, eta);
        let fc = fresnel_dielectric_cos(1.0, 1.5);
        assert!((f - fc).abs() < 1e-4);
    }

    #[test]
    fn schlick_limits() {
        assert!((schlick(0.04, 1.0) - 0.04).abs() < 1e-6);
        assert!((schlick(0.04, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn interpolated_color_reaches_white_at_grazing() {
        let cspec0 = Vector3f::new(0.9, 0.2, 0.1);
        let wh = Vector3f::new(0.0, 0.0, 1.0);
        let grazing = Vector3f::new(0.9998, 0.0, 0.02);
        let c = fresnel_reflection_color(&grazing, &wh, 1.45, &cspec0);
        assert!(c.x > 0.97 && c.y > 0.97 && c.z > 0.97);
    }
}
