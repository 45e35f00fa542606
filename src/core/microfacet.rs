//! Microfacet distributions.

use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::core::reflection::{cos_phi_sin_theta, cos_theta, cos_theta2, sin_phi_sin_theta, tan_theta2};

/// Evaluates the anisotropic GGX normal distribution function.
///
/// See "Microfacet Models for Refraction through Rough Surfaces"
/// [Walter et al. 2007].
///
/// * `wh` - The microfacet normal.
/// * `ax` - Roughness along the tangent axis.
/// * `ay` - Roughness along the bitangent axis.
pub fn anisotropic_ggx(wh: &Vector3f, ax: Float, ay: Float) -> Float {
    let n_dot_h = cos_theta(wh);
    let a = cos_phi_sin_theta(wh) / ax;
    let b = sin_phi_sin_theta(wh) / ay;
    let c = sqr(a) + sqr(b) + sqr(n_dot_h);
    1.0 / (PI * ax * ay * sqr(c))
}

/// Anisotropic Smith shadowing/masking function for the GGX distribution.
/// Returns 0 when the orientation of `w` does not match the orientation of
/// `wh`.
///
/// * `w`  - The incident or outgoing direction.
/// * `wh` - The microfacet normal.
/// * `ax` - Roughness along the tangent axis.
/// * `ay` - Roughness along the bitangent axis.
pub fn anisotropic_smith_g1(w: &Vector3f, wh: &Vector3f, ax: Float, ay: Float) -> Float {
    // Project both directions into the upper hemisphere and check that the
    // angle they form is below 90°.
    if w.dot(wh) * cos_theta(w) * cos_theta(wh) <= 0.0 {
        return 0.0;
    }

    // At normal incidence the tangent vanishes and the result is 1.
    if abs(cos_theta(w)) >= 1.0 {
        return 1.0;
    }

    let a2_tan_theta2 =
        (sqr(ax * cos_phi_sin_theta(w)) + sqr(ay * sin_phi_sin_theta(w))) / cos_theta2(w);
    2.0 / (1.0 + (1.0 + a2_tan_theta2).sqrt())
}

/// Isotropic Smith shadowing/masking function for the GGX distribution.
/// The clearcoat lobe pairs this with the GTR1 NDF, as in [Burley 2012].
///
/// * `w`  - The incident or outgoing direction.
/// * `wh` - The microfacet normal.
/// * `a`  - The roughness.
pub fn smith_g1(w: &Vector3f, wh: &Vector3f, a: Float) -> Float {
    if w.dot(wh) * cos_theta(w) * cos_theta(wh) <= 0.0 {
        return 0.0;
    }
    if abs(cos_theta(w)) >= 1.0 {
        return 1.0;
    }

    let a2_tan_theta2 = sqr(a) * tan_theta2(w);
    2.0 / (1.0 + (1.0 + a2_tan_theta2).sqrt())
}

/// Evaluates the isotropic GTR1 normal distribution function.
///
/// See "Physically Based Shading at Disney" [Burley 2012].
///
/// * `wh` - The microfacet normal.
/// * `a`  - The roughness.
pub fn gtr1(wh: &Vector3f, a: Float) -> Float {
    let n_dot_h = cos_theta(wh);
    let a2 = sqr(a);
    let t = 1.0 + (a2 - 1.0) * sqr(n_dot_h);
    (a2 - 1.0) / (PI * a2.ln() * t)
}

/// Samples the isotropic GTR1 normal distribution function. The returned
/// microfacet normal always lies in the upper hemisphere; its density is
/// `cosθ(wh) · D(wh)`.
///
/// * `rnd` - The 2D uniform random sample.
/// * `a`   - The roughness.
pub fn sample_gtr1(rnd: &crate::core::geometry::Vector2f, a: Float) -> Vector3f {
    let a2 = sqr(a);

    let cos_theta = safe_sqrt((1.0 - a2.powf(1.0 - rnd.x)) / (1.0 - a2));
    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let phi = TWO_PI * rnd.y;

    Vector3f::new(sin_theta * cos(phi), sin_theta * sin(phi), cos_theta)
}

/// Samples the distribution of visible GGX microfacet normals for a given
/// outgoing direction [Heitz 2018]. The density of the returned normal is
/// `G1(wo) · max(0, wo·wh) · D(wh) / cosθ(wo)`.
///
/// The sign of the outgoing direction is flipped before the hemisphere
/// transform so the same routine serves the transmission lobe when shading
/// a back face.
///
/// * `rnd` - The 2D uniform random sample.
/// * `ax`  - Roughness along the tangent axis.
/// * `ay`  - Roughness along the bitangent axis.
/// * `wo`  - The outgoing direction in the shading frame.
pub fn sample_ggx_vndf(
    rnd: &crate::core::geometry::Vector2f,
    ax: Float,
    ay: Float,
    wo: &Vector3f,
) -> Vector3f {
    let sgn = 1.0_f32.copysign(cos_theta(wo));

    // Transform the view direction to the hemisphere configuration.
    let vh = (sgn * Vector3f::new(ax * wo.x, ay * wo.y, wo.z)).normalize();

    // Orthonormal basis, with a special case when the cross product is zero.
    let len_sq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if len_sq > 0.0 {
        Vector3f::new(-vh.y, vh.x, 0.0) / len_sq.sqrt()
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let t2 = vh.cross(&t1);

    // Parameterization of the projected area.
    let r = rnd.x.sqrt();
    let phi = TWO_PI * rnd.y;
    let p1 = r * cos(phi);
    let mut p2 = r * sin(phi);
    let s = 0.5 * (1.0 + vh.z);
    p2 = (1.0 - s) * safe_sqrt(1.0 - p1 * p1) + s * p2;

    // Reprojection onto the hemisphere.
    let nh = p1 * t1 + p2 * t2 + safe_sqrt(1.0 - p1 * p1 - p2 * p2) * vh;

    // Transform the normal back to the ellipsoid configuration.
    sgn * Vector3f::new(ax * nh.x, ay * nh.y, max(0.0, nh.z)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector2f;
    use crate::core::rng::Prng;

    #[test]
    fn ggx_is_normalized() {
        // ∫ D(wh) cosθ dwh over the hemisphere should be 1. Integrate over
        // the cosine-weighted measure numerically.
        let a = 0.5;
        let n = 200;
        let mut total = 0.0;
        for i in 0..n {
            for j in 0..n {
                let u = (i as Float + 0.5) / n as Float;
                let v = (j as Float + 0.5) / n as Float;
                let cos_t = u;
                let sin_t = safe_sqrt(1.0 - cos_t * cos_t);
                let phi = TWO_PI * v;
                let wh = Vector3f::new(sin_t * cos(phi), sin_t * sin(phi), cos_t);
                // dω = sinθ dθ dφ with θ = acos(u): dω = du dφ.
                total += anisotropic_ggx(&wh, a, a) * cos_t * TWO_PI / (n * n) as Float;
            }
        }
        assert!((total - 1.0).abs() < 2e-2, "integral {total}");
    }

    #[test]
    fn vndf_normals_face_the_viewer() {
        let mut prng = Prng::new(3, 0);
        let wo = Vector3f::new(0.4, -0.2, 0.89).normalize();
        for _ in 0..256 {
            let rnd = prng.sample_2d();
            let wh = sample_ggx_vndf(&rnd, 0.3, 0.6, &wo);
            assert!(wo.dot(&wh) >= 0.0);
            assert!((wh.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn vndf_flips_for_back_faces() {
        let mut prng = Prng::new(5, 0);
        let wo = Vector3f::new(0.1, 0.2, -0.97).normalize();
        for _ in 0..256 {
            let rnd = prng.sample_2d();
            let wh = sample_ggx_vndf(&rnd, 0.25, 0.25, &wo);
            assert!(wo.dot(&wh) >= 0.0);
            assert!(cos_theta(&wh) <= 0.0);
        }
    }

    #[test]
    fn smith_g1_rejects_mismatched_orientation() {
        let w = Vector3f::new(0.0, 0.0, 1.0);
        let wh = Vector3f::new(0.0, 0.0, -1.0);
        assert_eq!(smith_g1(&w, &wh, 0.5), 0.0);
        assert_eq!(anisotropic_smith_g1(&w, &wh, 0.5, 0.5), 0.0);
    }

    #[test]
    fn gtr1_sampling_density_shape() {
        let mut prng = Prng::new(11, 0);
        let a = 0.4;
        for _ in 0..128 {
            let wh = sample_gtr1(&prng.sample_2d(), a);
            assert!(wh.z >= 0.0);
            assert!(gtr1(&wh, a) > 0.0);
        }
    }
}
