//! Diffuse lobe.

use super::*;
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::core::sampling::uniform_square_to_cosine_hemisphere;

/// The Disney diffuse lobe: a Fresnel-weighted Lambertian term, a
/// retro-reflection term driven by roughness, and a sheen term on the
/// half-vector. With `translucent` set the lobe scatters into the opposite
/// hemisphere instead.
#[derive(Copy, Clone, Debug, Default)]
pub struct Diffuse {
    /// RGB weight of the diffuse term.
    pub diffuse_weight: Vector3f,

    /// RGB weight of the sheen term.
    pub sheen_weight: Vector3f,

    /// Surface roughness driving retro-reflection.
    pub roughness: Float,

    /// Scatter through the surface rather than off it.
    pub translucent: bool,
}

impl Diffuse {
    /// Evaluates the lobe for a pair of local directions and returns its
    /// value and density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn evaluate(&self, wo: &Vector3f, wi: &Vector3f) -> (Vector3f, Float) {
        if same_hemisphere(wi, wo) == self.translucent {
            return (Vector3f::ZERO, 0.0);
        }

        let n_dot_l = abs_cos_theta(wi);
        let pdf = INV_PI * n_dot_l;

        (self.shade(wo, wi, n_dot_l) * pdf, pdf)
    }

    /// Draws an incident direction from the cosine-weighted hemisphere
    /// around the normal, flipping it for translucent surfaces.
    ///
    /// * `rnd` - The 2D uniform random sample.
    /// * `wo`  - Outgoing direction.
    pub fn sample(&self, rnd: &crate::core::geometry::Vector2f, wo: &Vector3f) -> BsdfSample {
        let mut wi = uniform_square_to_cosine_hemisphere(rnd);
        if !same_hemisphere(&wi, wo) {
            wi = -wi;
        }

        let n_dot_l = abs_cos_theta(&wi);
        let pdf = INV_PI * n_dot_l;
        if !(pdf > 0.0) {
            return BsdfSample::invalid();
        }

        let weight = self.shade(wo, &wi, n_dot_l);

        let (wi, flags) = if self.translucent {
            (-wi, RayFlags::TRANSMISSION | RayFlags::DIFFUSE)
        } else {
            (wi, RayFlags::REFLECTION | RayFlags::DIFFUSE)
        };

        BsdfSample::new(wi, weight, pdf, flags)
    }

    /// The shared reflectance expression. Returns the estimator weight, i.e.
    /// the BSDF value divided by the cosine-weighted density.
    fn shade(&self, wo: &Vector3f, wi: &Vector3f, n_dot_l: Float) -> Vector3f {
        let n_dot_v = abs_cos_theta(wo);
        let l_dot_v = wi.dot(wo);

        let fl = schlick_weight(n_dot_l);
        let fv = schlick_weight(n_dot_v);

        // Lambertian
        let lambertian = (1.0 - 0.5 * fv) * (1.0 - 0.5 * fl);

        // Retro-reflection
        let rr = self.roughness * (l_dot_v + 1.0);
        let retro_reflection = rr * (fl + fv + fl * fv * (rr - 1.0));

        // Sheen
        let wh = (*wo + *wi).normalize();
        let l_dot_h = wh.abs_dot(wi);
        let sheen = schlick_weight(l_dot_h);

        self.diffuse_weight * (lambertian + retro_reflection) + self.sheen_weight * (PI * sheen)
    }
}
