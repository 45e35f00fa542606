//! Anisotropic specular lobe.

use super::*;
use crate::core::geometry::{reflect, Vector2f, Vector3f};
use crate::core::microfacet::*;
use crate::core::pbrt::*;

/// Anisotropic GGX reflection with a tinted Fresnel term. Sampling draws a
/// visible microfacet normal and reflects the outgoing direction about it.
#[derive(Copy, Clone, Debug, Default)]
pub struct Specular {
    /// Roughness along the tangent axis.
    pub alpha_x: Float,

    /// Roughness along the bitangent axis.
    pub alpha_y: Float,

    /// Specular tint at normal incidence.
    pub cspec0: Vector3f,

    /// Index of refraction.
    pub ior: Float,

    /// Lobe weight.
    pub weight: Float,
}

impl Specular {
    /// Evaluates the lobe for a pair of local directions and returns its
    /// value and density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn evaluate(&self, wo: &Vector3f, wi: &Vector3f) -> (Vector3f, Float) {
        let wh = (*wi + *wo).normalize();

        // Density of the visible-normal sampler, before the reflection
        // Jacobian.
        let mut pdf = anisotropic_ggx(&wh, self.alpha_x, self.alpha_y)
            * anisotropic_smith_g1(wo, &wh, self.alpha_x, self.alpha_y)
            * abs(wo.dot(&wh) / cos_theta(wo));
        if !(pdf > 0.0) {
            return (Vector3f::ZERO, 0.0);
        }

        pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

        let f = fresnel_reflection_color(wi, &wh, self.ior, &self.cspec0);
        let g = anisotropic_smith_g1(wi, &wh, self.alpha_x, self.alpha_y)
            * anisotropic_smith_g1(wo, &wh, self.alpha_x, self.alpha_y);
        let d = anisotropic_ggx(&wh, self.alpha_x, self.alpha_y);
        (f * (d * g / abs(4.0 * cos_theta(wo))), pdf)
    }

    /// Draws an incident direction by sampling the visible normal
    /// distribution and reflecting.
    ///
    /// * `rnd` - The 2D uniform random sample.
    /// * `wo`  - Outgoing direction.
    pub fn sample(&self, rnd: &Vector2f, wo: &Vector3f) -> BsdfSample {
        let wh = sample_ggx_vndf(rnd, self.alpha_x, self.alpha_y, wo);
        let mut pdf = anisotropic_ggx(&wh, self.alpha_x, self.alpha_y)
            * anisotropic_smith_g1(wo, &wh, self.alpha_x, self.alpha_y)
            * abs(wo.dot(&wh) / cos_theta(wo));

        if !(pdf > 0.0) {
            return BsdfSample::invalid();
        }

        let wi = reflect(&-*wo, &wh);
        if !same_hemisphere(&wi, wo) {
            return BsdfSample::invalid();
        }

        pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

        let f = fresnel_reflection_color(&wi, &wh, self.ior, &self.cspec0);
        let gi = anisotropic_smith_g1(&wi, &wh, self.alpha_x, self.alpha_y);
        let weight = self.weight * f * gi;
        BsdfSample::new(wi, weight, pdf, RayFlags::REFLECTION | RayFlags::GLOSSY)
    }
}
