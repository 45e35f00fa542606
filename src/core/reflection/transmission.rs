//! Glass transmission lobe.

use super::*;
use crate::core::geometry::{reflect, refract, Vector2f, Vector3f};
use crate::core::microfacet::*;
use crate::core::pbrt::*;

/// Rough dielectric transmission. The Fresnel term at the outgoing
/// direction selects between a GGX reflection branch and a GGX refraction
/// branch; `only_refract` forces the latter. The relative index of
/// refraction flips when the lobe is entered from the back face.
#[derive(Copy, Clone, Debug, Default)]
pub struct Transmission {
    /// Roughness of the reflection branch.
    pub reflection_alpha: Float,

    /// Roughness of the refraction branch.
    pub transmission_alpha: Float,

    /// Tint applied to refracted energy.
    pub base_color: Vector3f,

    /// Specular tint at normal incidence.
    pub cspec0: Vector3f,

    /// Index of refraction.
    pub ior: Float,

    /// Lobe weight.
    pub weight: Float,

    /// Suppress the reflection branch entirely.
    pub only_refract: bool,
}

impl Transmission {
    /// Relative index of refraction for the side the outgoing direction is
    /// on.
    fn eta(&self, wo: &Vector3f) -> Float {
        if cos_theta(wo) > 0.0 {
            self.ior
        } else {
            1.0 / self.ior
        }
    }

    /// Evaluates the lobe for a pair of local directions and returns its
    /// value and density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn evaluate(&self, wo: &Vector3f, wi: &Vector3f) -> (Vector3f, Float) {
        let is_reflection = same_hemisphere(wi, wo);
        if self.only_refract && is_reflection {
            return (Vector3f::ZERO, 0.0);
        }

        let eta = self.eta(wo);

        let wh = if is_reflection {
            (*wi + *wo).normalize()
        } else {
            (*wi * eta + *wo).normalize()
        };

        let alpha = if is_reflection {
            self.reflection_alpha
        } else {
            self.transmission_alpha
        };

        // Density of the visible-normal sampler.
        let mut pdf = anisotropic_ggx(&wh, alpha, alpha)
            * anisotropic_smith_g1(wo, &wh, alpha, alpha)
            * abs(wo.dot(&wh) / cos_theta(wo));
        if !(pdf > 0.0) {
            return (Vector3f::ZERO, 0.0);
        }

        let gi = anisotropic_smith_g1(wi, &wh, alpha, alpha);
        let fr = if self.only_refract {
            0.0
        } else {
            fresnel_dielectric_cos(cos_theta(wo), eta)
        };

        if is_reflection {
            pdf *= fr;
            pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

            let f = fresnel_reflection_color(wi, &wh, eta, &self.cspec0);
            (pdf * self.weight * f * Vector3f::splat(gi), pdf)
        } else {
            pdf *= 1.0 - fr;
            pdf *= abs(wi.dot(&wh) / sqr(wi.dot(&wh) + wh.dot(wo) / eta));

            (pdf * self.weight * self.base_color * Vector3f::splat(gi), pdf)
        }
    }

    /// Draws an incident direction: a Fresnel coin flip picks reflection or
    /// refraction, then a visible microfacet normal shapes the branch.
    ///
    /// * `rnd` - The 2D uniform random sample.
    /// * `wo`  - Outgoing direction.
    pub fn sample(&self, rnd: &Vector2f, wo: &Vector3f) -> BsdfSample {
        let eta = self.eta(wo);
        let fr = if self.only_refract {
            0.0
        } else {
            fresnel_dielectric_cos(cos_theta(wo), eta)
        };
        let is_reflection = rnd.x < fr;

        let alpha = if is_reflection {
            self.reflection_alpha
        } else {
            self.transmission_alpha
        };

        // Rescale the consumed dimension so the VNDF draw stays uniform.
        let rnd = if is_reflection {
            Vector2f::new(rnd.x / fr, rnd.y)
        } else {
            Vector2f::new((rnd.x - fr) / (1.0 - fr), rnd.y)
        };

        let wh = sample_ggx_vndf(&rnd, alpha, alpha, wo);
        let mut pdf = anisotropic_ggx(&wh, alpha, alpha)
            * anisotropic_smith_g1(wo, &wh, alpha, alpha)
            * abs(wo.dot(&wh) / cos_theta(wo));

        if !(pdf > 0.0) {
            return BsdfSample::invalid();
        }

        if is_reflection {
            let wi = reflect(&-*wo, &wh);
            if !same_hemisphere(&wi, wo) {
                return BsdfSample::invalid();
            }

            pdf *= fr;
            pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

            let f = fresnel_reflection_color(&wi, &wh, eta, &self.cspec0);
            let gi = anisotropic_smith_g1(&wi, &wh, alpha, alpha);
            let weight = self.weight * f * gi;
            BsdfSample::new(wi, weight, pdf, RayFlags::REFLECTION | RayFlags::GLOSSY)
        } else {
            let wi = refract(&-*wo, &wh, 1.0 / eta);
            if same_hemisphere(&wi, wo) || wi.is_zero() {
                return BsdfSample::invalid();
            }

            pdf *= 1.0 - fr;
            pdf *= abs(wi.dot(&wh) / sqr(wi.dot(&wh) + wh.dot(wo) / eta));

            let gi = anisotropic_smith_g1(&wi, &wh, alpha, alpha);
            let weight = self.weight * self.base_color * gi;
            BsdfSample::new(wi, weight, pdf, RayFlags::TRANSMISSION | RayFlags::GLOSSY)
        }
    }
}
