//! Clearcoat lobe.

use super::*;
use crate::core::geometry::{reflect, Vector2f, Vector3f};
use crate::core::microfacet::*;
use crate::core::pbrt::*;

/// Fresnel reflectance of the coat at normal incidence.
const COAT_F0: Float = 0.04;

/// Index of refraction of the coat.
const COAT_IOR: Float = 1.5;

/// A thin GGX reflection layer over the base material with a fixed
/// polyurethane-like Fresnel response, scaled by a quarter.
#[derive(Copy, Clone, Debug, Default)]
pub struct Clearcoat {
    /// Isotropic roughness of the coat.
    pub alpha: Float,

    /// Lobe weight.
    pub weight: Float,
}

impl Clearcoat {
    /// Evaluates the lobe for a pair of local directions and returns its
    /// value and density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn evaluate(&self, wo: &Vector3f, wi: &Vector3f) -> (Vector3f, Float) {
        let wh = (*wi + *wo).normalize();

        let mut pdf = anisotropic_ggx(&wh, self.alpha, self.alpha)
            * anisotropic_smith_g1(wo, &wh, self.alpha, self.alpha)
            * abs(wo.dot(&wh) / cos_theta(wo));
        if !(pdf > 0.0) {
            return (Vector3f::ZERO, 0.0);
        }

        pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

        let f = fresnel_reflection_color(wi, &wh, COAT_IOR, &Vector3f::splat(COAT_F0));
        let g = anisotropic_smith_g1(wi, &wh, self.alpha, self.alpha)
            * anisotropic_smith_g1(wo, &wh, self.alpha, self.alpha);
        let d = anisotropic_ggx(&wh, self.alpha, self.alpha);
        (0.25 * f * (d * g / abs(4.0 * cos_theta(wo))), pdf)
    }

    /// Draws an incident direction by visible-normal sampling and
    /// reflecting.
    ///
    /// * `rnd` - The 2D uniform random sample.
    /// * `wo`  - Outgoing direction.
    pub fn sample(&self, rnd: &Vector2f, wo: &Vector3f) -> BsdfSample {
        let wh = sample_ggx_vndf(rnd, self.alpha, self.alpha, wo);
        let mut pdf = anisotropic_ggx(&wh, self.alpha, self.alpha)
            * anisotropic_smith_g1(wo, &wh, self.alpha, self.alpha)
            * abs(wo.dot(&wh) / cos_theta(wo));

        if !(pdf > 0.0) {
            return BsdfSample::invalid();
        }

        let wi = reflect(&-*wo, &wh);
        if !same_hemisphere(&wi, wo) {
            return BsdfSample::invalid();
        }

        pdf *= 1.0 / abs(4.0 * wo.dot(&wh));

        let f = fresnel_reflection_color(&wi, &wh, COAT_IOR, &Vector3f::splat(COAT_F0));
        let gi = smith_g1(&wi, &wh, self.alpha);
        let weight = 0.25 * self.weight * f * gi;
        BsdfSample::new(wi, weight, pdf, RayFlags::REFLECTION | RayFlags::GLOSSY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Prng;

    #[test]
    fn coat_reflects_into_upper_hemisphere() {
        let lobe = Clearcoat {
            alpha: 0.05,
            weight: 1.0,
        };
        let wo = Vector3f::new(0.4, 0.3, 0.87).normalize();
        let mut prng = Prng::new(12, 0);
        for _ in 0..128 {
            let sample = lobe.sample(&prng.sample_2d(), &wo);
            if sample.is_valid() {
                assert!(same_hemisphere(&sample.wi, &wo));
            }
        }
    }

    #[test]
    fn coat_energy_is_quartered() {
        // At normal incidence the Fresnel term sits near F0, so the sampled
        // weight must stay well below 0.25.
        let lobe = Clearcoat {
            alpha: 0.1,
            weight: 1.0,
        };
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut prng = Prng::new(13, 0);
        for _ in 0..64 {
            let sample = lobe.sample(&prng.sample_2d(), &wo);
            if sample.is_valid() {
                assert!(sample.weight.max_component() <= 0.25);
            }
        }
    }
}
