//! Layered Uber BSDF.

use super::*;
use crate::core::geometry::{Frame, Vector3f};
use crate::core::pbrt::*;

/// The composite material every shader graph evaluates down to: four lobes
/// with selection probabilities, an opacity term for null scattering,
/// emission, and an overall weight.
///
/// Lobe probabilities are non-negative and sum to at most one. When a
/// sampled lobe's probability is below one, sampling re-evaluates the whole
/// material at the drawn direction so the returned density is correct for
/// multiple importance sampling.
#[derive(Copy, Clone, Debug)]
pub struct UberBsdf {
    /// Shading normal the lobes operate around.
    pub normal: Vector3f,

    /// Selection probability per lobe, in lobe order.
    pub lobe_probabilities: [Float; 4],

    /// Diffuse and sheen lobe.
    pub diffuse: Diffuse,

    /// Anisotropic specular lobe.
    pub specular: Specular,

    /// Glass transmission lobe.
    pub transmission: Transmission,

    /// Clearcoat lobe.
    pub clearcoat: Clearcoat,

    /// Opacity. Rays pass through unchanged with probability `1 - alpha`.
    pub alpha: Float,

    /// Tint applied by a null-scattering event.
    pub alpha_weight: Vector3f,

    /// Emitted radiance.
    pub emission: Vector3f,

    /// Overall weight multiplier.
    pub weight: Float,
}

impl Default for UberBsdf {
    fn default() -> Self {
        Self {
            normal: Vector3f::new(0.0, 0.0, 1.0),
            lobe_probabilities: [0.0; 4],
            diffuse: Diffuse::default(),
            specular: Specular::default(),
            transmission: Transmission::default(),
            clearcoat: Clearcoat::default(),
            alpha: 1.0,
            alpha_weight: Vector3f::ONE,
            emission: Vector3f::ZERO,
            weight: 1.0,
        }
    }
}

impl UberBsdf {
    /// Evaluates the material for a pair of world-space directions. Returns
    /// the integrand value (BSDF times incident cosine) and the density the
    /// sampler would have produced the incident direction with.
    ///
    /// * `wo`         - World-space outgoing direction.
    /// * `wi`         - World-space incident direction.
    /// * `sh_normal`  - Shading normal.
    /// * `geo_normal` - Geometric normal.
    pub fn evaluate(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        sh_normal: &Vector3f,
        geo_normal: &Vector3f,
    ) -> (Vector3f, Float) {
        let frame = Frame::from_z(sh_normal);

        // Directions on opposite sides of the shading and geometric normals
        // contribute nothing.
        let wo_dot_geo = wo.dot(geo_normal);
        let wo = frame.to_local(wo);
        if cos_theta(&wo) * wo_dot_geo < 0.0 {
            return (Vector3f::ZERO, 0.0);
        }

        let wi_dot_geo = wi.dot(geo_normal);
        let wi = frame.to_local(wi);
        if cos_theta(&wi) * wi_dot_geo < 0.0 {
            return (Vector3f::ZERO, 0.0);
        }

        self.evaluate_local(&wo, &wi)
    }

    /// Evaluates the material for directions already in the shading frame.
    ///
    /// * `wo` - Local outgoing direction.
    /// * `wi` - Local incident direction.
    pub fn evaluate_local(&self, wo: &Vector3f, wi: &Vector3f) -> (Vector3f, Float) {
        let mut value = Vector3f::ZERO;
        let mut pdf = 0.0;

        if self.lobe_probabilities[0] > 0.0 {
            let (v, p) = self.diffuse.evaluate(wo, wi);
            value += v;
            pdf += self.lobe_probabilities[0] * p;
        }
        if self.lobe_probabilities[1] > 0.0 {
            let (v, p) = self.specular.evaluate(wo, wi);
            value += v;
            pdf += self.lobe_probabilities[1] * p;
        }
        if self.lobe_probabilities[2] > 0.0 {
            let (v, p) = self.transmission.evaluate(wo, wi);
            value += v;
            pdf += self.lobe_probabilities[2] * p;
        }
        if self.lobe_probabilities[3] > 0.0 {
            let (v, p) = self.clearcoat.evaluate(wo, wi);
            value += v;
            pdf += self.lobe_probabilities[3] * p;
        }

        (value * (self.weight * self.alpha), pdf * self.alpha)
    }

    /// Samples a scattering event.
    ///
    /// The first random dimension drives the opacity test and lobe
    /// selection; the remaining two drive the selected lobe. A failed
    /// opacity test produces a null-scattering sample that continues the ray
    /// unchanged in direction, tinted by `alpha_weight`, and marked
    /// singular.
    ///
    /// * `rnd`        - Three uniform random dimensions.
    /// * `wo`         - World-space outgoing direction.
    /// * `sh_normal`  - Shading normal.
    /// * `geo_normal` - Geometric normal.
    /// * `prev_flags` - Ray kind of the arriving ray.
    pub fn sample(
        &self,
        rnd: &Vector3f,
        wo: &Vector3f,
        sh_normal: &Vector3f,
        geo_normal: &Vector3f,
        prev_flags: RayFlags,
    ) -> BsdfSample {
        let mut u = rnd.x;
        if u < self.alpha {
            u /= self.alpha;
        } else {
            return BsdfSample::new(
                -*wo,
                self.alpha_weight * self.weight,
                INFINITY,
                prev_flags | RayFlags::SINGULAR,
            );
        }

        let frame = Frame::from_z(sh_normal);

        let wo_dot_geo = wo.dot(geo_normal);
        let wo_local = frame.to_local(wo);
        if cos_theta(&wo_local) * wo_dot_geo < 0.0 {
            return BsdfSample::invalid();
        }

        // Cumulative search over the lobe probabilities.
        let p = &self.lobe_probabilities;
        let rnd2 = crate::core::geometry::Vector2f::new(rnd.y, rnd.z);
        let (selected, mut sample) = if u < p[0] {
            (0, self.diffuse.sample(&rnd2, &wo_local))
        } else if u < p[0] + p[1] {
            (1, self.specular.sample(&rnd2, &wo_local))
        } else if u < p[0] + p[1] + p[2] {
            (2, self.transmission.sample(&rnd2, &wo_local))
        } else {
            (3, self.clearcoat.sample(&rnd2, &wo_local))
        };

        if !p[selected].is_finite() {
            return BsdfSample::invalid();
        }
        if !(sample.pdf > 0.0) {
            return BsdfSample::invalid();
        }

        if p[selected] < 1.0 {
            // MIS needs the density and value of the entire material, not
            // just the sampled lobe.
            let (value, pdf) = self.evaluate_local(&wo_local, &sample.wi);
            if !(pdf > 0.0) {
                return BsdfSample::invalid();
            }
            sample.weight = value / pdf;
            sample.pdf = pdf;
        } else {
            sample.pdf *= self.alpha;
            sample.weight *= self.weight * self.alpha;
        }

        let wi_dot_sh = cos_theta(&sample.wi);
        sample.wi = frame.to_world(&sample.wi);
        if wi_dot_sh * sample.wi.dot(geo_normal) < 0.0 {
            return BsdfSample::invalid();
        }
        if !sample.weight.is_finite() {
            return BsdfSample::invalid();
        }

        sample
    }

    /// Probability-weighted reflectance tint, the quantity the albedo
    /// output channel visualizes for denoising.
    pub fn albedo(&self) -> Vector3f {
        let p = &self.lobe_probabilities;
        let surface = p[0] * self.diffuse.diffuse_weight
            + p[1] * self.specular.cspec0
            + p[2] * self.transmission.base_color
            + p[3] * Vector3f::splat(0.25 * self.clearcoat.weight);
        self.alpha * self.weight * surface + (1.0 - self.alpha) * self.alpha_weight
    }

    /// Roughness exposed by the roughness output channel.
    pub fn roughness(&self) -> Float {
        self.specular.alpha_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Prng;

    fn diffuse_uber(albedo: Vector3f) -> UberBsdf {
        UberBsdf {
            lobe_probabilities: [1.0, 0.0, 0.0, 0.0],
            diffuse: Diffuse {
                diffuse_weight: albedo,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn null_scattering_is_idempotent() {
        let bsdf = UberBsdf {
            alpha: 0.0,
            alpha_weight: Vector3f::new(0.2, 0.4, 0.8),
            ..Default::default()
        };
        let wo = Vector3f::new(0.3, 0.2, 0.93).normalize();
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let prev = RayFlags::TRANSMISSION | RayFlags::GLOSSY;
        let mut prng = Prng::new(0, 0);
        for _ in 0..16 {
            let sample = bsdf.sample(&prng.sample_3d(), &wo, &n, &n, prev);
            assert_eq!(sample.wi, -wo);
            assert_eq!(sample.pdf, INFINITY);
            assert_eq!(sample.weight, Vector3f::new(0.2, 0.4, 0.8));
            assert_eq!(sample.flags, prev | RayFlags::SINGULAR);
        }
    }

    #[test]
    fn hemisphere_inconsistency_is_rejected() {
        let bsdf = diffuse_uber(Vector3f::ONE);
        // Shading normal tilted so far that wo crosses the geometric
        // halfspace boundary.
        let sh = Vector3f::new(0.995, 0.0, 0.0995).normalize();
        let geo = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(-0.4, 0.0, 0.9165).normalize();
        let sample = bsdf.sample(&Vector3f::new(0.5, 0.5, 0.5), &wo, &sh, &geo, RayFlags::CAMERA);
        assert!(!sample.is_valid());
    }

    #[test]
    fn evaluate_sums_lobe_densities() {
        let bsdf = UberBsdf {
            lobe_probabilities: [0.5, 0.5, 0.0, 0.0],
            diffuse: Diffuse {
                diffuse_weight: Vector3f::splat(0.5),
                ..Default::default()
            },
            specular: Specular {
                alpha_x: 0.2,
                alpha_y: 0.2,
                cspec0: Vector3f::splat(0.9),
                ior: 1.45,
                weight: 1.0,
            },
            ..Default::default()
        };
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.2, 0.1, 0.97).normalize();
        let wi = Vector3f::new(-0.3, 0.2, 0.93).normalize();
        let (_, pdf) = bsdf.evaluate(&wo, &wi, &n, &n);

        let (_, d_pdf) = bsdf.diffuse.evaluate(&wo, &wi);
        let (_, s_pdf) = bsdf.specular.evaluate(&wo, &wi);
        assert!((pdf - 0.5 * (d_pdf + s_pdf)).abs() < 1e-5);
    }

    #[test]
    fn estimator_weight_is_value_over_pdf() {
        let bsdf = UberBsdf {
            lobe_probabilities: [0.6, 0.4, 0.0, 0.0],
            diffuse: Diffuse {
                diffuse_weight: Vector3f::splat(0.7),
                ..Default::default()
            },
            specular: Specular {
                alpha_x: 0.3,
                alpha_y: 0.3,
                cspec0: Vector3f::splat(0.8),
                ior: 1.45,
                weight: 1.0,
            },
            ..Default::default()
        };
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.1, -0.2, 0.97).normalize();
        let mut prng = Prng::new(21, 0);
        for _ in 0..128 {
            let sample = bsdf.sample(&prng.sample_3d(), &wo, &n, &n, RayFlags::CAMERA);
            if !sample.is_valid() || sample.pdf == INFINITY {
                continue;
            }
            let (value, pdf) = bsdf.evaluate(&wo, &sample.wi, &n, &n);
            assert!((pdf - sample.pdf).abs() / sample.pdf < 1e-3);
            assert!((value / pdf - sample.weight).length() < 1e-3);
        }
    }

    #[test]
    fn furnace_bound_holds_for_mixture() {
        // ∫ f cosθ dω ≤ 1 for an emission-free material with unit tints.
        let bsdf = UberBsdf {
            lobe_probabilities: [0.5, 0.5, 0.0, 0.0],
            diffuse: Diffuse {
                diffuse_weight: Vector3f::ONE,
                ..Default::default()
            },
            specular: Specular {
                alpha_x: 0.16,
                alpha_y: 0.16,
                cspec0: Vector3f::ONE,
                ior: 1.45,
                weight: 1.0,
            },
            ..Default::default()
        };
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.3, 0.0, 0.954).normalize();
        let mut prng = Prng::new(77, 0);
        let samples = 200_000;
        let mut total = Vector3f::ZERO;
        for _ in 0..samples {
            let sample = bsdf.sample(&prng.sample_3d(), &wo, &n, &n, RayFlags::CAMERA);
            if sample.is_valid() && sample.pdf != INFINITY {
                total += sample.weight;
            }
        }
        let mean = total / samples as Float;
        assert!(mean.max_component() <= 1.05, "mean {mean:?}");
    }

    #[test]
    fn albedo_blends_opacity() {
        let mut bsdf = diffuse_uber(Vector3f::splat(0.5));
        bsdf.alpha = 0.5;
        bsdf.alpha_weight = Vector3f::ONE;
        let a = bsdf.albedo();
        assert!((a.x - 0.75).abs() < 1e-6);
    }
}
