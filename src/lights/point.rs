//! Point light.

use super::{LightInfo, LightSample};
use crate::core::geometry::{Frame, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::uniform_square_to_disk;
use crate::renderer::ShadingContext;

/// An omnidirectional emitter, optionally widened to a sphere of the given
/// radius for soft shadows.
#[derive(Clone, Debug)]
pub struct PointLight {
    /// Shader and flags.
    pub info: LightInfo,

    /// Center of the light.
    pub location: Vector3f,

    /// Radius for soft shadows; zero for a true point.
    pub radius: Float,

    /// Emitted color, premultiplied by power.
    pub color: Vector3f,
}

impl PointLight {
    /// Samples the light toward a shading point. A positive radius jitters
    /// the target on the disk facing the receiver.
    ///
    /// * `shading` - Light shading context, pre-seeded with the receiver's
    ///               position; populated with the sampled point.
    /// * `prng`    - Random source.
    pub fn sample(&self, shading: &mut ShadingContext, prng: &mut Prng) -> LightSample {
        let mut point = self.location;

        let to_light = point - shading.position;
        let center_distance = to_light.length();
        if !(center_distance > 0.0) {
            return LightSample::invalid();
        }
        let axis = to_light / center_distance;

        if self.radius > 0.0 {
            let frame = Frame::from_z(&axis);
            let d = uniform_square_to_disk(&prng.sample_2d()) * self.radius;
            point += frame.x * d.x + frame.y * d.y;
        }

        let to_light = point - shading.position;
        let distance = to_light.length();
        let direction = to_light / distance;

        let g = 1.0 / sqr(distance);

        let mut sample = LightSample::from_info(&self.info);
        sample.direction = direction;
        sample.distance = distance;
        sample.pdf = 1.0;
        sample.weight = self.color * (g * INV_FOUR_PI);

        shading.position = point;
        shading.normal = -direction;
        shading.true_normal = -direction;
        shading.uv = Vector3f::ZERO;
        shading.object = point - self.location;
        shading.generated = direction;

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_is_inverse_square() {
        let light = PointLight {
            info: LightInfo::default(),
            location: Vector3f::new(0.0, 0.0, 1.0),
            radius: 0.0,
            color: Vector3f::splat(FOUR_PI),
        };
        let mut prng = Prng::new(1, 0);

        let mut near = ShadingContext::default();
        near.position = Vector3f::ZERO;
        let s1 = light.sample(&mut near, &mut prng);
        assert!((s1.weight.x - 1.0).abs() < 1e-5);
        assert!((s1.distance - 1.0).abs() < 1e-6);

        let mut far = ShadingContext::default();
        far.position = Vector3f::new(0.0, 0.0, -1.0);
        let s2 = light.sample(&mut far, &mut prng);
        assert!((s2.weight.x - 0.25).abs() < 1e-5);
    }

    #[test]
    fn radius_spreads_samples() {
        let light = PointLight {
            info: LightInfo::default(),
            location: Vector3f::new(0.0, 0.0, 4.0),
            radius: 0.5,
            color: Vector3f::ONE,
        };
        let mut prng = Prng::new(7, 0);
        let mut seen_offset = false;
        for _ in 0..32 {
            let mut shading = ShadingContext::default();
            shading.position = Vector3f::ZERO;
            let _ = light.sample(&mut shading, &mut prng);
            let offset = (shading.position - light.location).length();
            assert!(offset <= 0.5 + 1e-5);
            if offset > 1e-3 {
                seen_offset = true;
            }
        }
        assert!(seen_offset);
    }
}
