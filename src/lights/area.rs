//! Area light.

use super::{LightInfo, LightSample};
use crate::core::geometry::{Matrix4x4, Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::uniform_square_to_disk;
use crate::renderer::ShadingContext;

/// A rectangle or disk emitter positioned by an affine transform. The unit
/// shape is the square `[-1/2, 1/2]²` in the transform's xy-plane; circular
/// lights inscribe a disk of radius one half, with the area difference
/// premultiplied into the color by the scene builder.
#[derive(Clone, Debug)]
pub struct AreaLight {
    /// Shader and flags.
    pub info: LightInfo,

    /// Placement of the unit emitter shape.
    pub transform: Matrix4x4,

    /// Emitted color, premultiplied by power and shape normalization.
    pub color: Vector3f,

    /// Emit from the inscribed disk instead of the square.
    pub is_circular: bool,
}

impl AreaLight {
    /// Samples a point on the emitter toward a shading point.
    ///
    /// * `shading` - Light shading context, pre-seeded with the receiver's
    ///               position; populated with the sampled point.
    /// * `prng`    - Random source.
    pub fn sample(&self, shading: &mut ShadingContext, prng: &mut Prng) -> LightSample {
        let rnd = prng.sample_2d();

        let local = if self.is_circular {
            let d = uniform_square_to_disk(&rnd) * 0.5;
            Vector3f::new(d.x, d.y, 0.0)
        } else {
            Vector3f::new(rnd.x - 0.5, rnd.y - 0.5, 0.0)
        };

        let point = self.transform.transform_point(&local);
        let normal = self
            .transform
            .transform_vector(&Vector3f::new(0.0, 0.0, 1.0))
            .normalize();

        let to_light = point - shading.position;
        let distance = to_light.length();
        if !(distance > 0.0) {
            return LightSample::invalid();
        }
        let direction = to_light / distance;

        // Geometric factor of the emitting side.
        let g = max(0.0, normal.dot(&-direction)) / sqr(distance);

        let mut sample = LightSample::from_info(&self.info);
        sample.direction = direction;
        sample.distance = distance;
        sample.pdf = 1.0;
        sample.weight = self.color * (0.25 * g);

        shading.position = point;
        shading.normal = normal;
        shading.true_normal = normal;
        shading.uv = Vector3f::new(rnd.x, rnd.y, 0.0);
        shading.object = local;
        shading.generated = local + Vector3f::splat(0.5);

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_light() -> AreaLight {
        AreaLight {
            info: LightInfo::default(),
            transform: Matrix4x4::translate(&Vector3f::new(0.0, 0.0, 2.0)),
            color: Vector3f::splat(4.0),
            is_circular: false,
        }
    }

    #[test]
    fn faces_below_receive_light() {
        let light = unit_light();
        let mut prng = Prng::new(1, 0);
        let mut shading = ShadingContext::default();
        shading.position = Vector3f::ZERO;

        // The light's +z normal points away from the origin, so the
        // geometric factor is zero from below...
        let sample = light.sample(&mut shading, &mut prng);
        assert_eq!(sample.weight, Vector3f::ZERO);
    }

    #[test]
    fn inverse_square_falloff() {
        let mut light = unit_light();
        // Flip the light to face the origin.
        light.transform = Matrix4x4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 2.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        let mut prng = Prng::new(2, 0);
        let mut near = ShadingContext::default();
        near.position = Vector3f::ZERO;
        let s_near = light.sample(&mut near, &mut prng);

        let mut far = ShadingContext::default();
        far.position = Vector3f::new(0.0, 0.0, -2.0);
        let s_far = light.sample(&mut far, &mut prng);

        assert!(s_near.weight.mean() > s_far.weight.mean());
        assert!(s_near.is_valid());
        assert_eq!(s_near.pdf, 1.0);
    }

    #[test]
    fn sampled_point_lands_on_the_light() {
        let light = unit_light();
        let mut prng = Prng::new(3, 0);
        for _ in 0..32 {
            let mut shading = ShadingContext::default();
            shading.position = Vector3f::new(0.3, -0.2, 5.0);
            let sample = light.sample(&mut shading, &mut prng);
            assert!((shading.position.z - 2.0).abs() < 1e-6);
            assert!(shading.position.x.abs() <= 0.5);
            assert!(shading.position.y.abs() <= 0.5);
            assert!(sample.distance > 0.0);
        }
    }
}
