//! Sun light.

use super::{LightInfo, LightSample};
use crate::core::geometry::{Frame, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::uniform_sample_cone;
use crate::renderer::ShadingContext;

/// A directional emitter with a finite angular size. Sampling jitters the
/// direction inside the sun's cone; the distance is infinite.
#[derive(Clone, Debug)]
pub struct SunLight {
    /// Shader and flags.
    pub info: LightInfo,

    /// Direction from the scene toward the sun.
    pub direction: Vector3f,

    /// Cosine of the sun's angular radius.
    pub cos_angle: Float,

    /// Emitted color, premultiplied by power.
    pub color: Vector3f,
}

impl SunLight {
    /// Samples a direction inside the sun's cone.
    ///
    /// * `shading` - Light shading context; populated with a virtual point
    ///               in the sampled direction.
    /// * `prng`    - Random source.
    pub fn sample(&self, shading: &mut ShadingContext, prng: &mut Prng) -> LightSample {
        let frame = Frame::from_z(&self.direction);
        let direction = frame.to_world(&uniform_sample_cone(&prng.sample_2d(), self.cos_angle));

        let mut sample = LightSample::from_info(&self.info);
        sample.direction = direction;
        sample.distance = INFINITY;
        sample.pdf = 1.0;
        sample.weight = self.color;

        shading.position = -direction;
        shading.normal = -direction;
        shading.true_normal = -direction;
        shading.uv = Vector3f::ZERO;
        shading.object = direction;
        shading.generated = direction;

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_stay_in_the_cone() {
        let axis = Vector3f::new(0.3, 0.4, 0.866).normalize();
        let light = SunLight {
            info: LightInfo::default(),
            direction: axis,
            cos_angle: 0.9995,
            color: Vector3f::ONE,
        };
        let mut prng = Prng::new(5, 0);
        for _ in 0..64 {
            let mut shading = ShadingContext::default();
            let sample = light.sample(&mut shading, &mut prng);
            assert!(sample.direction.dot(&axis) >= light.cos_angle - 1e-5);
            assert_eq!(sample.distance, INFINITY);
            assert_eq!(sample.weight, Vector3f::ONE);
        }
    }
}
