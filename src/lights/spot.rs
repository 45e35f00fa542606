//! Spot light.

use super::{LightInfo, LightSample};
use crate::core::geometry::{Frame, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::uniform_square_to_disk;
use crate::renderer::ShadingContext;

/// A point-like emitter restricted to a cone, with a smooth falloff band
/// inside the cone edge. The builder premultiplies the cone parameters:
/// `spot_size` stores the cosine of the half angle and `spot_blend` the
/// width of the falloff band in cosine terms.
#[derive(Clone, Debug)]
pub struct SpotLight {
    /// Shader and flags.
    pub info: LightInfo,

    /// Location of the emitter.
    pub location: Vector3f,

    /// Axis the cone opens around, away from the light.
    pub direction: Vector3f,

    /// Radius for soft shadows; zero for a true point.
    pub radius: Float,

    /// Emitted color, premultiplied by power.
    pub color: Vector3f,

    /// Cosine of the cone's half angle.
    pub spot_size: Float,

    /// Width of the falloff band in cosine terms.
    pub spot_blend: Float,
}

impl SpotLight {
    /// Samples the light toward a shading point, applying the cone
    /// attenuation.
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

        // Attenuation from the angle between the cone axis and the
        // direction toward the receiver.
        let cos_to_receiver = (-direction).dot(&self.direction);
        let attenuation = smoothstep(0.0, self.spot_blend, cos_to_receiver - self.spot_size);
        if attenuation == 0.0 {
            return LightSample::invalid();
        }

        let g = 1.0 / sqr(distance);

        let mut sample = LightSample::from_info(&self.info);
        sample.direction = direction;
        sample.distance = distance;
        sample.pdf = 1.0;
        sample.weight = self.color * (g * INV_FOUR_PI * attenuation);

        shading.position = point;
        shading.normal = self.direction;
        shading.true_normal = self.direction;
        shading.uv = Vector3f::ZERO;
        shading.object = point - self.location;
        shading.generated = direction;

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_spot() -> SpotLight {
        SpotLight {
            info: LightInfo::default(),
            location: Vector3f::new(0.0, 0.0, 2.0),
            direction: Vector3f::new(0.0, 0.0, -1.0),
            radius: 0.0,
            color: Vector3f::splat(FOUR_PI),
            // Half angle of 45 degrees with a thin blend band.
            spot_size: 0.7071,
            spot_blend: 0.05,
        }
    }

    #[test]
    fn receiver_on_axis_is_lit() {
        let light = down_spot();
        let mut prng = Prng::new(1, 0);
        let mut shading = ShadingContext::default();
        shading.position = Vector3f::ZERO;
        let sample = light.sample(&mut shading, &mut prng);
        assert!(sample.is_valid());
        // Full attenuation inside the blend band.
        assert!((sample.weight.x - 0.25).abs() < 1e-4);
    }

    #[test]
    fn receiver_outside_cone_is_dark() {
        let light = down_spot();
        let mut prng = Prng::new(2, 0);
        let mut shading = ShadingContext::default();
        shading.position = Vector3f::new(5.0, 0.0, 2.0);
        let sample = light.sample(&mut shading, &mut prng);
        assert!(!sample.is_valid());
    }

    #[test]
    fn blend_band_attenuates_smoothly() {
        let mut light = down_spot();
        light.spot_blend = 0.3;
        let mut prng = Prng::new(3, 0);

        // A receiver inside the blend band, off the cone axis.
        let mut edge = ShadingContext::default();
        edge.position = Vector3f::new(1.0, 0.0, 0.0);
        let s_edge = light.sample(&mut edge, &mut prng);
        assert!(s_edge.is_valid());

        let mut center = ShadingContext::default();
        center.position = Vector3f::ZERO;
        let s_center = light.sample(&mut center, &mut prng);

        let edge_mean = s_edge.weight.mean() * sqr(s_edge.distance);
        let center_mean = s_center.weight.mean() * sqr(s_center.distance);
        assert!(edge_mean < center_mean);
    }
}
