//! Light sample records.

use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;

/// Shader and flags shared by every analytic light kind.
#[derive(Copy, Clone, Debug)]
pub struct LightInfo {
    /// Index of the light's emission shader.
    pub shader_index: usize,

    /// Whether the light's contribution is blocked by occluders.
    pub casts_shadows: bool,

    /// Whether BSDF samples can hit the light, making it a MIS partner.
    pub uses_mis: bool,
}

impl Default for LightInfo {
    fn default() -> Self {
        Self {
            shader_index: 0,
            casts_shadows: true,
            uses_mis: false,
        }
    }
}

/// The outcome of sampling a light for next-event estimation. The weight
/// already contains the geometric coupling and the reciprocal density; the
/// light pool multiplies in the shader's emission.
#[derive(Copy, Clone, Debug)]
pub struct LightSample {
    /// True when the sample came from an analytic light with a light
    /// shader, false for mesh emitters that use a surface shader.
    pub is_light: bool,

    /// Emission shader to evaluate at the sampled point.
    pub shader_index: usize,

    /// Whether BSDF samples can hit this light.
    pub can_be_hit: bool,

    /// Whether occlusion should be tested.
    pub casts_shadows: bool,

    /// Premultiplied sample weight, before emission.
    pub weight: Vector3f,

    /// Density of the sample in solid angle.
    pub pdf: Float,

    /// Direction from the shading point toward the light.
    pub direction: Vector3f,

    /// Distance to the sampled point, infinite for directional sources.
    pub distance: Float,
}

impl LightSample {
    /// Create a sample pre-populated from a light's shared info.
    ///
    /// * `info` - The light's shader and flags.
    pub fn from_info(info: &LightInfo) -> Self {
        Self {
            is_light: true,
            shader_index: info.shader_index,
            can_be_hit: info.uses_mis,
            casts_shadows: info.casts_shadows,
            weight: Vector3f::ZERO,
            pdf: 0.0,
            direction: Vector3f::ZERO,
            distance: 0.0,
        }
    }

    /// The rejected sample: zero weight and density.
    pub fn invalid() -> Self {
        Self {
            is_light: false,
            shader_index: 0,
            can_be_hit: false,
            casts_shadows: false,
            weight: Vector3f::ZERO,
            pdf: 0.0,
            direction: Vector3f::ZERO,
            distance: 0.0,
        }
    }

    /// Returns true if the sample can contribute.
    pub fn is_valid(&self) -> bool {
        !self.weight.is_zero() && self.weight.is_finite()
    }
}
