//! Geometry and attribute source nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::color::luminance;
use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::pbrt::*;
use crate::core::reflection::RayFlags;
use crate::renderer::ShadingContext;

/// Surface geometry outputs.
///
/// Outputs: `normal`, `true normal`, `tangent`, `position`, `parametric`,
/// `incoming`, `random per island`, `backfacing`.
#[derive(Clone, Debug, Default)]
pub struct NewGeometry;

impl NewGeometry {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(shading.normal);
        out[1] = Value::Vector(shading.true_normal);
        out[2] = Value::Vector(shading.tu);
        out[3] = Value::Vector(shading.position);
        out[4] = Value::Vector(shading.uv);
        out[5] = Value::Vector(shading.wo);
        out[6] = Value::Float(0.0);
        out[7] = Value::Float(if shading.wo.dot(&shading.normal) < 0.0 {
            1.0
        } else {
            0.0
        });
    }
}

/// Texture coordinate sources.
///
/// Outputs: `generated`, `uv`, `object`, `normal`, `reflection`.
#[derive(Clone, Debug, Default)]
pub struct TextureCoordinate;

impl TextureCoordinate {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(shading.generated);
        out[1] = Value::Vector(shading.uv);
        out[2] = Value::Vector(shading.object);
        out[3] = Value::Vector(shading.normal);
        out[4] = Value::Vector(shading.normal);
    }
}

/// The active UV map.
///
/// Outputs: `uv`.
#[derive(Clone, Debug, Default)]
pub struct UvMapCoordinate;

impl UvMapCoordinate {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(shading.uv);
    }
}

/// Named mesh attribute lookup. Only the generated coordinate survives
/// into the flattened mesh tables, so that is what the vector socket
/// reads.
///
/// Outputs: `vector`, `color`.
#[derive(Clone, Debug, Default)]
pub struct Attribute {
    /// Attribute name, kept for diagnostics.
    pub name: String,
}

impl Attribute {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(shading.generated);
        out[1] = Value::Color(Vector4f::ONE);
    }
}

/// Object metadata. Unsupported; returns neutral values.
///
/// Outputs: `object index`, `random`, `location`.
#[derive(Clone, Debug, Default)]
pub struct ObjectInfo;

impl ObjectInfo {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(0.0);
        out[1] = Value::Float(0.0);
        out[2] = Value::Vector(Vector3f::ZERO);
    }
}

/// Boolean classification of the arriving ray.
///
/// Outputs: `is camera ray`, `is reflection ray`, `is transmission ray`,
/// `is shadow ray`, `is diffuse ray`, `is glossy ray`, `is singular ray`,
/// `ray length`.
#[derive(Clone, Debug, Default)]
pub struct LightPath;

impl LightPath {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let flags = shading.ray_flags;
        let flag = |f: RayFlags| Value::Float(if flags.contains(f) { 1.0 } else { 0.0 });

        out[0] = flag(RayFlags::CAMERA);
        out[1] = flag(RayFlags::REFLECTION);
        out[2] = flag(RayFlags::TRANSMISSION);
        out[3] = flag(RayFlags::SHADOW);
        out[4] = flag(RayFlags::DIFFUSE);
        // Singular events read as glossy.
        out[5] = Value::Float(
            if flags.contains(RayFlags::GLOSSY) || flags.contains(RayFlags::SINGULAR) {
                1.0
            } else {
                0.0
            },
        );
        out[6] = flag(RayFlags::SINGULAR);
        out[7] = Value::Float(shading.distance);
    }
}

/// Light falloff curves. Only the quadratic falloff is meaningful to a
/// physically based integrator, and it is the identity.
///
/// Inputs: `strength`, `smooth`. Outputs: `quadratic`.
#[derive(Clone, Debug, Default)]
pub struct LightFalloff;

impl LightFalloff {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(1.0);
    }
}

/// Particle metadata. Unsupported.
///
/// Outputs: `random`.
#[derive(Clone, Debug, Default)]
pub struct ParticleInfo;

impl ParticleInfo {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(0.0);
    }
}

/// Vertex color lookup. Unsupported; returns white.
///
/// Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct VertexColor;

impl VertexColor {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::ONE);
    }
}

/// Ambient occlusion. Unsupported; reports fully unoccluded.
///
/// Inputs: `color`, `distance`, `normal`. Outputs: `color`, `ao`.
#[derive(Clone, Debug, Default)]
pub struct AmbientOcclusion;

impl AmbientOcclusion {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(inputs[0].to_color());
        out[1] = Value::Float(1.0);
    }
}

/// A constant scalar.
///
/// Outputs: `value`.
#[derive(Clone, Debug, Default)]
pub struct ValueNode {
    /// The constant.
    pub value: Float,
}

impl ValueNode {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(self.value);
    }
}

/// A constant color.
///
/// Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct RgbNode {
    /// The constant.
    pub color: Vector4f,
}

impl RgbNode {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(self.color);
    }
}

/// Converts a color to its luminance.
///
/// Inputs: `color`. Outputs: `val`.
#[derive(Clone, Debug, Default)]
pub struct RgbToBw;

impl RgbToBw {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(luminance(&inputs[0].to_color().xyz()));
    }
}
