//! Shader and data mixing nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::renderer::ShadingContext;

/// Stochastic blend of two shaders.
///
/// Rather than mixing closures analytically, the node consumes the first
/// shader random dimension to pick a branch and rescales the remainder so
/// downstream stochastic nodes still see a uniform value. Drawing a fresh
/// random here would break the low-discrepancy structure of the path
/// sampler.
///
/// Inputs: `fac`, `shader`, `shader_001`. Outputs: `shader`.
#[derive(Clone, Debug, Default)]
pub struct MixShader;

impl MixShader {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let fac = saturate(inputs[0].to_float());

        let selected = if shading.rnd.x < fac {
            shading.rnd.x /= fac;
            inputs[2]
        } else {
            shading.rnd.x = (shading.rnd.x - fac) / (1.0 - fac);
            inputs[1]
        };

        out[0] = Value::Shader(selected.to_shader());
    }
}

/// Stochastic sum of two shaders: an even branch pick whose survivor is
/// doubled to keep the estimator unbiased.
///
/// Inputs: `shader`, `shader_001`. Outputs: `shader`.
#[derive(Clone, Debug, Default)]
pub struct AddShader;

impl AddShader {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let selected = if shading.rnd.x < 0.5 {
            shading.rnd.x /= 0.5;
            inputs[1]
        } else {
            shading.rnd.x = 2.0 * (shading.rnd.x - 0.5);
            inputs[0]
        };

        let mut shader = selected.to_shader();
        shader.weight *= 2.0;
        out[0] = Value::Shader(shader);
    }
}

/// Factor interpretation for the data `Mix` node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MixFactorMode {
    /// One factor for all lanes.
    Uniform,

    /// A per-channel factor for the vector lanes.
    NonUniform,
}

/// Data-typed mix over float, vector and color lanes.
///
/// Inputs: `factor`, `factor vector`, `a float`, `b float`, `a vector`,
/// `b vector`, `a color`, `b color`.
/// Outputs: `result float`, `result vector`, `result color`.
#[derive(Clone, Debug)]
pub struct Mix {
    /// Clamp the factor before mixing.
    pub clamp_factor: bool,

    /// Clamp the color result after mixing.
    pub clamp_result: bool,

    /// Factor interpretation.
    pub factor_mode: MixFactorMode,
}

impl Mix {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let mut factor = inputs[0].to_float();
        let mut factor_vector = inputs[1].to_vector();

        if self.clamp_factor {
            factor = saturate(factor);
            factor_vector = Vector3f::new(
                saturate(factor_vector.x),
                saturate(factor_vector.y),
                saturate(factor_vector.z),
            );
        }

        let a_float = inputs[2].to_float();
        let b_float = inputs[3].to_float();
        let a_vector = inputs[4].to_vector();
        let b_vector = inputs[5].to_vector();
        let a_color = inputs[6].to_color();
        let b_color = inputs[7].to_color();

        let result_vector = match self.factor_mode {
            MixFactorMode::Uniform => lerp(factor, a_vector, b_vector),
            MixFactorMode::NonUniform => a_vector + (b_vector - a_vector) * factor_vector,
        };

        let mut result_color = lerp(factor, a_color, b_color);
        if self.clamp_result {
            result_color = result_color.saturate();
        }

        out[0] = Value::Float(lerp(factor, a_float, b_float));
        out[1] = Value::Vector(result_vector);
        out[2] = Value::Color(result_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector4f;
    use crate::core::reflection::UberBsdf;
    use crate::nodes::EvalContext;

    fn shader_with_emission(e: Float) -> Value {
        Value::Shader(UberBsdf {
            emission: Vector3f::splat(e),
            ..Default::default()
        })
    }

    #[test]
    fn mix_shader_branches_on_rnd() {
        let node = MixShader;
        let mut shading = ShadingContext::default();
        shading.rnd = Vector3f::new(0.2, 0.0, 0.0);

        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Float(0.5),
                shader_with_emission(1.0),
                shader_with_emission(2.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        // rnd.x = 0.2 < fac picks the second branch and rescales.
        assert_eq!(out[0].to_shader().emission.x, 2.0);
        assert!((shading.rnd.x - 0.4).abs() < 1e-6);
    }

    #[test]
    fn mix_shader_rescales_upper_branch() {
        let node = MixShader;
        let mut shading = ShadingContext::default();
        shading.rnd = Vector3f::new(0.75, 0.0, 0.0);

        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Float(0.5),
                shader_with_emission(1.0),
                shader_with_emission(2.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert_eq!(out[0].to_shader().emission.x, 1.0);
        assert!((shading.rnd.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn add_shader_doubles_the_survivor() {
        let node = AddShader;
        let mut shading = ShadingContext::default();
        shading.rnd = Vector3f::new(0.25, 0.0, 0.0);

        let mut out = Outputs::default();
        node.compute(
            &[shader_with_emission(1.0), shader_with_emission(2.0)],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let shader = out[0].to_shader();
        assert_eq!(shader.emission.x, 2.0);
        assert_eq!(shader.weight, 2.0);
        assert!((shading.rnd.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn data_mix_is_linear() {
        let node = Mix {
            clamp_factor: true,
            clamp_result: false,
            factor_mode: MixFactorMode::Uniform,
        };
        let mut shading = ShadingContext::default();
        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Float(0.25),
                Value::Vector(Vector3f::ZERO),
                Value::Float(0.0),
                Value::Float(1.0),
                Value::Vector(Vector3f::ZERO),
                Value::Vector(Vector3f::ONE),
                Value::Color(Vector4f::splat(0.0)),
                Value::Color(Vector4f::splat(1.0)),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert!((out[0].to_float() - 0.25).abs() < 1e-6);
        assert!((out[1].to_vector().x - 0.25).abs() < 1e-6);
        assert!((out[2].to_color().y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_factor_is_saturated() {
        let node = MixShader;
        let mut shading = ShadingContext::default();
        shading.rnd = Vector3f::new(0.5, 0.0, 0.0);

        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Float(2.0),
                shader_with_emission(1.0),
                shader_with_emission(2.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        // A factor above one saturates to one and always picks the second
        // branch.
        assert_eq!(out[0].to_shader().emission.x, 2.0);
    }
}
