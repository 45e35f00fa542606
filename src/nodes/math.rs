//! Scalar and vector math nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::geometry::{euler_to_matrix, Vector3f};
use crate::core::pbrt::*;
use crate::renderer::ShadingContext;

/// Scalar operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    MultiplyAdd,
    Power,
    Minimum,
    Maximum,
    Tangent,
    LessThan,
    GreaterThan,
    Modulo,
}

/// Scalar math with optional output clamping.
///
/// Inputs: `value`, `value_001`, `value_002`. Outputs: `value`.
#[derive(Clone, Debug)]
pub struct Math {
    /// The operation.
    pub op: MathOp,

    /// Clamp the result to [0, 1].
    pub clamp: bool,
}

impl Math {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let a = inputs[0].to_float();
        let b = inputs[1].to_float();
        let c = inputs[2].to_float();

        let mut value = match self.op {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide => safe_divide(a, b, 0.0),
            MathOp::MultiplyAdd => a * b + c,
            MathOp::Power => a.powf(b),
            MathOp::Minimum => min(a, b),
            MathOp::Maximum => max(a, b),
            MathOp::Tangent => tan(a),
            MathOp::LessThan => {
                if a < b {
                    1.0
                } else {
                    0.0
                }
            }
            MathOp::GreaterThan => {
                if a > b {
                    1.0
                } else {
                    0.0
                }
            }
            MathOp::Modulo => a % b,
        };

        if self.clamp {
            value = saturate(value);
        }

        out[0] = Value::Float(value);
    }
}

/// Vector operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VectorMathOp {
    Add,
    Subtract,
    Multiply,
    MultiplyAdd,
    Normalize,
    Scale,
    Minimum,
    Length,
    DotProduct,
}

/// Vector math.
///
/// Inputs: `vector`, `vector_001`, `vector_002`, `scale`.
/// Outputs: `vector`, `value`.
#[derive(Clone, Debug)]
pub struct VectorMath {
    /// The operation.
    pub op: VectorMathOp,
}

impl VectorMath {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let a = inputs[0].to_vector();
        let b = inputs[1].to_vector();
        let c = inputs[2].to_vector();
        let scale = inputs[3].to_float();

        let mut vector = a;
        let mut value = 0.0;

        match self.op {
            VectorMathOp::Add => vector = a + b,
            VectorMathOp::Subtract => vector = a - b,
            VectorMathOp::Multiply => vector = a * b,
            VectorMathOp::MultiplyAdd => vector = a * b + c,
            VectorMathOp::Normalize => vector = a.normalize(),
            VectorMathOp::Scale => vector = a * scale,
            VectorMathOp::Minimum => vector = a.min(&b),
            VectorMathOp::Length => value = a.length(),
            VectorMathOp::DotProduct => {
                value = a.dot(&b);
                vector = Vector3f::splat(value);
            }
        }

        out[0] = Value::Vector(vector);
        out[1] = Value::Float(value);
    }
}

/// Point transform: scale, rotate with intrinsic XYZ Euler angles, then
/// translate.
///
/// Inputs: `vector`, `location`, `rotation`, `scale`. Outputs: `vector`.
#[derive(Clone, Debug, Default)]
pub struct Mapping;

impl Mapping {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let vector = inputs[0].to_vector();
        let location = inputs[1].to_vector();
        let rotation = inputs[2].to_vector();
        let scale = inputs[3].to_vector();

        out[0] = Value::Vector(euler_to_matrix(&rotation).transform(&(vector * scale)) + location);
    }
}

/// Splits a vector into coordinates.
///
/// Inputs: `vector`. Outputs: `x`, `y`, `z`.
#[derive(Clone, Debug, Default)]
pub struct SeparateVector;

impl SeparateVector {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let v = inputs[0].to_vector();
        out[0] = Value::Float(v.x);
        out[1] = Value::Float(v.y);
        out[2] = Value::Float(v.z);
    }
}

/// Builds a vector from coordinates.
///
/// Inputs: `x`, `y`, `z`. Outputs: `vector`.
#[derive(Clone, Debug, Default)]
pub struct CombineVector;

impl CombineVector {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(Vector3f::new(
            inputs[0].to_float(),
            inputs[1].to_float(),
            inputs[2].to_float(),
        ));
    }
}

/// Linear range remapping with optional clamping of the interpolation
/// parameter.
///
/// Inputs: `value`, `from min`, `from max`, `to min`, `to max`.
/// Outputs: `result`.
#[derive(Clone, Debug)]
pub struct MapRange {
    /// Clamp the interpolation parameter to [0, 1].
    pub clamp: bool,
}

impl MapRange {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let value = inputs[0].to_float();
        let from_min = inputs[1].to_float();
        let from_max = inputs[2].to_float();
        let to_min = inputs[3].to_float();
        let to_max = inputs[4].to_float();

        let mut t = (value - from_min) / (from_max - from_min);
        if self.clamp {
            t = saturate(t);
        }
        out[0] = Value::Float(lerp(t, to_min, to_max));
    }
}
