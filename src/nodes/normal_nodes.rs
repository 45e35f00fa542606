//! Normal and displacement nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::renderer::ShadingContext;

/// Space the mapped normal is expressed in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NormalMapSpace {
    /// Relative to the surface tangent frame.
    Tangent,

    /// Already in world space; used as-is.
    World,
}

/// Decodes an RGB normal map and blends it toward the surface normal by
/// strength.
///
/// Inputs: `color`, `strength`. Outputs: `normal`.
#[derive(Clone, Debug)]
pub struct NormalMap {
    /// Space of the encoded normal.
    pub space: NormalMapSpace,
}

impl NormalMap {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color();
        let strength = max(inputs[1].to_float(), 0.0);

        let mut normal = (2.0 * color.xyz() - Vector3f::ONE).normalize();
        normal = strength * normal + (1.0 - strength) * Vector3f::new(0.0, 0.0, 1.0);
        normal = normal.normalize();

        let normal = match self.space {
            NormalMapSpace::Tangent => {
                normal.x * shading.tu + normal.y * shading.tv + normal.z * shading.normal
            }
            NormalMapSpace::World => normal,
        };

        out[0] = Value::Vector(normal);
    }
}

/// Bump mapping from a height input. Unsupported; passes the surface
/// normal through.
///
/// Inputs: `height`, `distance`, `strength`, `normal`. Outputs: `normal`.
#[derive(Clone, Debug, Default)]
pub struct Bump;

impl Bump {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(shading.normal);
    }
}

/// Displacement output. Unsupported; produces no offset.
///
/// Inputs: `height`, `midlevel`, `scale`, `normal`. Outputs:
/// `displacement`.
#[derive(Clone, Debug, Default)]
pub struct Displacement;

impl Displacement {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Vector(Vector3f::ZERO);
    }
}

/// Dot product against the surface normal. Unsupported; reads as fully
/// aligned.
///
/// Inputs: `normal`. Outputs: `dot`.
#[derive(Clone, Debug, Default)]
pub struct NormalProduct;

impl NormalProduct {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector4f;
    use crate::nodes::EvalContext;

    #[test]
    fn flat_map_returns_surface_normal() {
        let node = NormalMap {
            space: NormalMapSpace::Tangent,
        };
        let mut shading = ShadingContext::default();
        shading.normal = Vector3f::new(0.0, 0.0, 1.0);
        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Color(Vector4f::new(0.5, 0.5, 1.0, 1.0)),
                Value::Float(1.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let n = out[0].to_vector();
        assert!((n - shading.normal).length() < 1e-4);
    }

    #[test]
    fn zero_strength_ignores_the_map() {
        let node = NormalMap {
            space: NormalMapSpace::Tangent,
        };
        let mut shading = ShadingContext::default();
        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Color(Vector4f::new(1.0, 0.5, 0.5, 1.0)),
                Value::Float(0.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let n = out[0].to_vector();
        assert!((n - shading.normal).length() < 1e-4);
    }

    #[test]
    fn tangent_space_x_tilts_along_tu() {
        let node = NormalMap {
            space: NormalMapSpace::Tangent,
        };
        let mut shading = ShadingContext::default();
        let mut out = Outputs::default();
        node.compute(
            &[
                Value::Color(Vector4f::new(1.0, 0.5, 0.5, 1.0)),
                Value::Float(1.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let n = out[0].to_vector();
        assert!(n.x > 0.5);
    }
}
