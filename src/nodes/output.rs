//! Output nodes.

use super::{EvalContext, Outputs, Value};
use crate::renderer::ShadingContext;

/// Terminal node of a surface material: writes the surface shader into the
/// shading context. The volume and displacement sockets are accepted but
/// unsupported.
///
/// Inputs: `surface`, `volume`, `displacement`.
#[derive(Clone, Debug, Default)]
pub struct OutputMaterial;

impl OutputMaterial {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        _out: &mut Outputs,
    ) {
        shading.material = inputs[0].to_shader();
    }
}

/// Terminal node of a world material.
///
/// Inputs: `surface`.
#[derive(Clone, Debug, Default)]
pub struct OutputWorld;

impl OutputWorld {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        _out: &mut Outputs,
    ) {
        shading.material = inputs[0].to_shader();
    }
}

/// Terminal node of a light material: lights never scatter, so the shader
/// reduces to its emission behind a fully transparent surface.
///
/// Inputs: `surface`.
#[derive(Clone, Debug, Default)]
pub struct OutputLight;

impl OutputLight {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        _out: &mut Outputs,
    ) {
        let surface = inputs[0].to_shader();
        shading.material.alpha = 0.0;
        shading.material.emission = surface.emission;
    }
}
