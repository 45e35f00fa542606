//! Compiled material table.

use super::{EvalContext, MaterialGraph};
use crate::core::reflection::UberBsdf;
use crate::renderer::ShadingContext;

/// The compiled shader programs of a scene, addressed by integer index.
/// Surface programs shade geometry and the world; light programs shade
/// analytic light sources.
#[derive(Default)]
pub struct MaterialRegistry {
    /// Surface and world programs.
    surfaces: Vec<MaterialGraph>,

    /// Light programs.
    lights: Vec<MaterialGraph>,
}

impl MaterialRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface program and returns its index.
    ///
    /// * `graph` - The compiled graph.
    pub fn add_surface(&mut self, graph: MaterialGraph) -> usize {
        self.surfaces.push(graph);
        self.surfaces.len() - 1
    }

    /// Registers a light program and returns its index.
    ///
    /// * `graph` - The compiled graph.
    pub fn add_light(&mut self, graph: MaterialGraph) -> usize {
        self.lights.push(graph);
        self.lights.len() - 1
    }

    /// Number of surface programs.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Evaluates a surface program into the shading context. Unknown
    /// indices shade to the inert default material.
    ///
    /// * `index`   - Program index.
    /// * `ctx`     - Evaluation resources.
    /// * `shading` - The shading context.
    pub fn shade_surface(&self, index: usize, ctx: &EvalContext, shading: &mut ShadingContext) {
        shading.material = UberBsdf::default();
        match self.surfaces.get(index) {
            Some(graph) => graph.evaluate(ctx, shading),
            None => warn!("surface shader {index} out of range"),
        }
    }

    /// Evaluates a light program into the shading context.
    ///
    /// * `index`   - Program index.
    /// * `ctx`     - Evaluation resources.
    /// * `shading` - The shading context.
    pub fn shade_light(&self, index: usize, ctx: &EvalContext, shading: &mut ShadingContext) {
        shading.material = UberBsdf::default();
        match self.lights.get(index) {
            Some(graph) => graph.evaluate(ctx, shading),
            None => warn!("light shader {index} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Vector3f, Vector4f};
    use crate::nodes::*;

    fn emitter(strength: f32) -> MaterialGraph {
        MaterialGraph::build(vec![
            Node::new(
                NodeKind::Emission(Emission),
                vec![
                    Binding::color(Vector4f::ONE),
                    Binding::float(strength),
                ],
            ),
            Node::new(NodeKind::OutputLight(OutputLight), vec![Binding::link(0, 0)]),
        ])
        .unwrap()
    }

    #[test]
    fn light_programs_shade_to_emission() {
        let mut registry = MaterialRegistry::new();
        let index = registry.add_light(emitter(3.0));

        let mut shading = ShadingContext::default();
        registry.shade_light(index, &EvalContext::empty(), &mut shading);
        assert_eq!(shading.material.emission, Vector3f::splat(3.0));
        assert_eq!(shading.material.alpha, 0.0);
    }

    #[test]
    fn stale_material_state_is_reset() {
        let registry = MaterialRegistry::new();
        let mut shading = ShadingContext::default();
        shading.material.emission = Vector3f::splat(9.0);
        registry.shade_surface(0, &EvalContext::empty(), &mut shading);
        assert_eq!(shading.material.emission, Vector3f::ZERO);
    }
}
