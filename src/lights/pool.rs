//! The light pool.

use super::{AreaLight, LightSample, PointLight, ShapeLight, SpotLight, SunLight, WorldLight};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::nodes::{EvalContext, MaterialRegistry};
use crate::renderer::{PerInstanceData, SceneGeometry, ShadingContext};

/// All light sources of a scene. Selection is uniform over the sources;
/// the environment always occupies index zero, followed by the analytic
/// kinds in a fixed order and the mesh emitters last.
pub struct Lights {
    /// The environment light.
    pub world: WorldLight,

    /// Area lights.
    pub area_lights: Vec<AreaLight>,

    /// Point lights.
    pub point_lights: Vec<PointLight>,

    /// Sun lights.
    pub sun_lights: Vec<SunLight>,

    /// Spot lights.
    pub spot_lights: Vec<SpotLight>,

    /// Mesh emitters.
    pub shape_lights: Vec<ShapeLight>,

    /// Per-face CDF table shared by all mesh emitters.
    pub light_faces: Vec<Float>,
}

impl Lights {
    /// A pool with only the environment.
    ///
    /// * `world` - The environment light.
    pub fn with_world(world: WorldLight) -> Self {
        Self {
            world,
            area_lights: Vec::new(),
            point_lights: Vec::new(),
            sun_lights: Vec::new(),
            spot_lights: Vec::new(),
            shape_lights: Vec::new(),
            light_faces: Vec::new(),
        }
    }

    /// Total number of selectable light sources.
    pub fn total(&self) -> usize {
        1 + self.area_lights.len()
            + self.point_lights.len()
            + self.sun_lights.len()
            + self.spot_lights.len()
            + self.shape_lights.len()
    }

    /// Density of producing a direction by sampling the environment
    /// through this pool.
    ///
    /// * `direction` - The world-space direction.
    pub fn envmap_pdf(&self, direction: &crate::core::geometry::Vector3f) -> Float {
        self.world.pdf(direction) / self.total() as Float
    }

    /// Density of producing a hit on an emissive instance by sampling its
    /// shape light through this pool.
    ///
    /// * `instance` - The hit instance.
    /// * `shading`  - Shading context of the hit.
    pub fn shape_pdf(&self, instance: &PerInstanceData, shading: &ShadingContext) -> Float {
        match self.shape_lights.get(instance.light_index as usize) {
            Some(light) => light.pdf(shading) / self.total() as Float,
            None => 0.0,
        }
    }

    /// Samples one light source for next-event estimation.
    ///
    /// A source is picked uniformly; its kind-specific sampler produces a
    /// direction and premultiplied weight, the light's emission shader is
    /// evaluated at the sampled point, and a throughput-based survival
    /// roulette prunes negligible samples early.
    ///
    /// * `geometry`  - Mesh tables, for shape lights.
    /// * `instances` - Instance records, for shape lights.
    /// * `registry`  - Compiled materials.
    /// * `ctx`       - Evaluation resources.
    /// * `shading`   - Shading context of the receiving surface.
    /// * `prng`      - Random source.
    pub fn sample(
        &self,
        geometry: &SceneGeometry,
        instances: &[PerInstanceData],
        registry: &MaterialRegistry,
        ctx: &EvalContext,
        shading: &ShadingContext,
        prng: &mut Prng,
    ) -> LightSample {
        let total = self.total();
        let mut index = prng.sample_int(total);

        let mut light_shading = ShadingContext {
            ray_flags: shading.ray_flags,
            position: shading.position,
            rnd: prng.sample_3d(),
            ..Default::default()
        };

        let mut sample = if index == 0 {
            self.sample_envmap(&mut light_shading, prng)
        } else {
            index -= 1;
            if index < self.area_lights.len() {
                self.area_lights[index].sample(&mut light_shading, prng)
            } else {
                index -= self.area_lights.len();
                if index < self.point_lights.len() {
                    self.point_lights[index].sample(&mut light_shading, prng)
                } else {
                    index -= self.point_lights.len();
                    if index < self.sun_lights.len() {
                        self.sun_lights[index].sample(&mut light_shading, prng)
                    } else {
                        index -= self.sun_lights.len();
                        if index < self.spot_lights.len() {
                            self.spot_lights[index].sample(&mut light_shading, prng)
                        } else {
                            index -= self.spot_lights.len();
                            match self.shape_lights.get(index) {
                                Some(light) => light.sample(
                                    geometry,
                                    instances,
                                    &self.light_faces,
                                    &mut light_shading,
                                    prng,
                                ),
                                None => return LightSample::invalid(),
                            }
                        }
                    }
                }
            }
        };

        light_shading.wo = -sample.direction;
        if !sample.weight.is_zero() {
            if sample.is_light {
                registry.shade_light(sample.shader_index, ctx, &mut light_shading);
            } else {
                registry.shade_surface(sample.shader_index, ctx, &mut light_shading);
            }
            sample.weight *= light_shading.material.emission;
        }

        sample.weight *= total as Float;
        sample.pdf /= total as Float;

        // Survival roulette on near-zero contributions.
        let survival = saturate(4.0 * sample.weight.mean());
        if survival < 1.0 {
            if prng.sample_1d() < survival {
                sample.weight /= survival;
            } else {
                sample.weight = crate::core::geometry::Vector3f::ZERO;
            }
        }

        sample
    }

    /// Samples the environment light.
    fn sample_envmap(&self, shading: &mut ShadingContext, prng: &mut Prng) -> LightSample {
        let (direction, pdf) = self.world.sample(&prng.sample_2d());
        if !(pdf > 0.0) {
            return LightSample::invalid();
        }

        let mut sample = LightSample::invalid();
        sample.is_light = true;
        sample.shader_index = self.world.shader_index;
        sample.casts_shadows = true;
        sample.can_be_hit = true;
        sample.direction = direction;
        sample.distance = INFINITY;
        sample.pdf = pdf;
        sample.weight = crate::core::geometry::Vector3f::splat(1.0 / pdf);

        shading.position = -direction;
        shading.normal = -direction;
        shading.true_normal = -direction;
        shading.generated = direction;
        shading.object = direction;
        shading.uv = crate::core::geometry::Vector3f::ZERO;

        sample
    }
}
