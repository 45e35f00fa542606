//! Shape (mesh-emissive) light.

use super::{sample_light_face, LightSample};
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::uniform_square_to_triangle_barycentric;
use crate::renderer::{PerInstanceData, SceneGeometry, ShadingContext};

/// An emissive mesh instance promoted to a light source. Sampling picks a
/// face proportional to its emissive area through the precomputed CDF,
/// then a uniform point on the face.
#[derive(Clone, Debug)]
pub struct ShapeLight {
    /// The emissive instance.
    pub instance_index: u32,

    /// Total emissive area of the instance in world space.
    pub emissive_area: Float,
}

impl ShapeLight {
    /// Solid-angle density of hitting the sampled instance at the shaded
    /// point, used to weigh emission picked up by BSDF samples.
    ///
    /// * `shading` - Shading context of a hit on this instance.
    pub fn pdf(&self, shading: &ShadingContext) -> Float {
        if self.emissive_area <= 0.0 {
            return 0.0;
        }
        let g = shading.geometry_term();
        if g <= 0.0 {
            return 0.0;
        }
        1.0 / (g * self.emissive_area)
    }

    /// Samples a point on the instance's emissive surface toward a shading
    /// point.
    ///
    /// * `geometry`    - The mesh tables.
    /// * `instances`   - Instance records.
    /// * `light_faces` - The global per-face CDF table.
    /// * `shading`     - Light shading context, pre-seeded with the
    ///                   receiver's position; populated with the sampled
    ///                   point.
    /// * `prng`        - Random source.
    pub fn sample(
        &self,
        geometry: &SceneGeometry,
        instances: &[PerInstanceData],
        light_faces: &[Float],
        shading: &mut ShadingContext,
        prng: &mut Prng,
    ) -> LightSample {
        if self.emissive_area <= 0.0 {
            return LightSample::invalid();
        }

        let instance = &instances[self.instance_index as usize];
        let cdf_begin = instance.light_face_offset as usize;
        let cdf_end = cdf_begin + instance.light_face_count as usize;
        let cdf = &light_faces[cdf_begin..cdf_end];
        if cdf.is_empty() {
            return LightSample::invalid();
        }

        let (local_face, u_remapped) = sample_light_face(cdf, prng.sample_1d());
        let face_index = instance.face_offset as usize + local_face;

        let i0 = instance.vertex_offset as usize + geometry.vertex_indices[3 * face_index] as usize;
        let i1 =
            instance.vertex_offset as usize + geometry.vertex_indices[3 * face_index + 1] as usize;
        let i2 =
            instance.vertex_offset as usize + geometry.vertex_indices[3 * face_index + 2] as usize;

        let p0 = geometry.vertices[i0];
        let p1 = geometry.vertices[i1];
        let p2 = geometry.vertices[i2];

        let bary = uniform_square_to_triangle_barycentric(&crate::core::geometry::Vector2f::new(
            u_remapped,
            prng.sample_1d(),
        ));
        let w = 1.0 - bary.x - bary.y;
        let local = p0 * bary.x + p1 * bary.y + p2 * w;
        let point = instance.point_transform.transform_point(&local);

        let mut normal = instance
            .normal_transform
            .transform(&(p1 - p0).cross(&(p2 - p0)))
            .normalize();

        let to_light = point - shading.position;
        let distance = to_light.length();
        if !(distance > 0.0) {
            return LightSample::invalid();
        }
        let direction = to_light / distance;

        // Emit from whichever side faces the receiver.
        if normal.dot(&direction) > 0.0 {
            normal = -normal;
        }

        let cos_light = normal.dot(&-direction);
        if !(cos_light > 0.0) {
            return LightSample::invalid();
        }

        // Area density over the emissive surface, converted to solid angle.
        let pdf = sqr(distance) / (cos_light * self.emissive_area);

        let t0 = geometry.texcoords[i0];
        let t1 = geometry.texcoords[i1];
        let t2 = geometry.texcoords[i2];
        let uv = t0 * bary.x + t1 * bary.y + t2 * w;

        let mut sample = LightSample::invalid();
        sample.is_light = false;
        sample.shader_index = geometry.materials[face_index] as usize;
        sample.can_be_hit = true;
        sample.casts_shadows = true;
        sample.direction = direction;
        sample.distance = distance;
        sample.pdf = pdf;
        sample.weight = Vector3f::splat(1.0 / pdf);

        shading.position = point;
        shading.normal = normal;
        shading.true_normal = normal;
        shading.uv = Vector3f::new(uv.x, uv.y, 0.0);
        shading.object = local;
        shading.generated = if instance.bounds_size.is_zero() {
            Vector3f::splat(0.5)
        } else {
            (local - instance.bounds_min) / instance.bounds_size
        };

        sample
    }
}
