//! Acceleration-structure contract.

use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::renderer::ray::{Intersection, Ray, ShadowRay};
use crate::renderer::scene::{PerInstanceData, SceneGeometry};
use rayon::prelude::*;

/// The two operations the wavefront driver consumes from a ray-tracing
/// back end. A report with non-positive distance is a miss.
pub trait Accelerator: Sync {
    /// Finds the closest hit for every ray.
    ///
    /// * `rays` - The ray buffer.
    fn trace_closest(&self, rays: &[Ray]) -> Vec<Intersection>;

    /// Reports whether anything blocks each shadow ray before its maximum
    /// distance. Only the hit/miss decision is meaningful.
    ///
    /// * `rays` - The shadow-ray buffer.
    fn trace_any(&self, rays: &[ShadowRay]) -> Vec<Intersection>;
}

/// A world-space triangle with its provenance.
#[derive(Copy, Clone)]
struct Triangle {
    p0: Vector3f,
    edge1: Vector3f,
    edge2: Vector3f,
    primitive_index: u32,
    instance_index: u32,
}

/// Reference intersector that tests every triangle per ray. Useful for
/// small scenes and for validating a production back end; production
/// rendering is expected to plug in a BVH library behind the same trait.
pub struct BruteForce {
    triangles: Vec<Triangle>,
}

impl BruteForce {
    /// Flattens a scene's instanced geometry into world space.
    ///
    /// * `geometry`  - The mesh tables.
    /// * `instances` - Instance records.
    pub fn new(geometry: &SceneGeometry, instances: &[PerInstanceData]) -> Self {
        let mut triangles = Vec::new();

        for (instance_index, instance) in instances.iter().enumerate() {
            for face in 0..instance.face_count as usize {
                let face_index = instance.face_offset as usize + face;
                let i0 = instance.vertex_offset as usize
                    + geometry.vertex_indices[3 * face_index] as usize;
                let i1 = instance.vertex_offset as usize
                    + geometry.vertex_indices[3 * face_index + 1] as usize;
                let i2 = instance.vertex_offset as usize
                    + geometry.vertex_indices[3 * face_index + 2] as usize;

                let p0 = instance.point_transform.transform_point(&geometry.vertices[i0]);
                let p1 = instance.point_transform.transform_point(&geometry.vertices[i1]);
                let p2 = instance.point_transform.transform_point(&geometry.vertices[i2]);

                triangles.push(Triangle {
                    p0,
                    edge1: p1 - p0,
                    edge2: p2 - p0,
                    primitive_index: face as u32,
                    instance_index: instance_index as u32,
                });
            }
        }

        Self { triangles }
    }

    /// Möller-Trumbore intersection. Returns the hit distance and the
    /// barycentric weights of the second and third vertices.
    fn intersect(
        triangle: &Triangle,
        origin: &Vector3f,
        direction: &Vector3f,
        min_t: Float,
        max_t: Float,
    ) -> Option<(Float, Float, Float)> {
        let pvec = direction.cross(&triangle.edge2);
        let det = triangle.edge1.dot(&pvec);
        if abs(det) < 1e-9 {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = *origin - triangle.p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&triangle.edge1);
        let v = direction.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = triangle.edge2.dot(&qvec) * inv_det;
        if t <= min_t || t >= max_t {
            return None;
        }

        Some((t, u, v))
    }

    fn closest_hit(&self, origin: &Vector3f, direction: &Vector3f, min_t: Float, max_t: Float) -> Intersection {
        let mut best = Intersection::default();
        let mut best_t = max_t;

        for triangle in self.triangles.iter() {
            if let Some((t, u, v)) = Self::intersect(triangle, origin, direction, min_t, best_t) {
                best_t = t;
                best = Intersection {
                    distance: t,
                    primitive_index: triangle.primitive_index,
                    instance_index: triangle.instance_index,
                    // The shading interpolation weighs the vertices as
                    // (u, v, 1-u-v).
                    coordinates: Vector2f::new(1.0 - u - v, u),
                };
            }
        }

        best
    }
}

impl Accelerator for BruteForce {
    fn trace_closest(&self, rays: &[Ray]) -> Vec<Intersection> {
        rays.par_iter()
            .map(|ray| {
                self.closest_hit(
                    &ray.origin,
                    &ray.direction,
                    max(ray.min_distance, 0.0),
                    ray.max_distance,
                )
            })
            .collect()
    }

    fn trace_any(&self, rays: &[ShadowRay]) -> Vec<Intersection> {
        rays.par_iter()
            .map(|ray| {
                for triangle in self.triangles.iter() {
                    if let Some((t, u, v)) = Self::intersect(
                        triangle,
                        &ray.origin,
                        &ray.direction,
                        max(ray.min_distance, 0.0),
                        ray.max_distance,
                    ) {
                        return Intersection {
                            distance: t,
                            primitive_index: triangle.primitive_index,
                            instance_index: triangle.instance_index,
                            coordinates: Vector2f::new(1.0 - u - v, u),
                        };
                    }
                }
                Intersection::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Prng;
    use crate::renderer::ray::RayFlags;

    fn floor_scene() -> (SceneGeometry, Vec<PerInstanceData>) {
        let geometry = SceneGeometry {
            vertices: vec![
                Vector3f::new(-1.0, -1.0, 0.0),
                Vector3f::new(1.0, -1.0, 0.0),
                Vector3f::new(1.0, 1.0, 0.0),
                Vector3f::new(-1.0, 1.0, 0.0),
            ],
            vertex_normals: vec![Vector3f::new(0.0, 0.0, 1.0); 4],
            vertex_indices: vec![0, 1, 2, 0, 2, 3],
            texcoords: vec![Vector2f::ZERO; 4],
            materials: vec![0, 0],
        };
        let instance = PerInstanceData {
            face_count: 2,
            ..Default::default()
        };
        (geometry, vec![instance])
    }

    fn ray_down_from(origin: Vector3f) -> Ray {
        Ray {
            origin,
            min_distance: 0.0,
            direction: Vector3f::new(0.0, 0.0, -1.0),
            max_distance: INFINITY,
            prng: Prng::new(0, 0),
            weight: Vector3f::ONE,
            x: 0,
            y: 0,
            depth: 0,
            flags: RayFlags::CAMERA,
            bsdf_pdf: INFINITY,
        }
    }

    #[test]
    fn hits_report_distance_and_barycentrics() {
        let (geometry, instances) = floor_scene();
        let accel = BruteForce::new(&geometry, &instances);

        let hits = accel.trace_closest(&[ray_down_from(Vector3f::new(0.2, -0.3, 2.0))]);
        assert!(!hits[0].is_miss());
        assert!((hits[0].distance - 2.0).abs() < 1e-5);

        let c = hits[0].coordinates;
        let w = 1.0 - c.x - c.y;
        assert!(c.x >= 0.0 && c.y >= 0.0 && w >= -1e-5);
    }

    #[test]
    fn misses_report_nonpositive_distance() {
        let (geometry, instances) = floor_scene();
        let accel = BruteForce::new(&geometry, &instances);
        let hits = accel.trace_closest(&[ray_down_from(Vector3f::new(5.0, 5.0, 2.0))]);
        assert!(hits[0].is_miss());
    }

    #[test]
    fn hit_point_reconstructs_from_barycentrics() {
        let (geometry, instances) = floor_scene();
        let accel = BruteForce::new(&geometry, &instances);
        let origin = Vector3f::new(0.4, 0.1, 3.0);
        let hits = accel.trace_closest(&[ray_down_from(origin)]);
        let isect = hits[0];

        let face = isect.primitive_index as usize;
        let i0 = geometry.vertex_indices[3 * face] as usize;
        let i1 = geometry.vertex_indices[3 * face + 1] as usize;
        let i2 = geometry.vertex_indices[3 * face + 2] as usize;
        let w = 1.0 - isect.coordinates.x - isect.coordinates.y;
        let p = geometry.vertices[i0] * isect.coordinates.x
            + geometry.vertices[i1] * isect.coordinates.y
            + geometry.vertices[i2] * w;
        assert!((p - Vector3f::new(0.4, 0.1, 0.0)).length() < 1e-4);
    }

    #[test]
    fn shadow_rays_respect_max_distance() {
        let (geometry, instances) = floor_scene();
        let accel = BruteForce::new(&geometry, &instances);

        let shadow = ShadowRay {
            origin: Vector3f::new(0.0, 0.0, 2.0),
            min_distance: 0.0,
            direction: Vector3f::new(0.0, 0.0, -1.0),
            max_distance: 1.0,
            weight: Vector3f::ONE,
            x: 0,
            y: 0,
        };
        assert!(accel.trace_any(&[shadow])[0].is_miss());

        let shadow = ShadowRay {
            max_distance: 3.0,
            ..shadow
        };
        assert!(!accel.trace_any(&[shadow])[0].is_miss());
    }
}
