//! Shading context.

use crate::core::geometry::{ensure_valid_reflection, Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::reflection::{RayFlags, UberBsdf};
use crate::core::rng::Prng;
use crate::renderer::ray::{Intersection, Ray};
use crate::renderer::scene::{PerInstanceData, SceneGeometry};

/// Everything a material shader can read about the point being shaded,
/// assembled from the intersection record and the mesh tables. Shader
/// evaluation fills in `material`.
#[derive(Clone)]
pub struct ShadingContext {
    /// Interpolated texture coordinates, stored in xy.
    pub uv: Vector3f,

    /// World-space hit position.
    pub position: Vector3f,

    /// Object-local position normalized into the instance bounds.
    pub generated: Vector3f,

    /// Object-local position.
    pub object: Vector3f,

    /// Interpolated shading normal.
    pub normal: Vector3f,

    /// Geometric normal of the hit triangle, flipped toward `wo`.
    pub true_normal: Vector3f,

    /// Tangent along increasing u.
    pub tu: Vector3f,

    /// Tangent along increasing v.
    pub tv: Vector3f,

    /// Random dimensions reserved for stochastic shader nodes.
    pub rnd: Vector3f,

    /// Direction away from the hit point, toward the previous vertex.
    pub wo: Vector3f,

    /// Distance the ray covered to reach this hit.
    pub distance: Float,

    /// Kind of the arriving ray.
    pub ray_flags: RayFlags,

    /// The material the shader graph produced for this point.
    pub material: UberBsdf,
}

impl Default for ShadingContext {
    fn default() -> Self {
        Self {
            uv: Vector3f::ZERO,
            position: Vector3f::ZERO,
            generated: Vector3f::ZERO,
            object: Vector3f::ZERO,
            normal: Vector3f::new(0.0, 0.0, 1.0),
            true_normal: Vector3f::new(0.0, 0.0, 1.0),
            tu: Vector3f::new(1.0, 0.0, 0.0),
            tv: Vector3f::new(0.0, 1.0, 0.0),
            rnd: Vector3f::ZERO,
            wo: Vector3f::new(0.0, 0.0, 1.0),
            distance: 0.0,
            ray_flags: RayFlags::empty(),
            material: UberBsdf::default(),
        }
    }
}

/// Barycentric interpolation over a triangle's attributes.
///
/// * `a`           - Attribute at the first vertex.
/// * `b`           - Attribute at the second vertex.
/// * `c`           - Attribute at the third vertex.
/// * `barycentric` - The (u, v) coordinates; w is implicit.
fn interpolate<T>(a: T, b: T, c: T, barycentric: &Vector2f) -> T
where
    T: std::ops::Mul<Float, Output = T> + std::ops::Add<T, Output = T>,
{
    let u = barycentric.x;
    let v = barycentric.y;
    let w = 1.0 - u - v;
    a * u + b * v + c * w
}

impl ShadingContext {
    /// Assembles the context for a surface hit. Returns the context and the
    /// material index of the hit face.
    ///
    /// * `geometry` - The mesh tables.
    /// * `instance` - The hit instance.
    /// * `isect`    - The intersection record.
    /// * `ray`      - The ray that produced the hit.
    /// * `prng`     - Random state to reserve shader dimensions from.
    pub fn from_hit(
        geometry: &SceneGeometry,
        instance: &PerInstanceData,
        isect: &Intersection,
        ray: &Ray,
        prng: &mut Prng,
    ) -> (Self, usize) {
        let face_index = instance.face_offset as usize + isect.primitive_index as usize;
        let i0 = instance.vertex_offset as usize
            + geometry.vertex_indices[3 * face_index] as usize;
        let i1 = instance.vertex_offset as usize
            + geometry.vertex_indices[3 * face_index + 1] as usize;
        let i2 = instance.vertex_offset as usize
            + geometry.vertex_indices[3 * face_index + 2] as usize;

        let p0 = geometry.vertices[i0];
        let p1 = geometry.vertices[i1];
        let p2 = geometry.vertices[i2];

        let local = interpolate(p0, p1, p2, &isect.coordinates);
        let position = instance.point_transform.transform_point(&local);

        let normal = instance
            .normal_transform
            .transform(&interpolate(
                geometry.vertex_normals[i0],
                geometry.vertex_normals[i1],
                geometry.vertex_normals[i2],
                &isect.coordinates,
            ))
            .normalize();

        let mut true_normal = instance
            .normal_transform
            .transform(&(p1 - p2).cross(&(p0 - p2)))
            .normalize();

        let t0 = geometry.texcoords[i0];
        let t1 = geometry.texcoords[i1];
        let t2 = geometry.texcoords[i2];
        let uv = interpolate(t0, t1, t2, &isect.coordinates);

        // Tangents from the derivative of position with respect to the
        // texture parameterization.
        let (tu, tv) = tangents_from_uv(
            &instance.point_transform.transform_vector(&(p0 - p2)),
            &instance.point_transform.transform_vector(&(p1 - p2)),
            &(t0 - t2),
            &(t1 - t2),
            &normal,
        );

        let wo = -ray.direction;
        if true_normal.dot(&wo) < 0.0 {
            true_normal = -true_normal;
        }

        let generated = if instance.bounds_size.is_zero() {
            Vector3f::splat(0.5)
        } else {
            (local - instance.bounds_min) / instance.bounds_size
        };

        let ctx = Self {
            uv: Vector3f::new(uv.x, uv.y, 0.0),
            position,
            generated,
            object: local,
            normal,
            true_normal,
            tu,
            tv,
            rnd: prng.sample_3d(),
            wo,
            distance: isect.distance,
            ray_flags: ray.flags,
            material: UberBsdf::default(),
        };

        (ctx, geometry.materials[face_index] as usize)
    }

    /// Assembles the context for an environment lookup in a direction.
    ///
    /// * `direction` - The world-space direction being looked up.
    /// * `ray_flags` - Kind of the ray performing the lookup.
    /// * `rnd`       - Random dimensions for stochastic shader nodes.
    pub fn for_environment(direction: &Vector3f, ray_flags: RayFlags, rnd: Vector3f) -> Self {
        Self {
            uv: Vector3f::ZERO,
            position: -*direction,
            generated: *direction,
            object: *direction,
            normal: -*direction,
            true_normal: -*direction,
            rnd,
            wo: -*direction,
            distance: INFINITY,
            ray_flags,
            ..Default::default()
        }
    }

    /// The geometric coupling factor between this point and the previous
    /// path vertex.
    pub fn geometry_term(&self) -> Float {
        abs(self.wo.dot(&self.true_normal)) / sqr(self.distance)
    }

    /// The shading normal the BSDF frame should use, nudged so reflections
    /// of `wo` cannot enter the surface.
    pub fn shading_normal(&self) -> Vector3f {
        ensure_valid_reflection(&self.true_normal, &self.wo, &self.material.normal)
    }
}

/// Derives surface tangents from the position and texture-coordinate bases
/// of a triangle. Falls back to an arbitrary frame when the
/// parameterization is degenerate.
fn tangents_from_uv(
    dp02: &Vector3f,
    dp12: &Vector3f,
    duv02: &Vector2f,
    duv12: &Vector2f,
    normal: &Vector3f,
) -> (Vector3f, Vector3f) {
    let determinant = duv02.x * duv12.y - duv02.y * duv12.x;
    if abs(determinant) < 1e-8 {
        let frame = crate::core::geometry::Frame::from_z(normal);
        return (frame.x, frame.y);
    }

    let inv_det = 1.0 / determinant;
    let tu = (*dp02 * duv12.y - *dp12 * duv02.y) * inv_det;
    let tv = (*dp12 * duv02.x - *dp02 * duv12.x) * inv_det;

    let tu = if tu.length_squared() > 0.0 {
        tu.normalize()
    } else {
        crate::core::geometry::Frame::from_z(normal).x
    };
    let tv = if tv.length_squared() > 0.0 {
        tv.normalize()
    } else {
        normal.cross(&tu)
    };
    (tu, tv)
}
