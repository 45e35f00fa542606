//! Orthonormal bases.

use super::Vector3f;
use crate::core::pbrt::*;

/// An orthonormal basis with `z` aligned to a chosen direction. Shading
/// computations run in this frame with the surface normal along +z.
#[derive(Copy, Clone, Debug)]
pub struct Frame {
    /// Tangent axis.
    pub x: Vector3f,

    /// Bitangent axis.
    pub y: Vector3f,

    /// Normal axis.
    pub z: Vector3f,
}

impl Frame {
    /// Build a frame around a unit vector using the branchless listing from
    /// "Building an Orthonormal Basis, Revisited" [Duff et al. 2017].
    ///
    /// * `n` - The unit vector to align `z` with.
    pub fn from_z(n: &Vector3f) -> Self {
        let sign = 1.0_f32.copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        Self {
            x: Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
            y: Vector3f::new(b, sign + n.y * n.y * a, -n.y),
            z: *n,
        }
    }

    /// Build a frame from explicit axes. The axes are assumed orthonormal.
    ///
    /// * `x` - Tangent axis.
    /// * `y` - Bitangent axis.
    /// * `z` - Normal axis.
    pub fn from_axes(x: Vector3f, y: Vector3f, z: Vector3f) -> Self {
        Self { x, y, z }
    }

    /// Express a world-space vector in this frame.
    ///
    /// * `v` - The world-space vector.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    /// Express a frame-local vector in world space.
    ///
    /// * `v` - The local vector.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

/// Nudges a shading normal so that the reflection of the viewing direction
/// stays above the geometric surface. Interpolated or mapped normals can
/// otherwise reflect rays into the surface. This is the Cycles construction.
///
/// * `ng` - Geometric normal.
/// * `i`  - Direction toward the viewer.
/// * `n`  - Shading normal.
pub fn ensure_valid_reflection(ng: &Vector3f, i: &Vector3f, n: &Vector3f) -> Vector3f {
    let r = 2.0 * n.dot(i) * *n - *i;

    let threshold = min(0.9 * ng.dot(i), 0.01);
    if ng.dot(&r) >= threshold {
        return *n;
    }

    let n_dot_ng = n.dot(ng);
    let x = (*n - n_dot_ng * *ng).normalize();

    let ix = i.dot(&x);
    let iz = i.dot(ng);
    let ix2 = sqr(ix);
    let iz2 = sqr(iz);
    let a = ix2 + iz2;

    let b = safe_sqrt(ix2 * (a - sqr(threshold)));
    let c = iz * threshold + a;

    // Two candidate Z components of the corrected normal.
    let fac = 0.5 / a;
    let n1_z2 = fac * (b + c);
    let n2_z2 = fac * (-b + c);
    let mut valid1 = n1_z2 > 1e-5 && n1_z2 <= 1.0 + 1e-5;
    let mut valid2 = n2_z2 > 1e-5 && n2_z2 <= 1.0 + 1e-5;

    let n_new = if valid1 && valid2 {
        let n1 = (safe_sqrt(1.0 - n1_z2), safe_sqrt(n1_z2));
        let n2 = (safe_sqrt(1.0 - n2_z2), safe_sqrt(n2_z2));

        let r1 = 2.0 * (n1.0 * ix + n1.1 * iz) * n1.1 - iz;
        let r2 = 2.0 * (n2.0 * ix + n2.1 * iz) * n2.1 - iz;

        valid1 = r1 >= 1e-5;
        valid2 = r2 >= 1e-5;
        if valid1 && valid2 {
            if r1 < r2 {
                n1
            } else {
                n2
            }
        } else if r1 > r2 {
            n1
        } else {
            n2
        }
    } else if valid1 || valid2 {
        let nz2 = if valid1 { n1_z2 } else { n2_z2 };
        (safe_sqrt(1.0 - nz2), safe_sqrt(nz2))
    } else {
        return *ng;
    };

    n_new.0 * x + n_new.1 * *ng
}
