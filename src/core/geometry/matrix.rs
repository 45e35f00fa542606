//! 3x3 and 4x4 matrices.

use super::Vector3f;
use crate::core::pbrt::*;
use std::ops::Mul;

/// A row-major 3x3 matrix, used for normal transforms and rotations.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix3x3 {
    /// The matrix rows.
    pub m: [[Float; 3]; 3],
}

impl Matrix3x3 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Create a matrix from rows.
    ///
    /// * `m` - The rows.
    pub fn new(m: [[Float; 3]; 3]) -> Self {
        Self { m }
    }

    /// Create a matrix from three row vectors.
    ///
    /// * `r0` - First row.
    /// * `r1` - Second row.
    /// * `r2` - Third row.
    pub fn from_rows(r0: Vector3f, r1: Vector3f, r2: Vector3f) -> Self {
        Self {
            m: [
                [r0.x, r0.y, r0.z],
                [r1.x, r1.y, r1.z],
                [r2.x, r2.y, r2.z],
            ],
        }
    }

    /// Create a uniform scaling matrix.
    ///
    /// * `s` - The scale factor.
    pub fn scale(s: Float) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = s;
        }
        Self { m }
    }

    /// Transform a vector.
    ///
    /// * `v` - The vector.
    pub fn transform(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> Self {
        let m = &self.m;
        Self {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}

/// Builds the rotation matrix for intrinsic XYZ Euler angles.
///
/// * `euler` - The per-axis angles in radians.
pub fn euler_to_matrix(euler: &Vector3f) -> Matrix3x3 {
    let (sx, cx) = euler.x.sin_cos();
    let (sy, cy) = euler.y.sin_cos();
    let (sz, cz) = euler.z.sin_cos();

    Matrix3x3::from_rows(
        Vector3f::new(cy * cz, sy * sx * cz - cx * sz, sy * cx * cz + sx * sz),
        Vector3f::new(cy * sz, sy * sx * sz + cx * cz, sy * cx * sz - sx * cz),
        Vector3f::new(-sy, cy * sx, cy * cx),
    )
}

/// A row-major 4x4 matrix, used for point transforms and the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// The matrix rows.
    pub m: [[Float; 4]; 4],
}

impl Matrix4x4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create a matrix from rows.
    ///
    /// * `m` - The rows.
    pub fn new(m: [[Float; 4]; 4]) -> Self {
        Self { m }
    }

    /// Create a translation matrix.
    ///
    /// * `t` - The translation.
    pub fn translate(t: &Vector3f) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Create an affine transform from a linear part and a translation.
    ///
    /// * `linear` - The linear part.
    /// * `t`      - The translation.
    pub fn from_linear(linear: &Matrix3x3, t: &Vector3f) -> Self {
        let l = &linear.m;
        Self {
            m: [
                [l[0][0], l[0][1], l[0][2], t.x],
                [l[1][0], l[1][1], l[1][2], t.y],
                [l[2][0], l[2][1], l[2][2], t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns the linear (upper-left 3x3) part.
    pub fn linear(&self) -> Matrix3x3 {
        Matrix3x3::new([
            [self.m[0][0], self.m[0][1], self.m[0][2]],
            [self.m[1][0], self.m[1][1], self.m[1][2]],
            [self.m[2][0], self.m[2][1], self.m[2][2]],
        ])
    }

    /// Transform a point, applying the translation column.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3],
            self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3],
        )
    }

    /// Transform a direction, ignoring the translation column.
    ///
    /// * `v` - The direction.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_applies_translation() {
        let m = Matrix4x4::translate(&Vector3f::new(1.0, 2.0, 3.0));
        let p = m.transform_point(&Vector3f::ZERO);
        assert_eq!(p, Vector3f::new(1.0, 2.0, 3.0));
        let v = m.transform_vector(&Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(v, Vector3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn euler_identity() {
        let m = euler_to_matrix(&Vector3f::ZERO);
        assert_eq!(m, Matrix3x3::IDENTITY);
    }

    #[test]
    fn euler_z_rotation() {
        let m = euler_to_matrix(&Vector3f::new(0.0, 0.0, PI_OVER_TWO));
        let v = m.transform(&Vector3f::new(1.0, 0.0, 0.0));
        assert!((v - Vector3f::new(0.0, 1.0, 0.0)).length() < 1e-6);
    }
}
