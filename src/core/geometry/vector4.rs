//! 4-D vectors.

use super::Vector3f;
use crate::core::pbrt::*;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub};

/// A 4-D vector of `Float` values, used for RGBA colors in the shading
/// graph.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector4f {
    /// X-coordinate (red).
    pub x: Float,

    /// Y-coordinate (green).
    pub y: Float,

    /// Z-coordinate (blue).
    pub z: Float,

    /// W-coordinate (alpha).
    pub w: Float,
}

impl Vector4f {
    /// Zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 0.0,
    };

    /// Vector with all coordinates set to one.
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
        w: 1.0,
    };

    /// Create a new `Vector4f`.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    /// * `w` - W-coordinate.
    pub fn new(x: Float, y: Float, z: Float, w: Float) -> Self {
        Self { x, y, z, w }
    }

    /// Create a vector with all coordinates set to the same value.
    ///
    /// * `v` - The value.
    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v, v)
    }

    /// Create an opaque color from RGB coordinates.
    ///
    /// * `rgb` - The RGB coordinates.
    pub fn from_rgb(rgb: Vector3f) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, 1.0)
    }

    /// Returns the first three coordinates.
    pub fn xyz(&self) -> Vector3f {
        Vector3f::new(self.x, self.y, self.z)
    }

    /// Replaces the first three coordinates, keeping w.
    ///
    /// * `rgb` - The new coordinates.
    pub fn with_xyz(&self, rgb: Vector3f) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, self.w)
    }

    /// Clamps each coordinate to [0, 1].
    pub fn saturate(&self) -> Self {
        Self::new(
            saturate(self.x),
            saturate(self.y),
            saturate(self.z),
            saturate(self.w),
        )
    }

    /// Returns the component-wise minimum with another vector.
    ///
    /// * `other` - The other vector.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(
            min(self.x, other.x),
            min(self.y, other.y),
            min(self.z, other.z),
            min(self.w, other.w),
        )
    }

    /// Returns the component-wise maximum with another vector.
    ///
    /// * `other` - The other vector.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(
            max(self.x, other.x),
            max(self.y, other.y),
            max(self.z, other.z),
            max(self.w, other.w),
        )
    }
}

impl Add for Vector4f {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl AddAssign for Vector4f {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector4f {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Mul<Float> for Vector4f {
    type Output = Self;
    fn mul(self, s: Float) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Mul<Vector4f> for Float {
    type Output = Vector4f;
    fn mul(self, v: Vector4f) -> Vector4f {
        v * self
    }
}

impl Mul for Vector4f {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        )
    }
}

impl Neg for Vector4f {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Index<usize> for Vector4f {
    type Output = Float;

    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vector4f index out of bounds"),
        }
    }
}

impl IndexMut<usize> for Vector4f {
    fn index_mut(&mut self, i: usize) -> &mut Float {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            3 => &mut self.w,
            _ => panic!("Vector4f index out of bounds"),
        }
    }
}
