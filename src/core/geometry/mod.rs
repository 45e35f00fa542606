//! Geometry

mod frame;
mod matrix;
mod vector2;
mod vector3;
mod vector4;

// Re-export.
pub use frame::*;
pub use matrix::*;
pub use vector2::*;
pub use vector3::*;
pub use vector4::*;
