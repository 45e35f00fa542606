//! Socket values and coercions.

use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::pbrt::*;
use crate::core::reflection::UberBsdf;

/// A value traveling along a graph link. Sockets coerce between scalar
/// kinds on read, so a float can feed a color input and a shader can feed a
/// color input through its emission.
#[derive(Copy, Clone, Debug)]
pub enum Value {
    /// A scalar.
    Float(Float),

    /// A 3-D vector.
    Vector(Vector3f),

    /// An RGBA color.
    Color(Vector4f),

    /// A shader closure.
    Shader(UberBsdf),
}

impl Value {
    /// Reads the value as a scalar. Vectors average their coordinates;
    /// colors scale the channel average by alpha; shaders average their
    /// emission.
    pub fn to_float(&self) -> Float {
        match self {
            Value::Float(v) => *v,
            Value::Vector(v) => v.mean(),
            Value::Color(c) => c.w * c.xyz().mean(),
            Value::Shader(s) => s.emission.mean(),
        }
    }

    /// Reads the value as a vector. Scalars broadcast; colors drop alpha;
    /// shaders read as zero.
    pub fn to_vector(&self) -> Vector3f {
        match self {
            Value::Float(v) => Vector3f::splat(*v),
            Value::Vector(v) => *v,
            Value::Color(c) => c.xyz(),
            Value::Shader(_) => Vector3f::ZERO,
        }
    }

    /// Reads the value as an RGBA color. Scalars broadcast opaquely;
    /// vectors gain full alpha; shaders expose their emission.
    pub fn to_color(&self) -> Vector4f {
        match self {
            Value::Float(v) => Vector4f::new(*v, *v, *v, 1.0),
            Value::Vector(v) => Vector4f::from_rgb(*v),
            Value::Color(c) => *c,
            Value::Shader(s) => Vector4f::from_rgb(s.emission),
        }
    }

    /// Reads the value as a shader. Non-shader values pack into a pure
    /// emitter of the coerced color.
    pub fn to_shader(&self) -> UberBsdf {
        match self {
            Value::Shader(s) => *s,
            other => UberBsdf {
                emission: other.to_color().xyz(),
                ..Default::default()
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_broadcasts() {
        let v = Value::Float(0.5);
        assert_eq!(v.to_vector(), Vector3f::splat(0.5));
        assert_eq!(v.to_color(), Vector4f::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn color_drops_alpha_to_vector() {
        let v = Value::Color(Vector4f::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(v.to_vector(), Vector3f::new(0.1, 0.2, 0.3));
        assert!((v.to_float() - 0.4 * 0.2).abs() < 1e-6);
    }

    #[test]
    fn shader_round_trips_through_emission() {
        let color = Value::Color(Vector4f::new(0.4, 0.5, 0.6, 1.0));
        let shader = color.to_shader();
        assert_eq!(shader.emission, Vector3f::new(0.4, 0.5, 0.6));
        let back = Value::Shader(shader).to_color();
        assert_eq!(back.xyz(), Vector3f::new(0.4, 0.5, 0.6));
    }
}
