//! Texture nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::color::{srgb_to_linear, xyz_to_rgb};
use crate::core::geometry::{Vector2f, Vector3f, Vector4f};
use crate::core::noise::*;
use crate::core::pbrt::*;
use crate::core::sampling::equirect_sphere_to_square;
use crate::renderer::ShadingContext;

/// How `TexImage` maps its input vector to the image plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexImageProjection {
    /// Use xy directly, with y flipped.
    Flat,

    /// Box projection. Not implemented; reads like `Flat`.
    Box,

    /// Treat the vector as a direction into an equirectangular panorama.
    Equirectangular,

    /// Mirror-ball projection. Not implemented; reads like `Flat`.
    MirrorBall,
}

/// Color decoding applied after the texture fetch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexImageColorSpace {
    Linear,
    Srgb,
    NonColor,
    Raw,
    Xyz,
    FilmicLog,
}

/// Channel layout of the fetched texel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexImagePixelFormat {
    /// Single channel broadcast to RGB.
    R,

    /// Four channels.
    Rgba,
}

/// Samples an image from the scene's texture table. Only repeat extension
/// and linear interpolation are supported.
///
/// Inputs: `vector`. Outputs: `color`, `alpha`.
#[derive(Clone, Debug)]
pub struct TexImage {
    /// Index into the texture table.
    pub texture_index: usize,

    /// Input vector interpretation.
    pub projection: TexImageProjection,

    /// Decode applied after the fetch.
    pub color_space: TexImageColorSpace,

    /// Channel layout.
    pub pixel_format: TexImagePixelFormat,
}

impl TexImage {
    pub fn compute(
        &self,
        inputs: &[Value],
        ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let vector = inputs[0].to_vector();

        let projected = match self.projection {
            TexImageProjection::Equirectangular => equirect_sphere_to_square(&vector),
            TexImageProjection::Flat | TexImageProjection::Box | TexImageProjection::MirrorBall => {
                Vector2f::new(vector.x, 1.0 - vector.y)
            }
        };

        let mut color = match ctx.textures.get(self.texture_index) {
            Some(texture) => texture.sample(&projected),
            None => Vector4f::ONE,
        };
        let alpha = color.w;

        if self.pixel_format == TexImagePixelFormat::R {
            color = Vector4f::new(color.x, color.x, color.x, 1.0);
        }

        match self.color_space {
            TexImageColorSpace::Srgb => {
                color = color.with_xyz(Vector3f::new(
                    srgb_to_linear(color.x),
                    srgb_to_linear(color.y),
                    srgb_to_linear(color.z),
                ));
            }
            TexImageColorSpace::Xyz => {
                color = color.with_xyz(xyz_to_rgb(&color.xyz()));
            }
            TexImageColorSpace::Linear
            | TexImageColorSpace::NonColor
            | TexImageColorSpace::Raw
            | TexImageColorSpace::FilmicLog => {}
        }

        out[0] = Value::Color(color);
        out[1] = Value::Float(alpha);
    }
}

/// Tri-axis parity checker pattern.
///
/// Inputs: `vector`, `color1`, `color2`, `scale`. Outputs: `color`, `fac`.
#[derive(Clone, Debug, Default)]
pub struct TexChecker;

impl TexChecker {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let vector = inputs[0].to_vector();
        let color1 = inputs[1].to_color();
        let color2 = inputs[2].to_color();
        let scale = inputs[3].to_float();

        // Bias away from cell boundaries so integer coordinates land
        // consistently. Cells are half a unit wide at scale 1.
        let p = (vector * (2.0 * scale) + Vector3f::splat(0.000001)) * 0.999999;
        let idx = (
            p.x.floor() as i64,
            p.y.floor() as i64,
            p.z.floor() as i64,
        );

        let which = (idx.0 ^ idx.1 ^ idx.2) & 1 == 0;
        out[0] = Value::Color(if which { color1 } else { color2 });
        out[1] = Value::Float(if which { 1.0 } else { 0.0 });
    }
}

/// Dimensionality of `TexNoise`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexNoiseDimension {
    D1,
    D2,
    D3,
    D4,
}

/// Fractal Perlin noise with a pre-distortion pass.
///
/// Inputs: `vector`, `w`, `scale`, `detail`, `roughness`, `distortion`.
/// Outputs: `fac`, `color`.
#[derive(Clone, Debug)]
pub struct TexNoise {
    /// Input dimensionality.
    pub dimension: TexNoiseDimension,
}

fn random_float_offset(seed: Float) -> Float {
    100.0 + hash_float_to_float(seed) * 100.0
}

fn random_float2_offset(seed: Float) -> Vector2f {
    Vector2f::new(
        100.0 + hash_float2_to_float(Vector2f::new(seed, 0.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 1.0)) * 100.0,
    )
}

fn random_float3_offset(seed: Float) -> Vector3f {
    Vector3f::new(
        100.0 + hash_float2_to_float(Vector2f::new(seed, 0.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 1.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 2.0)) * 100.0,
    )
}

fn random_float4_offset(seed: Float) -> Vector4f {
    Vector4f::new(
        100.0 + hash_float2_to_float(Vector2f::new(seed, 0.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 1.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 2.0)) * 100.0,
        100.0 + hash_float2_to_float(Vector2f::new(seed, 3.0)) * 100.0,
    )
}

impl TexNoise {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let scale = inputs[2].to_float();
        let detail = inputs[3].to_float();
        let roughness = inputs[4].to_float();
        let distortion = inputs[5].to_float();

        let p = inputs[0].to_vector() * scale;
        let w = inputs[1].to_float() * scale;

        let color = match self.dimension {
            TexNoiseDimension::D1 => {
                let mut p = w;
                if distortion != 0.0 {
                    p += snoise_1d(p + random_float_offset(0.0)) * distortion;
                }
                Vector3f::new(
                    fractal_noise(|s| noise_1d(p * s), detail, roughness),
                    fractal_noise(|s| noise_1d((p + random_float_offset(1.0)) * s), detail, roughness),
                    fractal_noise(|s| noise_1d((p + random_float_offset(2.0)) * s), detail, roughness),
                )
            }
            TexNoiseDimension::D2 => {
                let mut p = p.xy();
                if distortion != 0.0 {
                    p += Vector2f::new(
                        snoise_2d(p + random_float2_offset(0.0)),
                        snoise_2d(p + random_float2_offset(1.0)),
                    ) * distortion;
                }
                Vector3f::new(
                    fractal_noise(|s| noise_2d(p * s), detail, roughness),
                    fractal_noise(
                        |s| noise_2d((p + random_float2_offset(2.0)) * s),
                        detail,
                        roughness,
                    ),
                    fractal_noise(
                        |s| noise_2d((p + random_float2_offset(3.0)) * s),
                        detail,
                        roughness,
                    ),
                )
            }
            TexNoiseDimension::D3 => {
                let mut p = p;
                if distortion != 0.0 {
                    p += Vector3f::new(
                        snoise_3d(p + random_float3_offset(0.0)),
                        snoise_3d(p + random_float3_offset(1.0)),
                        snoise_3d(p + random_float3_offset(2.0)),
                    ) * distortion;
                }
                Vector3f::new(
                    fractal_noise(|s| noise_3d(p * s), detail, roughness),
                    fractal_noise(
                        |s| noise_3d((p + random_float3_offset(3.0)) * s),
                        detail,
                        roughness,
                    ),
                    fractal_noise(
                        |s| noise_3d((p + random_float3_offset(4.0)) * s),
                        detail,
                        roughness,
                    ),
                )
            }
            TexNoiseDimension::D4 => {
                let mut p = Vector4f::new(p.x, p.y, p.z, w);
                if distortion != 0.0 {
                    let d = Vector4f::new(
                        snoise_4d(p + random_float4_offset(0.0)),
                        snoise_4d(p + random_float4_offset(1.0)),
                        snoise_4d(p + random_float4_offset(2.0)),
                        snoise_4d(p + random_float4_offset(3.0)),
                    );
                    p += d * distortion;
                }
                Vector3f::new(
                    fractal_noise(|s| noise_4d(p * s), detail, roughness),
                    fractal_noise(
                        |s| noise_4d((p + random_float4_offset(4.0)) * s),
                        detail,
                        roughness,
                    ),
                    fractal_noise(
                        |s| noise_4d((p + random_float4_offset(5.0)) * s),
                        detail,
                        roughness,
                    ),
                )
            }
        };

        out[0] = Value::Float(color.x);
        out[1] = Value::Color(Vector4f::from_rgb(color));
    }
}

/// Gradient shape for `TexGradient`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexGradientKind {
    /// Saturated x-coordinate.
    Linear,

    /// Saturated distance from the origin.
    Spherical,
}

/// Coordinate-driven gradient.
///
/// Inputs: `vector`. Outputs: `color`, `fac`.
#[derive(Clone, Debug)]
pub struct TexGradient {
    /// The gradient shape.
    pub kind: TexGradientKind,
}

impl TexGradient {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let vector = inputs[0].to_vector();
        let fac = match self.kind {
            TexGradientKind::Linear => saturate(vector.x),
            TexGradientKind::Spherical => saturate(vector.length()),
        };
        out[0] = Value::Color(Vector4f::new(fac, fac, fac, fac));
        out[1] = Value::Float(fac);
    }
}

/// Magic texture. Unsupported; returns white.
///
/// Inputs: `vector`, `scale`, `distortion`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct TexMagic;

impl TexMagic {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::ONE);
    }
}

/// Voronoi texture. Unsupported; returns white and zero distance.
///
/// Inputs: `vector`, `w`, `scale`, `smoothness`, `exponent`, `randomness`.
/// Outputs: `color`, `distance`.
#[derive(Clone, Debug, Default)]
pub struct TexVoronoi;

impl TexVoronoi {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::ONE);
        out[1] = Value::Float(0.0);
    }
}

/// Musgrave texture. Unsupported; returns unit factor and white.
///
/// Inputs: `vector`, `w`, `scale`, `detail`, `dimension`, `lacunarity`,
/// `offset`, `gain`. Outputs: `fac`, `color`.
#[derive(Clone, Debug, Default)]
pub struct TexMusgrave;

impl TexMusgrave {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(1.0);
        out[1] = Value::Color(Vector4f::ONE);
    }
}

/// Brick texture. Unsupported; returns white.
///
/// Inputs: `vector`, `color1`, `color2`, `mortar`, `scale`, `mortar size`,
/// `mortar smooth`, `bias`, `brick width`, `row height`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct TexBrick;

impl TexBrick {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::ONE);
    }
}

/// Wave texture. Unsupported; returns white.
///
/// Inputs: `vector`, `scale`, `distortion`, `detail`, `detail scale`,
/// `detail roughness`, `phase offset`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct TexWave;

impl TexWave {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::ONE);
    }
}

/// IES light profile. Unsupported; the factor passes the strength through.
///
/// Inputs: `vector`, `strength`. Outputs: `fac`.
#[derive(Clone, Debug, Default)]
pub struct TexIes;

impl TexIes {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Float(inputs[1].to_float());
    }
}
