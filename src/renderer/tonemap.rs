//! Display transforms.

use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::pbrt::*;
use crate::renderer::film::Film;
use crate::renderer::scene::{OutputChannel, Tonemapping, Uniforms};

/// The Uncharted 2 filmic curve shoulder/toe fit.
fn hable_partial(x: Vector3f) -> Vector3f {
    const A: Float = 0.15;
    const B: Float = 0.50;
    const C: Float = 0.10;
    const D: Float = 0.20;
    const E: Float = 0.02;
    const F: Float = 0.30;

    let num = x * (x * A + Vector3f::splat(C * B)) + Vector3f::splat(D * E);
    let den = x * (x * A + Vector3f::splat(B)) + Vector3f::splat(D * F);
    num / den - Vector3f::splat(E / F)
}

/// Filmic tonemap with a fixed white point of 11.2.
///
/// * `x` - Linear radiance.
pub fn hable(x: Vector3f) -> Vector3f {
    let white = hable_partial(Vector3f::splat(11.2));
    let mapped = hable_partial(x * 2.0);
    mapped / white
}

/// The ACES filmic fit by Narkowicz.
///
/// * `x` - Linear radiance.
pub fn aces(x: Vector3f) -> Vector3f {
    let num = x * (x * 2.51 + Vector3f::splat(0.03));
    let den = x * (x * 2.43 + Vector3f::splat(0.59)) + Vector3f::splat(0.14);
    let mapped = num / den;
    Vector3f::new(
        saturate(mapped.x),
        saturate(mapped.y),
        saturate(mapped.z),
    )
}

/// Applies the configured display transform to one linear value.
///
/// * `operator` - The transform.
/// * `x`        - Linear radiance.
pub fn apply(operator: Tonemapping, x: Vector3f) -> Vector3f {
    match operator {
        Tonemapping::Linear => x,
        Tonemapping::Hable => hable(x),
        Tonemapping::Aces => aces(x),
    }
}

/// Resolves the film into a display image: selects the output channel,
/// normalizes by sample count, applies exposure and the tonemap operator.
/// Accumulation continues unaffected; the transform is display-only.
///
/// * `film`     - The accumulated film.
/// * `uniforms` - Frame configuration.
pub fn resolve(film: &Film, uniforms: &Uniforms) -> Vec<Vector4f> {
    let mut image = Vec::with_capacity(film.width() * film.height());

    for y in 0..film.height() {
        for x in 0..film.width() {
            let (x, y) = (x as u16, y as u16);
            let value = match uniforms.output_channel {
                OutputChannel::Image => {
                    let mean = film.mean_radiance(x, y) * uniforms.exposure;
                    apply(uniforms.tonemapping, mean)
                }
                OutputChannel::Albedo => film.mean_albedo(x, y),
                OutputChannel::Roughness => Vector3f::splat(film.mean_roughness(x, y)),
            };
            image.push(Vector4f::from_rgb(value));
        }
    }

    image
}
