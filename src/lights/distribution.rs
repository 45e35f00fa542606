//! Mesh-emissive distribution builder.

use crate::core::geometry::{Matrix3x3, Vector3f};
use crate::core::pbrt::*;
use itertools::Itertools;

/// Builds the per-face sampling distribution for one emissive mesh
/// instance.
///
/// Faces whose material carries emission contribute their world-space area;
/// all others contribute zero, so sampling never picks them. The output
/// table receives the normalized running sum (a CDF with one entry per
/// face), and the return value is the instance's total emissive area, which
/// converts area densities to the solid-angle form.
///
/// * `normal_transform`      - The instance's normal transform, used to
///                             carry face areas into world space.
/// * `indices`               - The instance's triangle index triplets.
/// * `vertices`              - The instance's vertex positions.
/// * `materials`             - Per-face material indices.
/// * `material_has_emission` - Emission flag per material index.
/// * `output`                - CDF output table, one entry per face.
pub fn build_light_distribution(
    normal_transform: &Matrix3x3,
    indices: &[u32],
    vertices: &[Vector3f],
    materials: &[u16],
    material_has_emission: &[bool],
    output: &mut [Float],
) -> Float {
    let face_count = output.len();
    debug_assert!(indices.len() >= 3 * face_count);

    let mut total_area = 0.0;
    for face in 0..face_count {
        let p0 = vertices[indices[3 * face] as usize];
        let p1 = vertices[indices[3 * face + 1] as usize];
        let p2 = vertices[indices[3 * face + 2] as usize];

        let emissive = material_has_emission
            .get(materials[face] as usize)
            .copied()
            .unwrap_or(false);

        let area = if emissive {
            0.5 * normal_transform
                .transform(&(p1 - p0).cross(&(p2 - p0)))
                .length()
        } else {
            0.0
        };

        total_area += area;
        output[face] = total_area;
    }

    if total_area > 0.0 {
        let inv = 1.0 / total_area;
        for v in output.iter_mut() {
            *v *= inv;
        }
    }

    total_area
}

/// Picks a face from a CDF built by `build_light_distribution`, returning
/// the face index and the random value rescaled for reuse.
///
/// * `cdf` - The per-face CDF.
/// * `u`   - The random sample.
pub fn sample_light_face(cdf: &[Float], u: Float) -> (usize, Float) {
    let face = cdf.iter().find_position(|&&c| u < c).map_or_else(
        || cdf.len().saturating_sub(1),
        |(i, _)| i,
    );

    let lo = if face == 0 { 0.0 } else { cdf[face - 1] };
    let width = cdf[face] - lo;
    let remapped = if width > 0.0 { (u - lo) / width } else { 0.0 };

    (face, remapped)
}
