//! Environment light with hierarchical importance sampling.

use crate::core::color::luminance;
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::Prng;
use crate::core::sampling::{uniform_sphere_to_square, uniform_square_to_sphere};
use crate::nodes::{EvalContext, MaterialRegistry};
use crate::renderer::{RayFlags, ShadingContext};

/// The environment light, importance sampled through a quad-tree over the
/// sphere.
///
/// The unit square maps onto the sphere with the equal-area warp; an R×R
/// grid of leaf texels stores the sampling density of each cell, and a
/// mipmap of conditional probabilities guides sampling from the root to a
/// leaf in `log2 R` steps.
///
/// Mipmap layout: level k holds `4^k` values, stored as groups of four
/// (top-left, top-right, bottom-left, bottom-right) per texel of level
/// k-1. After construction each group sums to one. Level 0 keeps the
/// unnormalized total for diagnostics.
#[derive(Clone, Debug)]
pub struct WorldLight {
    /// Index of the world's emission shader.
    pub shader_index: usize,

    /// Leaf grid resolution; a power of two.
    resolution: usize,

    /// Per-texel density in reciprocal steradians, row-major.
    pdfs: Vec<Float>,

    /// Concatenated conditional-probability levels.
    mipmap: Vec<Float>,
}

/// Offset of mipmap level `k` in the concatenated table.
fn level_offset(k: u32) -> usize {
    // 1 + 4 + ... + 4^(k-1)
    ((1 << (2 * k)) - 1) / 3
}

impl WorldLight {
    /// Builds the importance map by sampling the world shader.
    ///
    /// Every leaf texel averages the emission luminance over jittered
    /// directions inside the texel. The mipmap is then reduced bottom-up
    /// and normalized into conditional probabilities, and the leaf table
    /// becomes a density over the sphere.
    ///
    /// * `shader_index`      - The world's emission shader (a light
    ///                         program).
    /// * `resolution`        - Leaf grid resolution; must be a power of
    ///                         two.
    /// * `samples_per_texel` - Directions sampled per leaf texel.
    /// * `registry`          - Compiled materials.
    /// * `ctx`               - Evaluation resources.
    pub fn build(
        shader_index: usize,
        resolution: usize,
        samples_per_texel: usize,
        registry: &MaterialRegistry,
        ctx: &EvalContext,
    ) -> Self {
        assert!(resolution.is_power_of_two());
        let levels = resolution.trailing_zeros();
        debug!("building environment map of size {resolution}^2");

        // Estimate emission per leaf texel.
        let mut prng = Prng::new(0x9a2f, 0);
        let mut leaf = vec![0.0; resolution * resolution];
        for y in 0..resolution {
            for x in 0..resolution {
                let mut value = 0.0;
                for _ in 0..samples_per_texel {
                    let jitter = prng.sample_2d();
                    let uv = Vector2f::new(
                        (x as Float + jitter.x) / resolution as Float,
                        (y as Float + jitter.y) / resolution as Float,
                    );
                    let direction = uniform_square_to_sphere(&uv);

                    let mut shading = ShadingContext::for_environment(
                        &direction,
                        RayFlags::CAMERA,
                        prng.sample_3d(),
                    );
                    registry.shade_light(shader_index, ctx, &mut shading);
                    value += luminance(&shading.material.emission);
                }
                leaf[y * resolution + x] = value / samples_per_texel as Float;
            }
        }

        // Reduce bottom-up: per-level texel sums, with the leaf estimates
        // as the deepest level.
        let mut sums: Vec<Vec<Float>> = Vec::with_capacity(levels as usize + 1);
        sums.push(leaf);
        for k in (0..levels).rev() {
            let child = &sums[sums.len() - 1];
            let res = 1 << k;
            let child_res = res * 2;
            let mut level = vec![0.0; res * res];
            for y in 0..res {
                for x in 0..res {
                    level[y * res + x] = child[(2 * y) * child_res + 2 * x]
                        + child[(2 * y) * child_res + 2 * x + 1]
                        + child[(2 * y + 1) * child_res + 2 * x]
                        + child[(2 * y + 1) * child_res + 2 * x + 1];
                }
            }
            sums.push(level);
        }
        sums.reverse(); // sums[k] now holds level k, root first.

        let total = sums[0][0];

        // Normalize each parent's four children into conditional
        // probabilities, stored grouped per parent.
        let mipmap_len = level_offset(levels + 1);
        let mut mipmap = vec![0.0; mipmap_len];
        mipmap[0] = total;
        for k in 0..levels {
            let parent_res = 1 << k;
            let child_res = parent_res * 2;
            let offset = level_offset(k + 1);
            for y in 0..parent_res {
                for x in 0..parent_res {
                    let parent_sum = sums[k as usize][y * parent_res + x];
                    let group = offset + 4 * (y * parent_res + x);
                    let children = [
                        sums[k as usize + 1][(2 * y) * child_res + 2 * x],
                        sums[k as usize + 1][(2 * y) * child_res + 2 * x + 1],
                        sums[k as usize + 1][(2 * y + 1) * child_res + 2 * x],
                        sums[k as usize + 1][(2 * y + 1) * child_res + 2 * x + 1],
                    ];
                    for (i, child) in children.iter().enumerate() {
                        mipmap[group + i] = if parent_sum > 0.0 {
                            child / parent_sum
                        } else {
                            0.25
                        };
                    }
                }
            }
        }

        // Leaf densities over the sphere.
        let texel_count = (resolution * resolution) as Float;
        let pdfs = sums[levels as usize]
            .iter()
            .map(|v| {
                if total > 0.0 {
                    v / total * texel_count * INV_FOUR_PI
                } else {
                    INV_FOUR_PI
                }
            })
            .collect();

        Self {
            shader_index,
            resolution,
            pdfs,
            mipmap,
        }
    }

    /// A single-texel map for scenes without an importance-sampled world.
    ///
    /// * `shader_index` - The world's emission shader.
    pub fn uniform(shader_index: usize) -> Self {
        Self {
            shader_index,
            resolution: 1,
            pdfs: vec![INV_FOUR_PI],
            mipmap: vec![1.0],
        }
    }

    /// Leaf grid resolution.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Density of sampling a direction, in reciprocal steradians.
    ///
    /// * `direction` - The world-space direction.
    pub fn pdf(&self, direction: &Vector3f) -> Float {
        let uv = uniform_sphere_to_square(direction);
        let x = ((uv.x * self.resolution as Float) as usize).min(self.resolution - 1);
        let y = ((uv.y * self.resolution as Float) as usize).min(self.resolution - 1);
        self.pdfs[y * self.resolution + x]
    }

    /// Draws a direction from the importance map. Returns the direction
    /// and its density.
    ///
    /// * `uv` - Two uniform random dimensions.
    pub fn sample(&self, uv: &Vector2f) -> (Vector3f, Float) {
        let mut uv = *uv;
        let mut resolution = 1;
        let mut shift = (0_usize, 0_usize);
        let mut level = 0_u32;

        while resolution < self.resolution {
            let group = level_offset(level + 1) + 4 * (shift.1 * resolution + shift.0);

            shift = (shift.0 * 2, shift.1 * 2);
            resolution *= 2;
            level += 1;

            let top_left = self.mipmap[group];
            let top_right = self.mipmap[group + 1];
            let bottom_left = self.mipmap[group + 2];

            let left_prob = top_left + bottom_left;
            let top_prob;
            if uv.x < left_prob {
                let inv_prob = 1.0 / left_prob;
                uv.x *= inv_prob;
                top_prob = top_left * inv_prob;
            } else {
                let inv_prob = 1.0 / (1.0 - left_prob);
                uv.x = (uv.x - left_prob) * inv_prob;
                top_prob = top_right * inv_prob;
                shift.0 += 1;
            }

            if uv.y < top_prob {
                uv.y /= top_prob;
            } else {
                uv.y = (uv.y - top_prob) / (1.0 - top_prob);
                shift.1 += 1;
            }
        }

        let pdf = self.pdfs[shift.1 * self.resolution + shift.0];
        let uv = Vector2f::new(
            (shift.0 as Float + uv.x) / self.resolution as Float,
            (shift.1 as Float + uv.y) / self.resolution as Float,
        );
        (uniform_square_to_sphere(&uv), pdf)
    }
}
