//! Wavefront driver.
//!
//! Each frame runs as a sequence of data-parallel passes over ray buffers:
//! primary-ray generation, closest-hit tracing, shading with next-event
//! estimation, and a shadow pass that deposits unoccluded contributions.
//! Surviving paths are compacted into the next generation's buffer through
//! an atomic counter; the two generation buffers ping-pong until the
//! maximum depth is reached or every path has terminated.

use crate::core::pbrt::*;
use crate::core::sampling::power_heuristic;
use crate::nodes::EvalContext;
use crate::renderer::accel::Accelerator;
use crate::renderer::context::ShadingContext;
use crate::renderer::film::Film;
use crate::renderer::ray::{Intersection, Ray, RayFlags, ShadowRay};
use crate::renderer::scene::{RussianRoulette, SamplingMode, Scene, Uniforms, NO_LIGHT};
use rayon::prelude::*;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

/// A fixed-capacity buffer that concurrent shading lanes push into. Slots
/// are claimed with a single `fetch_add`, so the order of entries is
/// unspecified but no two lanes ever share a slot.
struct RayQueue<T> {
    slots: Vec<UnsafeCell<Option<T>>>,
    count: AtomicU32,
}

// SAFETY: every push claims a distinct slot index from the atomic counter,
// so no slot is written from two threads.
unsafe impl<T: Send> Sync for RayQueue<T> {}

impl<T> RayQueue<T> {
    /// Create a queue able to hold `capacity` entries.
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || UnsafeCell::new(None));
        Self {
            slots,
            count: AtomicU32::new(0),
        }
    }

    /// Claims the next slot and stores a value into it.
    fn push(&self, value: T) {
        let index = self.count.fetch_add(1, Ordering::Relaxed) as usize;
        // SAFETY: the index is unique to this call and within capacity, as
        // at most one value is pushed per input ray.
        unsafe {
            *self.slots[index].get() = Some(value);
        }
    }

    /// Consumes the queue into the populated prefix.
    fn into_vec(self) -> Vec<T> {
        let count = self.count.load(Ordering::Relaxed) as usize;
        self.slots
            .into_iter()
            .take(count)
            .map(|slot| slot.into_inner().expect("claimed slot left empty"))
            .collect()
    }
}

/// The wavefront path-tracing driver.
pub struct WavefrontDriver {
    /// Maximum number of path segments.
    pub max_depth: usize,
}

impl WavefrontDriver {
    /// Create a new `WavefrontDriver`.
    ///
    /// * `max_depth` - Maximum number of path segments.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Renders one frame's worth of samples into the film.
    ///
    /// * `scene`    - The scene.
    /// * `uniforms` - Frame configuration.
    /// * `accel`    - The ray-tracing back end.
    /// * `film`     - The render target.
    pub fn render_frame<A: Accelerator>(
        &self,
        scene: &Scene,
        uniforms: &Uniforms,
        accel: &A,
        film: &Film,
    ) {
        let width = film.width();
        let height = film.height();

        // Generation zero: one camera ray per film pixel.
        let mut rays: Vec<Ray> = (0..width * height)
            .into_par_iter()
            .map(|i| {
                let (x, y) = (i % width, i / width);
                film.add_sample(x as u16, y as u16);
                scene.camera.generate_ray(uniforms, x, y, width, height)
            })
            .collect();

        let eval_ctx = EvalContext {
            textures: &scene.textures,
        };

        for depth in 0..self.max_depth {
            if rays.is_empty() {
                break;
            }
            debug!("depth {depth}: {} rays", rays.len());

            let intersections = accel.trace_closest(&rays);

            let next_rays = RayQueue::with_capacity(rays.len());
            let shadow_rays = RayQueue::with_capacity(rays.len());

            rays.par_iter()
                .zip(intersections.par_iter())
                .for_each(|(ray, isect)| {
                    self.shade(
                        scene, uniforms, &eval_ctx, film, ray, isect, &next_rays, &shadow_rays,
                    );
                });

            let shadow_rays = shadow_rays.into_vec();
            if !shadow_rays.is_empty() {
                debug!("depth {depth}: {} shadow rays", shadow_rays.len());
                let occlusions = accel.trace_any(&shadow_rays);
                shadow_rays
                    .par_iter()
                    .zip(occlusions.par_iter())
                    .for_each(|(shadow, occlusion)| {
                        if occlusion.is_miss() {
                            film.add_radiance(shadow.x, shadow.y, &shadow.weight);
                        }
                    });
            }

            rays = next_rays.into_vec();
        }
    }

    /// Shades one ray of the current generation.
    #[allow(clippy::too_many_arguments)]
    fn shade(
        &self,
        scene: &Scene,
        uniforms: &Uniforms,
        eval_ctx: &EvalContext,
        film: &Film,
        ray: &Ray,
        isect: &Intersection,
        next_rays: &RayQueue<Ray>,
        shadow_rays: &RayQueue<ShadowRay>,
    ) {
        let mut prng = ray.prng;
        let singular = ray.bsdf_pdf.is_infinite();

        if isect.is_miss() {
            // The path escaped: collect the environment, weighted against
            // the chance NEE would have sampled the same direction.
            let mut shading =
                ShadingContext::for_environment(&ray.direction, ray.flags, prng.sample_3d());
            scene
                .registry
                .shade_light(scene.lights.world.shader_index, eval_ctx, &mut shading);

            let mis = match uniforms.sampling_mode {
                SamplingMode::Bsdf => 1.0,
                SamplingMode::Nee => {
                    if singular {
                        1.0
                    } else {
                        0.0
                    }
                }
                SamplingMode::Mis => {
                    if singular {
                        1.0
                    } else {
                        power_heuristic(ray.bsdf_pdf, scene.lights.envmap_pdf(&ray.direction))
                    }
                }
            };

            if mis > 0.0 {
                film.add_radiance(
                    ray.x,
                    ray.y,
                    &(ray.weight * shading.material.emission * mis),
                );
            }
            return;
        }

        let instance = &scene.instances[isect.instance_index as usize];

        // Instances masked out for this ray kind are passed through as if
        // absent.
        if (instance.visibility & ray.flags).is_empty() {
            let mut continued = *ray;
            continued.origin =
                ray.origin + ray.direction * (isect.distance + RAY_EPSILON);
            continued.prng = prng;
            next_rays.push(continued);
            return;
        }

        let (mut shading, material_index) =
            ShadingContext::from_hit(&scene.geometry, instance, isect, ray, &mut prng);
        scene
            .registry
            .shade_surface(material_index, eval_ctx, &mut shading);

        if ray.flags.contains(RayFlags::CAMERA) && ray.depth == 0 {
            film.add_albedo(ray.x, ray.y, &shading.material.albedo());
            film.add_roughness(ray.x, ray.y, shading.material.roughness());
        }

        // Emission picked up by hitting a surface, weighted against the
        // chance NEE would have sampled the same emitter.
        if !shading.material.emission.is_zero() {
            let mis = if instance.light_index == NO_LIGHT {
                // Emitters outside the light pool are never NEE-sampled.
                1.0
            } else {
                match uniforms.sampling_mode {
                    SamplingMode::Bsdf => 1.0,
                    SamplingMode::Nee => {
                        if singular {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    SamplingMode::Mis => {
                        if singular {
                            1.0
                        } else {
                            power_heuristic(
                                ray.bsdf_pdf,
                                scene.lights.shape_pdf(instance, &shading),
                            )
                        }
                    }
                }
            };
            if mis > 0.0 {
                film.add_radiance(
                    ray.x,
                    ray.y,
                    &(ray.weight * shading.material.emission * mis),
                );
            }
        }

        let sh_normal = shading.shading_normal();

        // Next-event estimation.
        if uniforms.sampling_mode != SamplingMode::Bsdf {
            let light = scene.lights.sample(
                &scene.geometry,
                &scene.instances,
                &scene.registry,
                eval_ctx,
                &shading,
                &mut prng,
            );

            if light.is_valid() {
                let (value, bsdf_pdf) = shading.material.evaluate(
                    &shading.wo,
                    &light.direction,
                    &sh_normal,
                    &shading.true_normal,
                );

                let mis = if uniforms.sampling_mode == SamplingMode::Mis && light.can_be_hit {
                    power_heuristic(light.pdf, bsdf_pdf)
                } else {
                    1.0
                };

                let contribution = ray.weight * value * light.weight * mis;
                if contribution.is_finite() && !contribution.is_zero() {
                    if light.casts_shadows {
                        let max_distance = if light.distance.is_finite() {
                            light.distance - 2.0 * RAY_EPSILON
                        } else {
                            INFINITY
                        };
                        shadow_rays.push(ShadowRay {
                            origin: shading.position + light.direction * RAY_EPSILON,
                            min_distance: 0.0,
                            direction: light.direction,
                            max_distance,
                            weight: contribution,
                            x: ray.x,
                            y: ray.y,
                        });
                    } else {
                        film.add_radiance(ray.x, ray.y, &contribution);
                    }
                }
            }
        }

        // Continue the path by sampling the material.
        let sample = shading.material.sample(
            &prng.sample_3d(),
            &shading.wo,
            &sh_normal,
            &shading.true_normal,
            ray.flags,
        );
        if !(sample.pdf > 0.0) {
            return;
        }

        let mut weight = ray.weight * sample.weight;
        if !weight.is_finite() || weight.is_zero() {
            return;
        }

        // Throughput Russian roulette past the configured depth. The MIS
        // bookkeeping is untouched; only the carried weight is rescaled.
        if uniforms.rr == RussianRoulette::Throughput && ray.depth >= uniforms.rr_depth {
            let q = saturate(weight.mean());
            if !(prng.sample_1d() < q) {
                return;
            }
            weight /= q;
        }

        next_rays.push(Ray {
            origin: shading.position + sample.wi * RAY_EPSILON,
            min_distance: 0.0,
            direction: sample.wi,
            max_distance: INFINITY,
            prng,
            weight,
            x: ray.x,
            y: ray.y,
            depth: ray.depth + 1,
            flags: sample.flags,
            bsdf_pdf: sample.pdf,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Prng;

    #[test]
    fn ray_queue_collects_concurrent_pushes() {
        let queue = RayQueue::with_capacity(10_000);
        (0..10_000u32).into_par_iter().for_each(|i| {
            queue.push(i);
        });
        let mut values = queue.into_vec();
        values.sort_unstable();
        assert_eq!(values.len(), 10_000);
        assert_eq!(values[0], 0);
        assert_eq!(values[9999], 9999);
    }

    #[test]
    fn ray_queue_reports_prefix_only() {
        let queue: RayQueue<Ray> = RayQueue::with_capacity(8);
        queue.push(Ray {
            origin: crate::core::geometry::Vector3f::ZERO,
            min_distance: 0.0,
            direction: crate::core::geometry::Vector3f::new(0.0, 0.0, 1.0),
            max_distance: INFINITY,
            prng: Prng::new(0, 0),
            weight: crate::core::geometry::Vector3f::ONE,
            x: 0,
            y: 0,
            depth: 0,
            flags: RayFlags::CAMERA,
            bsdf_pdf: INFINITY,
        });
        assert_eq!(queue.into_vec().len(), 1);
    }
}
