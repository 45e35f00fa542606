//! Film accumulation.

use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::pbrt::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Adds a value to an f32 stored as atomic bits. Shadow-ray deposits run
/// concurrently across the ray buffer, so every film write goes through
/// this compare-exchange loop.
///
/// * `slot`  - The destination bits.
/// * `value` - The value to add.
fn atomic_add_f32(slot: &AtomicU32, value: Float) {
    let mut current = slot.load(Ordering::Relaxed);
    loop {
        let updated = f32::from_bits(current) + value;
        match slot.compare_exchange_weak(
            current,
            updated.to_bits(),
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

/// One film pixel: accumulated radiance in `rgb`, sample count in `w`, and
/// auxiliary first-hit albedo and roughness planes for denoising.
#[derive(Default)]
struct Pixel {
    /// Accumulated radiance.
    rgb: [AtomicU32; 3],

    /// Accumulated sample count.
    w: AtomicU32,

    /// Accumulated first-hit albedo.
    albedo: [AtomicU32; 3],

    /// Accumulated first-hit roughness.
    roughness: AtomicU32,
}

/// The render target: a float RGBA image accumulated additively across
/// paths and frames. All additions are commutative, so the estimate is
/// invariant to thread ordering.
pub struct Film {
    /// Width in pixels.
    width: usize,

    /// Height in pixels.
    height: usize,

    /// Pixel storage.
    pixels: Vec<Pixel>,
}

impl Film {
    /// Create a cleared film.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    pub fn new(width: usize, height: usize) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        pixels.resize_with(width * height, Pixel::default);
        Self { width, height, pixels }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resets all accumulation.
    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = Pixel::default();
        }
    }

    #[inline]
    fn pixel(&self, x: u16, y: u16) -> &Pixel {
        &self.pixels[y as usize * self.width + x as usize]
    }

    /// Counts one sample toward a pixel. Called once per camera ray.
    ///
    /// * `x` - Pixel column.
    /// * `y` - Pixel row.
    pub fn add_sample(&self, x: u16, y: u16) {
        atomic_add_f32(&self.pixel(x, y).w, 1.0);
    }

    /// Deposits radiance on a pixel.
    ///
    /// * `x`     - Pixel column.
    /// * `y`     - Pixel row.
    /// * `value` - The radiance to add.
    pub fn add_radiance(&self, x: u16, y: u16, value: &Vector3f) {
        if !value.is_finite() {
            return;
        }
        let pixel = self.pixel(x, y);
        atomic_add_f32(&pixel.rgb[0], value.x);
        atomic_add_f32(&pixel.rgb[1], value.y);
        atomic_add_f32(&pixel.rgb[2], value.z);
    }

    /// Deposits first-hit albedo on a pixel.
    ///
    /// * `x`     - Pixel column.
    /// * `y`     - Pixel row.
    /// * `value` - The albedo to add.
    pub fn add_albedo(&self, x: u16, y: u16, value: &Vector3f) {
        if !value.is_finite() {
            return;
        }
        let pixel = self.pixel(x, y);
        atomic_add_f32(&pixel.albedo[0], value.x);
        atomic_add_f32(&pixel.albedo[1], value.y);
        atomic_add_f32(&pixel.albedo[2], value.z);
    }

    /// Deposits first-hit roughness on a pixel.
    ///
    /// * `x`     - Pixel column.
    /// * `y`     - Pixel row.
    /// * `value` - The roughness to add.
    pub fn add_roughness(&self, x: u16, y: u16, value: Float) {
        if value.is_finite() {
            atomic_add_f32(&self.pixel(x, y).roughness, value);
        }
    }

    /// Reads back one pixel: accumulated radiance and sample count.
    ///
    /// * `x` - Pixel column.
    /// * `y` - Pixel row.
    pub fn radiance(&self, x: u16, y: u16) -> Vector4f {
        let pixel = self.pixel(x, y);
        Vector4f::new(
            f32::from_bits(pixel.rgb[0].load(Ordering::Relaxed)),
            f32::from_bits(pixel.rgb[1].load(Ordering::Relaxed)),
            f32::from_bits(pixel.rgb[2].load(Ordering::Relaxed)),
            f32::from_bits(pixel.w.load(Ordering::Relaxed)),
        )
    }

    /// Reads back one pixel's mean radiance.
    ///
    /// * `x` - Pixel column.
    /// * `y` - Pixel row.
    pub fn mean_radiance(&self, x: u16, y: u16) -> Vector3f {
        let value = self.radiance(x, y);
        if value.w > 0.0 {
            value.xyz() / value.w
        } else {
            Vector3f::ZERO
        }
    }

    /// Reads back one pixel's mean first-hit albedo.
    ///
    /// * `x` - Pixel column.
    /// * `y` - Pixel row.
    pub fn mean_albedo(&self, x: u16, y: u16) -> Vector3f {
        let pixel = self.pixel(x, y);
        let w = f32::from_bits(pixel.w.load(Ordering::Relaxed));
        if w > 0.0 {
            Vector3f::new(
                f32::from_bits(pixel.albedo[0].load(Ordering::Relaxed)),
                f32::from_bits(pixel.albedo[1].load(Ordering::Relaxed)),
                f32::from_bits(pixel.albedo[2].load(Ordering::Relaxed)),
            ) / w
        } else {
            Vector3f::ZERO
        }
    }

    /// Reads back one pixel's mean first-hit roughness.
    ///
    /// * `x` - Pixel column.
    /// * `y` - Pixel row.
    pub fn mean_roughness(&self, x: u16, y: u16) -> Float {
        let pixel = self.pixel(x, y);
        let w = f32::from_bits(pixel.w.load(Ordering::Relaxed));
        if w > 0.0 {
            f32::from_bits(pixel.roughness.load(Ordering::Relaxed)) / w
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn additions_accumulate() {
        let film = Film::new(2, 2);
        film.add_sample(1, 0);
        film.add_radiance(1, 0, &Vector3f::new(0.5, 0.25, 0.125));
        film.add_radiance(1, 0, &Vector3f::new(0.5, 0.25, 0.125));
        let value = film.radiance(1, 0);
        assert_eq!(value.xyz(), Vector3f::new(1.0, 0.5, 0.25));
        assert_eq!(value.w, 1.0);
    }

    #[test]
    fn non_finite_deposits_are_dropped() {
        let film = Film::new(1, 1);
        film.add_radiance(0, 0, &Vector3f::new(Float::NAN, 1.0, 1.0));
        assert_eq!(film.radiance(0, 0).xyz(), Vector3f::ZERO);
    }

    #[test]
    fn concurrent_deposits_do_not_lose_updates() {
        let film = Film::new(1, 1);
        let n = 10_000;
        (0..n).into_par_iter().for_each(|_| {
            film.add_radiance(0, 0, &Vector3f::splat(1.0));
        });
        let total = film.radiance(0, 0).x;
        assert_eq!(total, n as Float);
    }

    #[test]
    fn mean_divides_by_sample_count() {
        let film = Film::new(1, 1);
        film.add_sample(0, 0);
        film.add_sample(0, 0);
        film.add_radiance(0, 0, &Vector3f::splat(4.0));
        assert_eq!(film.mean_radiance(0, 0), Vector3f::splat(2.0));
    }
}
