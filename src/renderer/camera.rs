//! Camera and primary-ray generation.

use crate::core::geometry::{Matrix4x4, Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::rng::{sample_tea_u32, Prng};
use crate::core::sampling::uniform_square_to_disk;
use crate::renderer::ray::{Ray, RayFlags};
use crate::renderer::scene::Uniforms;

/// Standard full-stop aperture table addressed by `stop_index`.
const F_STOPS: [Float; 10] = [22.0, 16.0, 11.0, 8.0, 5.6, 4.0, 2.8, 2.0, 1.4, 1.0];

/// Camera placement and optics.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    /// Camera-to-world transform.
    pub transform: Matrix4x4,

    /// Near clip distance.
    pub near_clip: Float,

    /// Far clip distance.
    pub far_clip: Float,

    /// Focal length in millimeters.
    pub focal_length: Float,

    /// Sensor shift in normalized sensor units.
    pub shift: Vector2f,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Matrix4x4::IDENTITY,
            near_clip: 0.0,
            far_clip: INFINITY,
            focal_length: 50.0,
            shift: Vector2f::ZERO,
        }
    }
}

/// Samples a point on the aperture polygon, uniform over its area. With
/// fewer than three blades the aperture is a disk.
///
/// * `rnd`    - Three uniform random dimensions.
/// * `blades` - Number of aperture blades.
fn sample_aperture(rnd: &Vector3f, blades: i32) -> Vector2f {
    if blades < 3 {
        return uniform_square_to_disk(&Vector2f::new(rnd.x, rnd.y));
    }

    // Pick a wedge of the polygon, then a point on its triangle.
    let wedge = min((rnd.z * blades as Float) as i32, blades - 1);
    let angle0 = TWO_PI * wedge as Float / blades as Float;
    let angle1 = TWO_PI * (wedge + 1) as Float / blades as Float;

    let v0 = Vector2f::new(cos(angle0), sin(angle0));
    let v1 = Vector2f::new(cos(angle1), sin(angle1));

    let mut u = rnd.x;
    let mut v = rnd.y;
    if u + v > 1.0 {
        u = 1.0 - u;
        v = 1.0 - v;
    }
    v0 * u + v1 * v
}

impl Camera {
    /// Generates the primary ray for a film pixel.
    ///
    /// A sub-pixel jitter and the sensor mapping produce a direction in
    /// camera space; when a focus distance and aperture are configured the
    /// ray origin spreads over the aperture polygon with the focal plane
    /// held sharp. The returned ray carries unit weight, an infinite BSDF
    /// density, and a random stream keyed to the pixel and frame seed.
    ///
    /// * `uniforms` - Frame configuration.
    /// * `x`        - Pixel column.
    /// * `y`        - Pixel row.
    /// * `width`    - Film width.
    /// * `height`   - Film height.
    pub fn generate_ray(
        &self,
        uniforms: &Uniforms,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Ray {
        let pixel_index = (y * width + x) as u32;
        let mut prng = Prng::new(sample_tea_u32(pixel_index, uniforms.random_seed), 0);

        let jitter = prng.sample_2d();
        let aspect = height as Float / width as Float;

        // Sensor-plane point, in camera space at unit focal distance.
        let ndc = Vector2f::new(
            (x as Float + jitter.x) / width as Float - 0.5,
            0.5 - (y as Float + jitter.y) / height as Float,
        );
        let sensor = Vector2f::new(
            (ndc.x - self.shift.x) * uniforms.sensor_scale,
            (ndc.y - self.shift.y) * uniforms.sensor_scale * aspect,
        );

        // The focal length converts from millimeters through the camera
        // scale.
        let focal = self.focal_length * uniforms.camera_scale / 0.036;
        let mut origin = Vector3f::ZERO;
        let mut direction = Vector3f::new(sensor.x, sensor.y, -focal).normalize();

        // Depth of field around the focus plane.
        let stop_index = clamp(uniforms.stop_index, 0, F_STOPS.len() as i32 - 1) as usize;
        let f_number = F_STOPS[stop_index] / max(uniforms.relative_stop, 1e-3);
        if uniforms.focus > 0.0 {
            let aperture_radius =
                0.5 * self.focal_length * uniforms.camera_scale / f_number;
            let lens = sample_aperture(&prng.sample_3d(), uniforms.num_aperture_blades)
                * aperture_radius;

            let focus_point = direction * (uniforms.focus / -direction.z);
            origin = Vector3f::new(lens.x, lens.y, 0.0);
            direction = (focus_point - origin).normalize();
        }

        Ray {
            origin: self.transform.transform_point(&origin),
            min_distance: self.near_clip,
            direction: self.transform.transform_vector(&direction).normalize(),
            max_distance: self.far_clip,
            prng,
            weight: Vector3f::ONE,
            x: x as u16,
            y: y as u16,
            depth: 0,
            flags: RayFlags::CAMERA,
            bsdf_pdf: INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms() -> Uniforms {
        Uniforms {
            sensor_scale: 1.0,
            camera_scale: 0.036,
            ..Default::default()
        }
    }

    #[test]
    fn rays_start_at_the_camera() {
        let camera = Camera::default();
        let ray = camera.generate_ray(&uniforms(), 8, 8, 16, 16, );
        assert_eq!(ray.origin, Vector3f::ZERO);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        assert!(ray.direction.z < 0.0);
        assert_eq!(ray.flags, RayFlags::CAMERA);
        assert_eq!(ray.bsdf_pdf, INFINITY);
        assert_eq!(ray.weight, Vector3f::ONE);
        assert_eq!(ray.depth, 0);
    }

    #[test]
    fn center_pixel_looks_down_the_axis() {
        let camera = Camera::default();
        // Average a few jitters of the center pixel.
        let mut mean = Vector3f::ZERO;
        for seed in 0..16 {
            let mut u = uniforms();
            u.random_seed = seed;
            let ray = camera.generate_ray(&u, 8, 8, 17, 17);
            mean += ray.direction;
        }
        mean = (mean / 16.0).normalize();
        assert!(mean.x.abs() < 0.05);
        assert!(mean.y.abs() < 0.05);
        assert!(mean.z < -0.99);
    }

    #[test]
    fn rays_are_reproducible_per_seed() {
        let camera = Camera::default();
        let a = camera.generate_ray(&uniforms(), 3, 5, 16, 16);
        let b = camera.generate_ray(&uniforms(), 3, 5, 16, 16);
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.prng, b.prng);
    }

    #[test]
    fn aperture_spreads_origins() {
        let camera = Camera::default();
        let mut u = uniforms();
        u.focus = 5.0;
        u.relative_stop = 4.0;
        u.stop_index = 9;

        let mut seen_offset = false;
        for seed in 0..8 {
            u.random_seed = seed;
            let ray = camera.generate_ray(&u, 8, 8, 16, 16);
            if ray.origin.length() > 1e-5 {
                seen_offset = true;
            }
        }
        assert!(seen_offset);
    }

    #[test]
    fn polygon_aperture_stays_within_unit_disk() {
        for i in 0..64 {
            let rnd = Vector3f::new(
                (i % 8) as Float / 8.0 + 0.01,
                (i / 8) as Float / 8.0 + 0.01,
                ((i * 5) % 64) as Float / 64.0,
            );
            let p = sample_aperture(&rnd, 7);
            assert!(p.length() <= 1.0 + 1e-5);
        }
    }
}
