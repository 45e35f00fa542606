//! Sky model.

use super::{EvalContext, Outputs, Value};
use crate::core::color::xyz_to_rgb;
use crate::core::geometry::{Vector2f, Vector3f, Vector4f};
use crate::core::pbrt::*;
use crate::renderer::ShadingContext;

/// Spherical coordinates (θ from +z, φ in the xy-plane measured toward +y).
fn sky_spherical_coordinates(dir: &Vector3f) -> Vector2f {
    Vector2f::new(acos(clamp(dir.z, -1.0, 1.0)), atan2(dir.x, dir.y))
}

/// Direction for geographical latitude and longitude.
fn geographical_to_direction(lat: Float, lon: Float) -> Vector3f {
    Vector3f::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Numerically stable angle between two unit vectors.
fn precise_angle(a: &Vector3f, b: &Vector3f) -> Float {
    2.0 * atan2((*a - *b).length(), (*a + *b).length())
}

/// Evaluates the tabulated Nishita sky for a direction.
///
/// The sun disc interpolates between two precomputed pixels with limb
/// darkening; the sky body reads a precomputed panorama with extra texture
/// rows toward the horizon; below the horizon a darkened band fades to
/// black.
///
/// * `dir`     - The direction being shaded.
/// * `data`    - Model table: sun-bottom and sun-top pixels (2x3), sun
///               elevation, rotation, angular diameter, and intensity.
/// * `texture` - The precomputed sky panorama.
pub fn sky_radiance_nishita(
    dir: &Vector3f,
    data: &[Float; 10],
    texture: Option<&crate::core::texture::Image>,
) -> Vector3f {
    let sun_elevation = data[6];
    let sun_rotation = data[7];
    let angular_diameter = data[8];
    let sun_intensity = data[9];
    let sun_disc = angular_diameter > 0.0;

    let mut xyz = Vector3f::ZERO;
    let direction = sky_spherical_coordinates(dir);

    if dir.z >= 0.0 {
        // Above the horizon.
        let sun_dir = geographical_to_direction(sun_elevation, sun_rotation + PI_OVER_TWO);
        let sun_dir_angle = precise_angle(dir, &sun_dir);
        let half_angular = angular_diameter / 2.0;
        let dir_elevation = PI_OVER_TWO - direction.x;

        if sun_dir_angle < half_angular && sun_disc {
            // Sun disc interpolation between the two tabulated pixels.
            let pixel_bottom = Vector3f::new(data[0], data[1], data[2]);
            let pixel_top = Vector3f::new(data[3], data[4], data[5]);

            if sun_elevation - half_angular > 0.0 {
                if sun_elevation + half_angular > 0.0 {
                    let y = (dir_elevation - sun_elevation) / angular_diameter + 0.5;
                    xyz = lerp(y, pixel_bottom, pixel_top) * sun_intensity;
                }
            } else if sun_elevation + half_angular > 0.0 {
                let y = dir_elevation / (sun_elevation + half_angular);
                xyz = lerp(y, pixel_bottom, pixel_top) * sun_intensity;
            }

            // Limb darkening with coefficient 0.6.
            let angle_fraction = sun_dir_angle / half_angular;
            let limb_darkening = 1.0 - 0.6 * (1.0 - safe_sqrt(1.0 - angle_fraction * angle_fraction));
            xyz *= limb_darkening;
        } else if let Some(texture) = texture {
            // Sky body, with more texture rows committed toward the horizon.
            let mut x = (direction.y + PI + sun_rotation) / TWO_PI;
            let y = (dir_elevation / PI_OVER_TWO).sqrt();
            if x > 1.0 {
                x -= 1.0;
            }
            xyz = texture.sample(&Vector2f::new(x, y)).xyz();
        }
    } else if dir.z >= -0.4 {
        if let Some(texture) = texture {
            // Black ground fade.
            let mul = (1.0 + dir.z * 2.5).powf(3.0);
            let mut x = (direction.y + PI + sun_rotation) / TWO_PI;
            let y = 1e-3;
            if x > 1.0 {
                x -= 1.0;
            }
            xyz = texture.sample(&Vector2f::new(x, y)).xyz() * mul;
        }
    }

    xyz_to_rgb(&xyz)
}

/// Tabulated Nishita sky lookup in the direction being shaded.
///
/// Inputs: `vector` (unused; the sky reads the shading direction), `scale`.
/// Outputs: `color`.
#[derive(Clone, Debug)]
pub struct TexNishita {
    /// Index of the precomputed panorama in the texture table.
    pub texture_index: usize,

    /// Model table; see [`sky_radiance_nishita`].
    pub data: [Float; 10],
}

impl TexNishita {
    pub fn compute(
        &self,
        inputs: &[Value],
        ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let scale = inputs[1].to_float();
        // The exporter's axis convention differs from the sky tables.
        let dir = shading.wo * Vector3f::new(1.0, -1.0, -1.0);
        let rgb = sky_radiance_nishita(&dir, &self.data, ctx.textures.get(self.texture_index));
        out[0] = Value::Color(Vector4f::from_rgb(rgb * scale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun_data(elevation: Float, diameter: Float) -> [Float; 10] {
        [
            1.0, 1.0, 1.0, // bottom pixel
            2.0, 2.0, 2.0, // top pixel
            elevation, 0.0, diameter, 1.0,
        ]
    }

    #[test]
    fn deep_ground_is_black() {
        let data = sun_data(0.5, 0.01);
        let rgb = sky_radiance_nishita(&Vector3f::new(0.0, 0.0, -1.0), &data, None);
        assert_eq!(rgb, Vector3f::ZERO);
    }

    #[test]
    fn sun_disc_is_brightest_at_center() {
        let elevation: Float = 0.5;
        let data = sun_data(elevation, 0.02);
        let sun_dir = geographical_to_direction(elevation, PI_OVER_TWO);

        let center = sky_radiance_nishita(&sun_dir, &data, None);

        // A direction near the rim of the disc is limb darkened.
        let rim = geographical_to_direction(elevation + 0.009, PI_OVER_TWO);
        let rim_rgb = sky_radiance_nishita(&rim, &data, None);
        assert!(center.mean() > rim_rgb.mean());
    }

    #[test]
    fn outside_disc_without_texture_is_black() {
        let data = sun_data(0.5, 0.01);
        let away = Vector3f::new(0.0, -1.0, 0.2).normalize();
        let rgb = sky_radiance_nishita(&away, &data, None);
        assert_eq!(rgb, Vector3f::ZERO);
    }
}
