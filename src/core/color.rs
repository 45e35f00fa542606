//! Color space conversions.

use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;

/// Relative luminance of a linear RGB color per the ITU-R standard.
///
/// * `color` - Linear RGB color.
pub fn luminance(color: &Vector3f) -> Float {
    Vector3f::new(0.2126, 0.7152, 0.0722).dot(color)
}

/// Converts linear RGB to hue/saturation/value.
///
/// * `rgb` - The RGB color.
pub fn rgb_to_hsv(rgb: &Vector3f) -> Vector3f {
    let cmax = max(rgb.x, max(rgb.y, rgb.z));
    let cmin = min(rgb.x, min(rgb.y, rgb.z));
    let cdelta = cmax - cmin;

    let mut h = 0.0;
    let mut s = 0.0;
    let v = cmax;

    if cmax != 0.0 {
        s = cdelta / cmax;
    }

    if s != 0.0 {
        let c = (Vector3f::splat(cmax) - *rgb) / cdelta;

        if rgb.x == cmax {
            h = c.z - c.y;
        } else if rgb.y == cmax {
            h = 2.0 + c.x - c.z;
        } else {
            h = 4.0 + c.y - c.x;
        }

        h /= 6.0;

        if h < 0.0 {
            h += 1.0;
        }
    }

    Vector3f::new(h, s, v)
}

/// Converts hue/saturation/value to linear RGB.
///
/// * `hsv` - The HSV color.
pub fn hsv_to_rgb(hsv: &Vector3f) -> Vector3f {
    let mut h = hsv.x;
    let s = hsv.y;
    let v = hsv.z;

    if s == 0.0 {
        return Vector3f::splat(v);
    }

    if h == 1.0 {
        h = 0.0;
    }

    h *= 6.0;

    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i as i32 {
        0 => Vector3f::new(v, t, p),
        1 => Vector3f::new(q, v, p),
        2 => Vector3f::new(p, v, t),
        3 => Vector3f::new(p, q, v),
        4 => Vector3f::new(t, p, v),
        _ => Vector3f::new(v, p, q),
    }
}

/// Converts CIE XYZ to linear RGB with the fixed sRGB-primaries matrix.
///
/// * `xyz` - The XYZ color.
pub fn xyz_to_rgb(xyz: &Vector3f) -> Vector3f {
    Vector3f::new(
        3.240479 * xyz.x + -1.537150 * xyz.y + -0.498535 * xyz.z,
        -0.969256 * xyz.x + 1.875991 * xyz.y + 0.041556 * xyz.z,
        0.055648 * xyz.x + -0.204043 * xyz.y + 1.057311 * xyz.z,
    )
}

/// Converts chromaticity plus luminance (xyY) to XYZ.
///
/// * `x` - x chromaticity.
/// * `y` - y chromaticity.
/// * `yy` - Luminance Y.
pub fn xyy_to_xyz(x: Float, y: Float, yy: Float) -> Vector3f {
    let big_x = if y != 0.0 { (x / y) * yy } else { 0.0 };
    let big_z = if y != 0.0 && yy != 0.0 {
        (1.0 - x - y) / y * yy
    } else {
        0.0
    };

    Vector3f::new(big_x, yy, big_z)
}

/// Decodes one sRGB-encoded channel to linear, following the piecewise
/// IEC 61966-2-1 curve.
///
/// * `c` - The encoded channel value.
pub fn srgb_to_linear(c: Float) -> Float {
    if c < 0.04045 {
        if c < 0.0 {
            0.0
        } else {
            c * (1.0 / 12.92)
        }
    } else {
        ((c + 0.055) * (1.0 / 1.055)).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_round_trip() {
        let colors = [
            Vector3f::new(0.8, 0.2, 0.1),
            Vector3f::new(0.1, 0.9, 0.4),
            Vector3f::new(0.3, 0.3, 0.9),
            Vector3f::new(0.5, 0.5, 0.5),
        ];
        for c in colors {
            let back = hsv_to_rgb(&rgb_to_hsv(&c));
            assert!((back - c).length() < 1e-5, "{c:?} -> {back:?}");
        }
    }

    #[test]
    fn grayscale_has_no_saturation() {
        let hsv = rgb_to_hsv(&Vector3f::splat(0.7));
        assert_eq!(hsv.y, 0.0);
        assert_eq!(hsv.z, 0.7);
    }

    #[test]
    fn luminance_weights_sum_to_one() {
        assert!((luminance(&Vector3f::ONE) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn srgb_decode_limits() {
        assert_eq!(srgb_to_linear(-0.5), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-5);
        // The linear segment.
        assert!((srgb_to_linear(0.02) - 0.02 / 12.92).abs() < 1e-7);
    }

    #[test]
    fn xyz_white_is_neutral() {
        let rgb = xyz_to_rgb(&Vector3f::new(0.9505, 1.0, 1.089));
        assert!((rgb.x - 1.0).abs() < 2e-2);
        assert!((rgb.y - 1.0).abs() < 2e-2);
        assert!((rgb.z - 1.0).abs() < 2e-2);
    }
}
