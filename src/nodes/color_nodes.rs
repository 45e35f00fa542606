//! Color manipulation nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::color::{hsv_to_rgb, luminance, rgb_to_hsv};
use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::pbrt::*;
use crate::renderer::ShadingContext;

/// Color model for `SeparateColor`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeparateColorMode {
    Rgb,
    Hsv,
}

/// Splits a color into channels of the chosen model.
///
/// Inputs: `color`. Outputs: `red`, `green`, `blue`.
#[derive(Clone, Debug)]
pub struct SeparateColor {
    /// The color model.
    pub mode: SeparateColorMode,
}

impl SeparateColor {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color().xyz();
        let channels = match self.mode {
            SeparateColorMode::Rgb => color,
            SeparateColorMode::Hsv => rgb_to_hsv(&color),
        };
        out[0] = Value::Float(channels.x);
        out[1] = Value::Float(channels.y);
        out[2] = Value::Float(channels.z);
    }
}

/// Builds an opaque color from RGB channels.
///
/// Inputs: `red`, `green`, `blue`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct CombineColor;

impl CombineColor {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(Vector4f::new(
            inputs[0].to_float(),
            inputs[1].to_float(),
            inputs[2].to_float(),
            1.0,
        ));
    }
}

/// Hue/saturation/value adjustment blended by a factor.
///
/// Inputs: `hue`, `saturation`, `value`, `fac`, `color`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct HueSaturation;

impl HueSaturation {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let hue = inputs[0].to_float();
        let saturation = inputs[1].to_float();
        let value = inputs[2].to_float();
        let fac = inputs[3].to_float();
        let color = inputs[4].to_color();

        let mut hsv = rgb_to_hsv(&color.xyz());
        hsv.x = (hsv.x + hue + 0.5) % 1.0;
        hsv.y = saturate(hsv.y * saturation);
        hsv.z *= value;

        let result = hsv_to_rgb(&hsv).max(&Vector3f::ZERO);
        out[0] = Value::Color(color.with_xyz(lerp(fac, color.xyz(), result)));
    }
}

/// Linear brightness and contrast adjustment, clamped at zero.
///
/// Inputs: `color`, `bright`, `contrast`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct BrightnessContrast;

impl BrightnessContrast {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color();
        let bright = inputs[1].to_float();
        let contrast = inputs[2].to_float();

        let a = 1.0 + contrast;
        let b = bright - contrast / 2.0;

        out[0] = Value::Color((color * a + Vector4f::splat(b)).max(&Vector4f::ZERO));
    }
}

/// Per-channel power curve. A gamma of zero maps everything to white, and
/// non-positive channels pass through untouched.
///
/// Inputs: `color`, `gamma`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct Gamma;

impl Gamma {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color();
        let gamma = inputs[1].to_float();

        let rgb = if gamma == 0.0 {
            Vector3f::ONE
        } else {
            let apply = |c: Float| if c > 0.0 { c.powf(gamma) } else { c };
            let c = color.xyz();
            Vector3f::new(apply(c.x), apply(c.y), apply(c.z))
        };

        out[0] = Value::Color(color.with_xyz(rgb));
    }
}

/// Inverts a color toward its complement by a factor.
///
/// Inputs: `fac`, `color`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct ColorInvert;

impl ColorInvert {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let fac = inputs[0].to_float();
        let color = inputs[1].to_color();

        let rgb = color.xyz();
        out[0] = Value::Color(color.with_xyz(rgb - fac * (2.0 * rgb - Vector3f::ONE)));
    }
}

/// Blend operation for `ColorMix`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMixBlend {
    Mix,
    Add,
    Multiply,
    Screen,
    Overlay,
    Sub,
    Color,
    Lighten,
    Darken,
    Value,
}

/// Blends two colors by a factor using one of the classic blend modes.
///
/// Inputs: `fac`, `color1`, `color2`. Outputs: `color`.
#[derive(Clone, Debug)]
pub struct ColorMix {
    /// The blend mode.
    pub blend: ColorMixBlend,

    /// Clamp the result to [0, 1].
    pub clamp: bool,
}

impl ColorMix {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let fac = inputs[0].to_float();
        let color1 = inputs[1].to_color();
        let color2 = inputs[2].to_color();

        let mut color = match self.blend {
            ColorMixBlend::Mix => lerp(fac, color1, color2),
            ColorMixBlend::Add => color1 + color2 * fac,
            ColorMixBlend::Sub => color1 - color2 * fac,
            ColorMixBlend::Multiply => color1 * lerp(fac, Vector4f::ONE, color2),
            ColorMixBlend::Screen => {
                Vector4f::ONE - (Vector4f::ONE - color1 * fac) * (Vector4f::ONE - color1)
            }
            ColorMixBlend::Overlay => {
                let mut color = color1;
                for dim in 0..3 {
                    if color[dim] < 0.5 {
                        color[dim] *= 1.0 - fac + 2.0 * fac * color2[dim];
                    } else {
                        color[dim] = 1.0
                            - (1.0 - fac + 2.0 * fac * (1.0 - color2[dim])) * (1.0 - color[dim]);
                    }
                }
                color
            }
            ColorMixBlend::Color => {
                let hsv2 = rgb_to_hsv(&color2.xyz());
                if hsv2.y == 0.0 {
                    color1
                } else {
                    let mut hsv = rgb_to_hsv(&color1.xyz());
                    hsv.x = hsv2.x;
                    hsv.y = hsv2.y;
                    let rgb = hsv_to_rgb(&hsv);
                    lerp(fac, color1, Vector4f::new(rgb.x, rgb.y, rgb.z, color2.w))
                }
            }
            ColorMixBlend::Lighten => lerp(fac, color1, color1.max(&color2)),
            ColorMixBlend::Darken => lerp(fac, color1, color1.min(&color2)),
            ColorMixBlend::Value => {
                let mut hsv = rgb_to_hsv(&color1.xyz());
                hsv.z = rgb_to_hsv(&color2.xyz()).z;
                let rgb = hsv_to_rgb(&hsv);
                lerp(fac, color1, Vector4f::new(rgb.x, rgb.y, rgb.z, color2.w))
            }
        };

        if self.clamp {
            color = color.saturate();
        }

        out[0] = Value::Color(color);
    }
}

/// A color-ramp control point.
#[derive(Copy, Clone, Debug)]
pub struct RampElement {
    /// Position of the control point in [0, 1].
    pub position: Float,

    /// Color at the control point.
    pub color: Vector4f,
}

/// Piecewise-linear color ramp over ordered control points.
///
/// Inputs: `fac`. Outputs: `color`.
#[derive(Clone, Debug)]
pub struct ColorRamp {
    /// Control points ordered by position.
    pub elements: Vec<RampElement>,
}

impl ColorRamp {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let fac = inputs[0].to_float();
        let elements = &self.elements;

        if elements.is_empty() {
            out[0] = Value::Color(Vector4f::ONE);
            return;
        }

        if fac < elements[0].position {
            out[0] = Value::Color(elements[0].color);
            return;
        }
        if fac > elements[elements.len() - 1].position {
            out[0] = Value::Color(elements[elements.len() - 1].color);
            return;
        }

        for i in 1..elements.len() {
            if elements[i].position >= fac {
                let a = elements[i - 1];
                let b = elements[i];
                let v = (fac - a.position) / (b.position - a.position);
                out[0] = Value::Color(a.color * (1.0 - v) + b.color * v);
                return;
            }
        }

        out[0] = Value::Color(elements[elements.len() - 1].color);
    }
}

/// RGB curve adjustment. Unsupported; passes the color through.
///
/// Inputs: `fac`, `color`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct ColorCurves;

impl ColorCurves {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Color(inputs[1].to_color());
    }
}

const BLACKBODY_TABLE_R: [[Float; 3]; 7] = [
    [1.61919106e+03, -2.05010916e-03, 5.02995757e+00],
    [2.48845471e+03, -1.11330907e-03, 3.22621544e+00],
    [3.34143193e+03, -4.86551192e-04, 1.76486769e+00],
    [4.09461742e+03, -1.27446582e-04, 7.25731635e-01],
    [4.67028036e+03, 2.91258199e-05, 1.26703442e-01],
    [4.59509185e+03, 2.87495649e-05, 1.50345020e-01],
    [3.78717450e+03, 9.35907826e-06, 3.99075871e-01],
];

const BLACKBODY_TABLE_G: [[Float; 3]; 7] = [
    [-4.88999748e+02, 6.04330754e-04, -7.55807526e-02],
    [-7.55994277e+02, 3.16730098e-04, 4.78306139e-01],
    [-1.02363977e+03, 1.20223470e-04, 9.36662319e-01],
    [-1.26571316e+03, 4.87340896e-06, 1.27054498e+00],
    [-1.42529332e+03, -4.01150431e-05, 1.43972784e+00],
    [-1.17554822e+03, -2.16378048e-05, 1.30408023e+00],
    [-5.00799571e+02, -4.59832026e-06, 1.09098763e+00],
];

const BLACKBODY_TABLE_B: [[Float; 4]; 7] = [
    [5.96945309e-11, -4.85742887e-08, -9.70622247e-05, -4.07936148e-03],
    [2.40430366e-11, 5.55021075e-08, -1.98503712e-04, 2.89312858e-02],
    [-1.40949732e-11, 1.89878968e-07, -3.56632824e-04, 9.10767778e-02],
    [-3.61460868e-11, 2.84822009e-07, -4.93211319e-04, 1.56723440e-01],
    [-1.97075738e-11, 1.75359352e-07, -2.50542825e-04, -2.22783266e-02],
    [-1.61997957e-13, -1.64216008e-08, 3.86216271e-04, -7.38077418e-01],
    [6.72650283e-13, -2.73078809e-08, 4.24098264e-04, -7.52335691e-01],
];

/// Rational-polynomial blackbody emitter color over 800 K to 12000 K. The
/// result can leave the sRGB gamut and only needs clamping on display.
fn blackbody(t: Float) -> Vector3f {
    if t >= 12000.0 {
        return Vector3f::new(0.8262954810464208, 0.9945080501520986, 1.566307710274283);
    } else if t < 800.0 {
        // Arbitrary lower limit where light is very dim, matching OSL.
        return Vector3f::new(5.413294490189271, -0.20319390035873933, -0.0822535242887164);
    }

    let i = if t >= 6365.0 {
        6
    } else if t >= 3315.0 {
        5
    } else if t >= 1902.0 {
        4
    } else if t >= 1449.0 {
        3
    } else if t >= 1167.0 {
        2
    } else if t >= 965.0 {
        1
    } else {
        0
    };

    let r = &BLACKBODY_TABLE_R[i];
    let g = &BLACKBODY_TABLE_G[i];
    let b = &BLACKBODY_TABLE_B[i];

    let t_inv = 1.0 / t;
    Vector3f::new(
        r[0] * t_inv + r[1] * t + r[2],
        g[0] * t_inv + g[1] * t + g[2],
        ((b[0] * t + b[1]) * t + b[2]) * t + b[3],
    )
}

/// Blackbody radiation color, normalized to unit luminance.
///
/// Inputs: `temperature`. Outputs: `color`.
#[derive(Clone, Debug, Default)]
pub struct Blackbody;

impl Blackbody {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let b = blackbody(inputs[0].to_float());
        out[0] = Value::Color(Vector4f::from_rgb(b / luminance(&b)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::EvalContext;

    fn run(node: &ColorMix, fac: Float, c1: Vector4f, c2: Vector4f) -> Vector4f {
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[Value::Float(fac), Value::Color(c1), Value::Color(c2)],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        out[0].to_color()
    }

    #[test]
    fn overlay_dark_branch() {
        // Channels below one half take the multiplicative branch:
        // 0.25 * (1 - 1 + 2 * 1 * 0.75) = 0.375.
        let node = ColorMix {
            blend: ColorMixBlend::Overlay,
            clamp: false,
        };
        let c = run(&node, 1.0, Vector4f::splat(0.25), Vector4f::splat(0.75));
        assert!((c.x - 0.375).abs() < 1e-6, "got {}", c.x);
        assert!((c.y - 0.375).abs() < 1e-6);
        assert!((c.z - 0.375).abs() < 1e-6);
    }

    #[test]
    fn overlay_bright_branch() {
        // 1 - (1 - 1 + 2 * 1 * (1 - 0.25)) * (1 - 0.75) = 0.625.
        let node = ColorMix {
            blend: ColorMixBlend::Overlay,
            clamp: false,
        };
        let c = run(&node, 1.0, Vector4f::splat(0.75), Vector4f::splat(0.25));
        assert!((c.x - 0.625).abs() < 1e-6, "got {}", c.x);
    }

    #[test]
    fn mix_is_linear() {
        let node = ColorMix {
            blend: ColorMixBlend::Mix,
            clamp: false,
        };
        let c = run(
            &node,
            0.5,
            Vector4f::splat(0.0),
            Vector4f::splat(1.0),
        );
        assert!((c.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn darken_picks_minimum() {
        let node = ColorMix {
            blend: ColorMixBlend::Darken,
            clamp: false,
        };
        let c = run(
            &node,
            1.0,
            Vector4f::new(0.8, 0.1, 0.5, 1.0),
            Vector4f::new(0.2, 0.9, 0.5, 1.0),
        );
        assert!((c.x - 0.2).abs() < 1e-6);
        assert!((c.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn ramp_interpolates_between_stops() {
        let ramp = ColorRamp {
            elements: vec![
                RampElement {
                    position: 0.0,
                    color: Vector4f::splat(0.0),
                },
                RampElement {
                    position: 1.0,
                    color: Vector4f::splat(1.0),
                },
            ],
        };
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        ramp.compute(
            &[Value::Float(0.25)],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert!((out[0].to_color().x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn ramp_clamps_outside_stops() {
        let ramp = ColorRamp {
            elements: vec![
                RampElement {
                    position: 0.2,
                    color: Vector4f::splat(0.3),
                },
                RampElement {
                    position: 0.8,
                    color: Vector4f::splat(0.9),
                },
            ],
        };
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        ramp.compute(
            &[Value::Float(0.0)],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert!((out[0].to_color().x - 0.3).abs() < 1e-6);
    }

    #[test]
    fn gamma_zero_is_white() {
        let node = Gamma;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[
                Value::Color(Vector4f::new(0.2, 0.4, 0.8, 1.0)),
                Value::Float(0.0),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert_eq!(out[0].to_color().xyz(), Vector3f::ONE);
    }

    #[test]
    fn blackbody_has_unit_luminance() {
        let node = Blackbody;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[Value::Float(6500.0)],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let c = out[0].to_color().xyz();
        assert!((luminance(&c) - 1.0).abs() < 1e-4);
        // Warm temperatures skew red over blue.
        let mut out2 = Outputs::default();
        node.compute(
            &[Value::Float(1500.0)],
            &EvalContext::empty(),
            &mut shading,
            &mut out2,
        );
        let warm = out2[0].to_color().xyz();
        assert!(warm.x > warm.z);
    }

    #[test]
    fn invert_full_factor_complements() {
        let node = ColorInvert;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[Value::Float(1.0), Value::Color(Vector4f::splat(0.25))],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        assert!((out[0].to_color().x - 0.75).abs() < 1e-6);
    }
}
