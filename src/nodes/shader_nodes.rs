//! Shader leaf nodes.

use super::{EvalContext, Outputs, Value};
use crate::core::color::luminance;
use crate::core::geometry::Vector3f;
use crate::core::pbrt::*;
use crate::core::reflection::{
    fresnel_dielectric_cos, Clearcoat, Diffuse, Specular, Transmission, UberBsdf,
};
use crate::renderer::ShadingContext;

/// Reads the normal input socket, falling back to the interpolated surface
/// normal when the socket carries no meaningful direction.
fn normal_or_default(input: &Value, shading: &ShadingContext) -> Vector3f {
    let n = input.to_vector();
    if n.length_squared() < 1e-12 {
        shading.normal
    } else {
        n.normalize()
    }
}

/// The full Cycles-style principled surface, assembling all four Uber
/// lobes.
///
/// Inputs: `base color`, `metallic`, `specular`, `specular tint`,
/// `roughness`, `anisotropic`, `anisotropic rotation`, `sheen`,
/// `sheen tint`, `clearcoat`, `clearcoat roughness`, `ior`, `transmission`,
/// `transmission roughness`, `emission`, `emission strength`, `alpha`,
/// `normal`, `subsurface`, `subsurface radius`, `subsurface color`.
/// The subsurface inputs are accepted and ignored. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfPrincipled;

impl BsdfPrincipled {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let base_color = inputs[0].to_color().xyz();
        let metallic = inputs[1].to_float();
        let specular = inputs[2].to_float();
        let specular_tint = inputs[3].to_float();
        let roughness = max(inputs[4].to_float(), 1e-4);
        let anisotropic = inputs[5].to_float();
        let _anisotropic_rotation = inputs[6].to_float();
        let sheen = inputs[7].to_float();
        let sheen_tint = inputs[8].to_float();
        let clearcoat = inputs[9].to_float();
        let clearcoat_roughness = max(inputs[10].to_float(), 1e-4);
        let ior = inputs[11].to_float();
        let transmission = inputs[12].to_float();
        let transmission_roughness = inputs[13].to_float();
        let emission = inputs[14].to_color().xyz();
        let emission_strength = inputs[15].to_float();
        let alpha = inputs[16].to_float();
        let normal = normal_or_default(&inputs[17], shading);

        let diffuse_weight = (1.0 - saturate(transmission)) * (1.0 - saturate(metallic));
        let transmission_weight = saturate(transmission) * (1.0 - saturate(metallic));
        let specular_weight = 1.0 - transmission_weight;

        let lum = luminance(&base_color);
        let tint_color = if lum > 0.0 {
            base_color * (1.0 / lum)
        } else {
            Vector3f::ONE
        };

        let sheen_color = lerp(sheen_tint, Vector3f::ONE, tint_color);

        let specular_color = lerp(specular_tint, Vector3f::ONE, tint_color);
        let cspec0 = lerp(
            metallic,
            specular * 0.08 * specular_color,
            base_color,
        );

        let aspect = (1.0 - 0.9 * anisotropic).sqrt();
        let r2 = sqr(roughness);

        let mut bsdf = UberBsdf {
            diffuse: Diffuse {
                diffuse_weight: diffuse_weight * base_color,
                sheen_weight: diffuse_weight * sheen * sheen_color,
                roughness,
                translucent: false,
            },
            specular: Specular {
                alpha_x: r2 / aspect,
                alpha_y: r2 * aspect,
                cspec0,
                ior: (2.0 / (1.0 - (0.08 * specular).sqrt())) - 1.0,
                weight: specular_weight,
            },
            transmission: Transmission {
                reflection_alpha: r2,
                transmission_alpha: sqr(1.0 - (1.0 - roughness) * (1.0 - transmission_roughness)),
                base_color,
                cspec0: lerp(specular_tint, Vector3f::ONE, base_color),
                ior,
                weight: transmission_weight,
                only_refract: false,
            },
            clearcoat: Clearcoat {
                alpha: sqr(clearcoat_roughness),
                weight: clearcoat,
            },
            ..Default::default()
        };

        bsdf.lobe_probabilities[0] = diffuse_weight;
        bsdf.lobe_probabilities[1] = specular_weight;
        bsdf.lobe_probabilities[2] = transmission_weight;
        bsdf.lobe_probabilities[3] = clearcoat * 0.25;

        let weights_sum: Float = bsdf.lobe_probabilities.iter().sum();
        if weights_sum > 0.0 {
            for p in bsdf.lobe_probabilities.iter_mut() {
                *p /= weights_sum;
            }
        }

        bsdf.alpha = alpha;
        bsdf.normal = normal;
        bsdf.emission = alpha * emission * emission_strength;

        out[0] = Value::Shader(bsdf);
    }
}

/// Rough glass: the transmission lobe with matched reflection and
/// refraction roughness.
///
/// Inputs: `color`, `roughness`, `ior`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfGlass;

impl BsdfGlass {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color().xyz();
        let roughness = inputs[1].to_float();
        let ior = inputs[2].to_float();
        let alpha = sqr(max(roughness, 1e-4));

        let mut bsdf = UberBsdf {
            transmission: Transmission {
                reflection_alpha: alpha,
                transmission_alpha: alpha,
                base_color: color,
                cspec0: color,
                ior,
                weight: 1.0,
                only_refract: false,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[2] = 1.0;
        bsdf.normal = normal_or_default(&inputs[3], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Glossy metal-like reflection.
///
/// Inputs: `color`, `roughness`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfGlossy;

impl BsdfGlossy {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color().xyz();
        let roughness = inputs[1].to_float();
        let alpha = sqr(max(roughness, 1e-4));

        let mut bsdf = UberBsdf {
            specular: Specular {
                alpha_x: alpha,
                alpha_y: alpha,
                cspec0: color,
                ior: 1.45,
                weight: 1.0,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[1] = 1.0;
        bsdf.normal = normal_or_default(&inputs[2], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Lambertian-style diffuse reflection.
///
/// Inputs: `color`, `roughness`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfDiffuse;

impl BsdfDiffuse {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let mut bsdf = UberBsdf {
            diffuse: Diffuse {
                diffuse_weight: inputs[0].to_color().xyz(),
                sheen_weight: Vector3f::ZERO,
                roughness: inputs[1].to_float(),
                translucent: false,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[0] = 1.0;
        bsdf.normal = normal_or_default(&inputs[2], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Diffuse transmission through thin surfaces.
///
/// Inputs: `color`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfTranslucent;

impl BsdfTranslucent {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let mut bsdf = UberBsdf {
            diffuse: Diffuse {
                diffuse_weight: inputs[0].to_color().xyz(),
                sheen_weight: Vector3f::ZERO,
                roughness: 1.0,
                translucent: true,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[0] = 1.0;
        bsdf.normal = normal_or_default(&inputs[1], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Anisotropic glossy reflection. The anisotropy and tangent inputs are
/// accepted but the lobe stays isotropic.
///
/// Inputs: `color`, `roughness`, `anisotropy`, `rotation`, `tangent`,
/// `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfAnisotropic;

impl BsdfAnisotropic {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color().xyz();
        let roughness = inputs[1].to_float();
        let alpha = sqr(max(roughness, 1e-4));

        let mut bsdf = UberBsdf {
            specular: Specular {
                alpha_x: alpha,
                alpha_y: alpha,
                cspec0: color,
                ior: 1.45,
                weight: 1.0,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[1] = 1.0;
        bsdf.normal = normal_or_default(&inputs[5], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Pure refraction without a reflection branch.
///
/// Inputs: `color`, `roughness`, `ior`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfRefraction;

impl BsdfRefraction {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let color = inputs[0].to_color().xyz();
        let roughness = inputs[1].to_float();
        let ior = inputs[2].to_float();
        let r2 = sqr(max(roughness, 1e-4));

        let mut bsdf = UberBsdf {
            transmission: Transmission {
                reflection_alpha: r2,
                transmission_alpha: r2,
                base_color: color,
                cspec0: Vector3f::ZERO,
                ior,
                weight: 1.0,
                only_refract: true,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[2] = 1.0;
        bsdf.normal = normal_or_default(&inputs[3], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Velvet-like cloth shading, approximated by the diffuse lobe.
///
/// Inputs: `color`, `sigma`, `normal`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfVelvet;

impl BsdfVelvet {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let mut bsdf = UberBsdf {
            diffuse: Diffuse {
                diffuse_weight: inputs[0].to_color().xyz(),
                sheen_weight: Vector3f::ZERO,
                roughness: inputs[1].to_float(),
                translucent: false,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[0] = 1.0;
        bsdf.normal = normal_or_default(&inputs[2], shading);

        out[0] = Value::Shader(bsdf);
    }
}

/// Hair shading, approximated as diffuse oriented along the tangent.
///
/// Inputs: `color`, `offset`, `roughness u`, `roughness v`, `tangent`.
/// Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfHair;

impl BsdfHair {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let tangent = inputs[4].to_vector();
        let mut bsdf = UberBsdf {
            diffuse: Diffuse {
                diffuse_weight: inputs[0].to_color().xyz(),
                sheen_weight: Vector3f::ZERO,
                roughness: 0.0,
                translucent: false,
            },
            ..Default::default()
        };
        bsdf.lobe_probabilities[0] = 1.0;
        bsdf.normal = if tangent.length_squared() > 1e-12 {
            tangent.normalize()
        } else {
            shading.tu
        };

        out[0] = Value::Shader(bsdf);
    }
}

/// Cutout transparency: every ray passes straight through, tinted.
///
/// Inputs: `color`. Outputs: `bsdf`.
#[derive(Clone, Debug, Default)]
pub struct BsdfTransparent;

impl BsdfTransparent {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let bsdf = UberBsdf {
            alpha: 0.0,
            alpha_weight: inputs[0].to_color().xyz(),
            ..Default::default()
        };
        out[0] = Value::Shader(bsdf);
    }
}

/// Pure emitter.
///
/// Inputs: `color`, `strength`. Outputs: `emission`.
#[derive(Clone, Debug, Default)]
pub struct Emission;

impl Emission {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let mut bsdf = UberBsdf {
            emission: inputs[0].to_color().xyz() * inputs[1].to_float(),
            ..Default::default()
        };
        bsdf.lobe_probabilities[0] = 1.0;
        out[0] = Value::Shader(bsdf);
    }
}

/// World background emitter.
///
/// Inputs: `color`, `strength`. Outputs: `background`.
#[derive(Clone, Debug, Default)]
pub struct Background;

impl Background {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let bsdf = UberBsdf {
            emission: inputs[0].to_color().xyz() * inputs[1].to_float(),
            ..Default::default()
        };
        out[0] = Value::Shader(bsdf);
    }
}

/// Dielectric Fresnel factor against the viewing direction.
///
/// Inputs: `ior`, `normal`. Outputs: `fac`.
#[derive(Clone, Debug, Default)]
pub struct FresnelNode;

impl FresnelNode {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let ior = inputs[0].to_float();
        let normal = normal_or_default(&inputs[1], shading);

        let cos_i = shading.wo.dot(&normal);
        let backfacing = cos_i < 0.0;
        let mut eta = max(ior, 1e-5);
        if backfacing {
            eta = 1.0 / eta;
        }

        out[0] = Value::Float(fresnel_dielectric_cos(cos_i, eta));
    }
}

/// Fresnel and facing weights for layering shaders, with a blend bias.
///
/// Inputs: `blend`, `normal`. Outputs: `fresnel`, `facing`.
#[derive(Clone, Debug, Default)]
pub struct LayerWeight;

impl LayerWeight {
    pub fn compute(
        &self,
        inputs: &[Value],
        _ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        let blend = inputs[0].to_float();
        let normal = normal_or_default(&inputs[1], shading);

        let cos_i = shading.wo.dot(&normal);
        let backfacing = cos_i < 0.0;

        let mut eta = max(1.0 - blend, 1e-5);
        eta = if backfacing { eta } else { 1.0 / eta };

        let fresnel = fresnel_dielectric_cos(cos_i, eta);

        let mut facing = abs(cos_i);
        if blend != 0.5 {
            let mut b = clamp(blend, 0.0, 1.0 - 1e-5);
            b = if b < 0.5 { 2.0 * b } else { 0.5 / (1.0 - b) };
            facing = facing.powf(b);
        }

        out[0] = Value::Float(fresnel);
        out[1] = Value::Float(1.0 - facing);
    }
}

/// Volume scattering. Unsupported; produces an inert shader.
///
/// Inputs: `color`, `density`, `anisotropy`. Outputs: `volume`.
#[derive(Clone, Debug, Default)]
pub struct VolumeScatter;

impl VolumeScatter {
    pub fn compute(
        &self,
        _inputs: &[Value],
        _ctx: &EvalContext,
        _shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        out[0] = Value::Shader(UberBsdf::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::EvalContext;

    fn principled_inputs() -> Vec<Value> {
        let mut inputs = vec![Value::Float(0.0); 21];
        inputs[0] = Value::Color(crate::core::geometry::Vector4f::new(0.8, 0.8, 0.8, 1.0));
        inputs[2] = Value::Float(0.5); // specular
        inputs[4] = Value::Float(0.5); // roughness
        inputs[11] = Value::Float(1.45); // ior
        inputs[16] = Value::Float(1.0); // alpha
        inputs[17] = Value::Vector(Vector3f::new(0.0, 0.0, 1.0)); // normal
        inputs
    }

    fn assemble(inputs: &[Value]) -> UberBsdf {
        let node = BsdfPrincipled;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(inputs, &EvalContext::empty(), &mut shading, &mut out);
        match out[0] {
            Value::Shader(s) => s,
            _ => panic!("expected shader output"),
        }
    }

    #[test]
    fn principled_probabilities_are_normalized() {
        let bsdf = assemble(&principled_inputs());
        let sum: Float = bsdf.lobe_probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(bsdf.lobe_probabilities.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn metallic_kills_diffuse() {
        let mut inputs = principled_inputs();
        inputs[1] = Value::Float(1.0);
        let bsdf = assemble(&inputs);
        assert_eq!(bsdf.lobe_probabilities[0], 0.0);
        // A fully metallic surface tints its specular by the base color.
        assert!((bsdf.specular.cspec0 - Vector3f::splat(0.8)).length() < 1e-5);
    }

    #[test]
    fn transmission_splits_specular() {
        let mut inputs = principled_inputs();
        inputs[12] = Value::Float(1.0);
        let bsdf = assemble(&inputs);
        assert_eq!(bsdf.lobe_probabilities[0], 0.0);
        assert!(bsdf.lobe_probabilities[2] > 0.0);
        assert!((bsdf.transmission.ior - 1.45).abs() < 1e-6);
    }

    #[test]
    fn anisotropy_splits_roughness() {
        let mut inputs = principled_inputs();
        inputs[5] = Value::Float(0.8);
        let bsdf = assemble(&inputs);
        assert!(bsdf.specular.alpha_x > bsdf.specular.alpha_y);
    }

    #[test]
    fn emission_scales_with_alpha() {
        let mut inputs = principled_inputs();
        inputs[14] = Value::Color(crate::core::geometry::Vector4f::ONE);
        inputs[15] = Value::Float(2.0);
        inputs[16] = Value::Float(0.5);
        let bsdf = assemble(&inputs);
        assert!((bsdf.emission - Vector3f::splat(1.0)).length() < 1e-5);
        assert_eq!(bsdf.alpha, 0.5);
    }

    #[test]
    fn transparent_sets_null_scattering() {
        let node = BsdfTransparent;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[Value::Color(crate::core::geometry::Vector4f::new(
                0.5, 0.6, 0.7, 1.0,
            ))],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let bsdf = out[0].to_shader();
        assert_eq!(bsdf.alpha, 0.0);
        assert_eq!(bsdf.alpha_weight, Vector3f::new(0.5, 0.6, 0.7));
    }

    #[test]
    fn refraction_only_refracts() {
        let node = BsdfRefraction;
        let mut out = Outputs::default();
        let mut shading = ShadingContext::default();
        node.compute(
            &[
                Value::Float(1.0),
                Value::Float(0.0),
                Value::Float(1.5),
                Value::Vector(Vector3f::ZERO),
            ],
            &EvalContext::empty(),
            &mut shading,
            &mut out,
        );
        let bsdf = out[0].to_shader();
        assert!(bsdf.transmission.only_refract);
        assert_eq!(bsdf.lobe_probabilities[2], 1.0);
    }
}
