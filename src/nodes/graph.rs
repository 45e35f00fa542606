//! Node graph IR and interpreter.

use super::*;
use crate::renderer::ShadingContext;

/// Maximum number of output sockets any node kind declares.
pub const MAX_OUTPUTS: usize = 8;

/// Output socket storage for one node.
pub type Outputs = [Value; MAX_OUTPUTS];

/// Every node kind the compiler can emit. Dispatch is a closed match, so
/// evaluating a material never goes through dynamic allocation or virtual
/// calls.
#[derive(Clone, Debug)]
pub enum NodeKind {
    // Geometry and attribute sources.
    NewGeometry(NewGeometry),
    TextureCoordinate(TextureCoordinate),
    UvMapCoordinate(UvMapCoordinate),
    Attribute(Attribute),
    ObjectInfo(ObjectInfo),
    LightPath(LightPath),
    LightFalloff(LightFalloff),
    ParticleInfo(ParticleInfo),
    VertexColor(VertexColor),
    AmbientOcclusion(AmbientOcclusion),
    Value(ValueNode),
    Rgb(RgbNode),
    RgbToBw(RgbToBw),

    // Math.
    Math(Math),
    VectorMath(VectorMath),
    Mapping(Mapping),
    SeparateVector(SeparateVector),
    CombineVector(CombineVector),
    MapRange(MapRange),

    // Color.
    SeparateColor(SeparateColor),
    CombineColor(CombineColor),
    HueSaturation(HueSaturation),
    BrightnessContrast(BrightnessContrast),
    Gamma(Gamma),
    ColorInvert(ColorInvert),
    ColorMix(ColorMix),
    ColorRamp(ColorRamp),
    ColorCurves(ColorCurves),
    Blackbody(Blackbody),

    // Textures.
    TexImage(TexImage),
    TexChecker(TexChecker),
    TexNoise(TexNoise),
    TexGradient(TexGradient),
    TexNishita(TexNishita),
    TexMagic(TexMagic),
    TexVoronoi(TexVoronoi),
    TexMusgrave(TexMusgrave),
    TexBrick(TexBrick),
    TexWave(TexWave),
    TexIes(TexIes),

    // Normals.
    NormalMap(NormalMap),
    Bump(Bump),
    Displacement(Displacement),
    NormalProduct(NormalProduct),

    // Shader leaves.
    BsdfPrincipled(BsdfPrincipled),
    BsdfGlass(BsdfGlass),
    BsdfGlossy(BsdfGlossy),
    BsdfDiffuse(BsdfDiffuse),
    BsdfTranslucent(BsdfTranslucent),
    BsdfAnisotropic(BsdfAnisotropic),
    BsdfRefraction(BsdfRefraction),
    BsdfVelvet(BsdfVelvet),
    BsdfHair(BsdfHair),
    BsdfTransparent(BsdfTransparent),
    Emission(Emission),
    Background(Background),
    Fresnel(FresnelNode),
    LayerWeight(LayerWeight),
    VolumeScatter(VolumeScatter),

    // Combinators.
    MixShader(MixShader),
    AddShader(AddShader),
    Mix(Mix),

    // Outputs.
    OutputMaterial(OutputMaterial),
    OutputWorld(OutputWorld),
    OutputLight(OutputLight),
}

impl NodeKind {
    /// Evaluates the node.
    ///
    /// * `inputs`  - Resolved input socket values, in declared order.
    /// * `ctx`     - Evaluation resources.
    /// * `shading` - The shading context being populated.
    /// * `out`     - Output socket storage.
    pub fn compute(
        &self,
        inputs: &[Value],
        ctx: &EvalContext,
        shading: &mut ShadingContext,
        out: &mut Outputs,
    ) {
        match self {
            NodeKind::NewGeometry(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TextureCoordinate(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::UvMapCoordinate(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Attribute(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ObjectInfo(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::LightPath(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::LightFalloff(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ParticleInfo(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::VertexColor(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::AmbientOcclusion(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Value(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Rgb(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::RgbToBw(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Math(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::VectorMath(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Mapping(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::SeparateVector(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::CombineVector(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::MapRange(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::SeparateColor(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::CombineColor(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::HueSaturation(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BrightnessContrast(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Gamma(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ColorInvert(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ColorMix(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ColorRamp(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::ColorCurves(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Blackbody(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexImage(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexChecker(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexNoise(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexGradient(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexNishita(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexMagic(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexVoronoi(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexMusgrave(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexBrick(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexWave(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::TexIes(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::NormalMap(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Bump(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Displacement(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::NormalProduct(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfPrincipled(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfGlass(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfGlossy(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfDiffuse(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfTranslucent(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfAnisotropic(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfRefraction(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfVelvet(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfHair(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::BsdfTransparent(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Emission(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Background(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Fresnel(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::LayerWeight(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::VolumeScatter(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::MixShader(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::AddShader(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::Mix(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::OutputMaterial(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::OutputWorld(n) => n.compute(inputs, ctx, shading, out),
            NodeKind::OutputLight(n) => n.compute(inputs, ctx, shading, out),
        }
    }

    /// Returns true for kinds that only return a safe default.
    pub fn is_stub(&self) -> bool {
        matches!(
            self,
            NodeKind::ObjectInfo(_)
                | NodeKind::ParticleInfo(_)
                | NodeKind::VertexColor(_)
                | NodeKind::AmbientOcclusion(_)
                | NodeKind::ColorCurves(_)
                | NodeKind::TexMagic(_)
                | NodeKind::TexVoronoi(_)
                | NodeKind::TexMusgrave(_)
                | NodeKind::TexBrick(_)
                | NodeKind::TexWave(_)
                | NodeKind::TexIes(_)
                | NodeKind::Bump(_)
                | NodeKind::Displacement(_)
                | NodeKind::NormalProduct(_)
                | NodeKind::VolumeScatter(_)
        )
    }

    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::NewGeometry(_) => "NewGeometry",
            NodeKind::TextureCoordinate(_) => "TextureCoordinate",
            NodeKind::UvMapCoordinate(_) => "UvMapCoordinate",
            NodeKind::Attribute(_) => "Attribute",
            NodeKind::ObjectInfo(_) => "ObjectInfo",
            NodeKind::LightPath(_) => "LightPath",
            NodeKind::LightFalloff(_) => "LightFalloff",
            NodeKind::ParticleInfo(_) => "ParticleInfo",
            NodeKind::VertexColor(_) => "VertexColor",
            NodeKind::AmbientOcclusion(_) => "AmbientOcclusion",
            NodeKind::Value(_) => "Value",
            NodeKind::Rgb(_) => "Rgb",
            NodeKind::RgbToBw(_) => "RgbToBw",
            NodeKind::Math(_) => "Math",
            NodeKind::VectorMath(_) => "VectorMath",
            NodeKind::Mapping(_) => "Mapping",
            NodeKind::SeparateVector(_) => "SeparateVector",
            NodeKind::CombineVector(_) => "CombineVector",
            NodeKind::MapRange(_) => "MapRange",
            NodeKind::SeparateColor(_) => "SeparateColor",
            NodeKind::CombineColor(_) => "CombineColor",
            NodeKind::HueSaturation(_) => "HueSaturation",
            NodeKind::BrightnessContrast(_) => "BrightnessContrast",
            NodeKind::Gamma(_) => "Gamma",
            NodeKind::ColorInvert(_) => "ColorInvert",
            NodeKind::ColorMix(_) => "ColorMix",
            NodeKind::ColorRamp(_) => "ColorRamp",
            NodeKind::ColorCurves(_) => "ColorCurves",
            NodeKind::Blackbody(_) => "Blackbody",
            NodeKind::TexImage(_) => "TexImage",
            NodeKind::TexChecker(_) => "TexChecker",
            NodeKind::TexNoise(_) => "TexNoise",
            NodeKind::TexGradient(_) => "TexGradient",
            NodeKind::TexNishita(_) => "TexNishita",
            NodeKind::TexMagic(_) => "TexMagic",
            NodeKind::TexVoronoi(_) => "TexVoronoi",
            NodeKind::TexMusgrave(_) => "TexMusgrave",
            NodeKind::TexBrick(_) => "TexBrick",
            NodeKind::TexWave(_) => "TexWave",
            NodeKind::TexIes(_) => "TexIes",
            NodeKind::NormalMap(_) => "NormalMap",
            NodeKind::Bump(_) => "Bump",
            NodeKind::Displacement(_) => "Displacement",
            NodeKind::NormalProduct(_) => "NormalProduct",
            NodeKind::BsdfPrincipled(_) => "BsdfPrincipled",
            NodeKind::BsdfGlass(_) => "BsdfGlass",
            NodeKind::BsdfGlossy(_) => "BsdfGlossy",
            NodeKind::BsdfDiffuse(_) => "BsdfDiffuse",
            NodeKind::BsdfTranslucent(_) => "BsdfTranslucent",
            NodeKind::BsdfAnisotropic(_) => "BsdfAnisotropic",
            NodeKind::BsdfRefraction(_) => "BsdfRefraction",
            NodeKind::BsdfVelvet(_) => "BsdfVelvet",
            NodeKind::BsdfHair(_) => "BsdfHair",
            NodeKind::BsdfTransparent(_) => "BsdfTransparent",
            NodeKind::Emission(_) => "Emission",
            NodeKind::Background(_) => "Background",
            NodeKind::Fresnel(_) => "Fresnel",
            NodeKind::LayerWeight(_) => "LayerWeight",
            NodeKind::VolumeScatter(_) => "VolumeScatter",
            NodeKind::MixShader(_) => "MixShader",
            NodeKind::AddShader(_) => "AddShader",
            NodeKind::Mix(_) => "Mix",
            NodeKind::OutputMaterial(_) => "OutputMaterial",
            NodeKind::OutputWorld(_) => "OutputWorld",
            NodeKind::OutputLight(_) => "OutputLight",
        }
    }
}

/// Where an input socket reads its value from.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A compile-time constant.
    Constant(Value),

    /// The output socket of an earlier node.
    Link {
        /// Index of the source node.
        node: usize,

        /// Output socket index on the source node.
        output: usize,
    },
}

impl Binding {
    /// Shorthand for a constant scalar binding.
    pub fn float(v: crate::core::pbrt::Float) -> Self {
        Binding::Constant(Value::Float(v))
    }

    /// Shorthand for a constant vector binding.
    pub fn vector(v: crate::core::geometry::Vector3f) -> Self {
        Binding::Constant(Value::Vector(v))
    }

    /// Shorthand for a constant color binding.
    pub fn color(v: crate::core::geometry::Vector4f) -> Self {
        Binding::Constant(Value::Color(v))
    }

    /// Shorthand for a link binding.
    pub fn link(node: usize, output: usize) -> Self {
        Binding::Link { node, output }
    }
}

/// One node instance: a kind plus its input bindings in socket order.
#[derive(Clone, Debug)]
pub struct Node {
    /// The node kind and its static parameters.
    pub kind: NodeKind,

    /// Input bindings in socket order.
    pub inputs: Vec<Binding>,
}

impl Node {
    /// Create a new `Node`.
    ///
    /// * `kind`   - The node kind.
    /// * `inputs` - Input bindings in socket order.
    pub fn new(kind: NodeKind, inputs: Vec<Binding>) -> Self {
        Self { kind, inputs }
    }
}

/// Errors raised when compiling a node list into a material.
#[derive(Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A link points at the node itself or a later node, so the list is not
    /// in topological order.
    ForwardLink {
        /// The offending node.
        node: usize,

        /// The referenced node.
        target: usize,
    },

    /// A link names an output socket beyond the fixed socket storage.
    BadSocket {
        /// The offending node.
        node: usize,

        /// The referenced socket.
        output: usize,
    },
}

/// A compiled material: nodes in topological order, evaluated front to
/// back. Cycles cannot exist because links may only point backward.
#[derive(Clone, Debug)]
pub struct MaterialGraph {
    /// The ordered node list.
    nodes: Vec<Node>,
}

impl MaterialGraph {
    /// Validates and compiles a node list. Unsupported node kinds are
    /// flagged once here rather than during shading.
    ///
    /// * `nodes` - Node list; every link must point at an earlier node.
    pub fn build(nodes: Vec<Node>) -> Result<Self, GraphError> {
        for (i, node) in nodes.iter().enumerate() {
            for binding in node.inputs.iter() {
                if let Binding::Link { node: target, output } = binding {
                    if *target >= i {
                        return Err(GraphError::ForwardLink { node: i, target: *target });
                    }
                    if *output >= MAX_OUTPUTS {
                        return Err(GraphError::BadSocket { node: i, output: *output });
                    }
                }
            }
            if node.kind.is_stub() {
                warn!("material uses unsupported node {}", node.kind.name());
            }
        }

        Ok(Self { nodes })
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true for the empty graph.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Evaluates the graph for one shading point. Output nodes write the
    /// resulting shader into the context's material.
    ///
    /// * `ctx`     - Evaluation resources.
    /// * `shading` - The shading context.
    pub fn evaluate(&self, ctx: &EvalContext, shading: &mut ShadingContext) {
        let mut scratch: Vec<Outputs> = vec![Outputs::default(); self.nodes.len()];
        let mut inputs: Vec<Value> = Vec::with_capacity(8);

        for (i, node) in self.nodes.iter().enumerate() {
            inputs.clear();
            for binding in node.inputs.iter() {
                inputs.push(match binding {
                    Binding::Constant(v) => *v,
                    Binding::Link { node, output } => scratch[*node][*output],
                });
            }

            // Split off the already-written prefix so the node can write its
            // own outputs while reading earlier ones.
            let (_, rest) = scratch.split_at_mut(i);
            node.kind.compute(&inputs, ctx, shading, &mut rest[0]);
        }
    }
}
