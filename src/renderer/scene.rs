//! Scene tables and per-frame configuration.

use crate::core::geometry::{Matrix3x3, Matrix4x4, Vector2f, Vector3f};
use crate::core::pbrt::*;
use crate::core::reflection::RayFlags;
use crate::core::texture::Image;
use crate::lights::Lights;
use crate::nodes::MaterialRegistry;
use crate::renderer::camera::Camera;

/// How path contributions are estimated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplingMode {
    /// BSDF sampling only; emission is collected when paths hit lights.
    Bsdf,

    /// Next-event estimation only; emission counts only for singular paths.
    Nee,

    /// Both strategies, combined with the power heuristic.
    Mis,
}

/// Display transform applied after accumulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tonemapping {
    Linear,
    Hable,
    Aces,
}

/// Path termination strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RussianRoulette {
    /// Paths run to the maximum depth.
    None,

    /// Paths terminate stochastically based on their throughput.
    Throughput,
}

/// What the output image shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputChannel {
    /// The rendered radiance.
    Image,

    /// First-hit albedo, for denoisers.
    Albedo,

    /// First-hit specular roughness.
    Roughness,
}

/// Global per-frame configuration.
#[derive(Copy, Clone, Debug)]
pub struct Uniforms {
    /// Number of surfaces in the attached lens stack; zero disables it.
    pub num_lens_surfaces: u32,

    /// Index of the frame being accumulated.
    pub frame_index: u32,

    /// Seed mixed into every path's random stream.
    pub random_seed: u32,

    /// Accumulate over frames rather than replacing the film. When
    /// disabled the host clears the film before each frame.
    pub accumulate: bool,

    /// Trace the lens stack spectrally. Consumed by the external lens
    /// simulation; carried here so the configuration round-trips.
    pub lens_spectral: bool,

    /// Scale of the sensor plane.
    pub sensor_scale: Float,

    /// Scale from scene units to camera units.
    pub camera_scale: Float,

    /// Focus distance.
    pub focus: Float,

    /// Exposure multiplier applied before tonemapping.
    pub exposure: Float,

    /// Index into the aperture f-stop table.
    pub stop_index: i32,

    /// Aperture scale relative to the selected stop.
    pub relative_stop: Float,

    /// Number of aperture blades; values below 3 give a circular aperture.
    pub num_aperture_blades: i32,

    /// How path contributions are estimated.
    pub sampling_mode: SamplingMode,

    /// Display transform.
    pub tonemapping: Tonemapping,

    /// Path termination strategy.
    pub rr: RussianRoulette,

    /// First bounce at which Russian roulette may terminate paths.
    pub rr_depth: u16,

    /// What the output image shows.
    pub output_channel: OutputChannel,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            num_lens_surfaces: 0,
            frame_index: 0,
            random_seed: 0,
            accumulate: true,
            lens_spectral: false,
            sensor_scale: 1.0,
            camera_scale: 0.001,
            focus: 0.0,
            exposure: 1.0,
            stop_index: 0,
            relative_stop: 1.0,
            num_aperture_blades: 7,
            sampling_mode: SamplingMode::Mis,
            tonemapping: Tonemapping::Linear,
            rr: RussianRoulette::Throughput,
            rr_depth: 2,
            output_channel: OutputChannel::Image,
        }
    }
}

/// Placement and table offsets of one mesh instance.
#[derive(Copy, Clone, Debug)]
pub struct PerInstanceData {
    /// Offset into the vertex tables.
    pub vertex_offset: u32,

    /// Offset into the face tables.
    pub face_offset: u32,

    /// Number of faces in the instance.
    pub face_count: u32,

    /// Offset into the light-face CDF table for emissive instances.
    pub light_face_offset: u32,

    /// Number of light-face CDF entries.
    pub light_face_count: u32,

    /// Index of the shape light built for this instance, or `NO_LIGHT`.
    pub light_index: u32,

    /// Minimum corner of the object-space bounds.
    pub bounds_min: Vector3f,

    /// Size of the object-space bounds.
    pub bounds_size: Vector3f,

    /// Object-to-world transform for points.
    pub point_transform: Matrix4x4,

    /// Object-to-world transform for normals.
    pub normal_transform: Matrix3x3,

    /// Ray kinds this instance is visible to. Hits from other kinds pass
    /// through as if the instance were absent.
    pub visibility: RayFlags,
}

/// Sentinel for instances that are not shape lights.
pub const NO_LIGHT: u32 = u32::MAX;

impl Default for PerInstanceData {
    fn default() -> Self {
        Self {
            vertex_offset: 0,
            face_offset: 0,
            face_count: 0,
            light_face_offset: 0,
            light_face_count: 0,
            light_index: NO_LIGHT,
            bounds_min: Vector3f::ZERO,
            bounds_size: Vector3f::ZERO,
            point_transform: Matrix4x4::IDENTITY,
            normal_transform: Matrix3x3::IDENTITY,
            visibility: RayFlags::all(),
        }
    }
}

/// Flat mesh tables shared by all instances, indexed through per-instance
/// offsets.
#[derive(Default)]
pub struct SceneGeometry {
    /// Vertex positions.
    pub vertices: Vec<Vector3f>,

    /// Vertex normals.
    pub vertex_normals: Vec<Vector3f>,

    /// Triangle index triplets.
    pub vertex_indices: Vec<u32>,

    /// Vertex texture coordinates.
    pub texcoords: Vec<Vector2f>,

    /// Per-face material index.
    pub materials: Vec<u16>,
}

/// Everything the wavefront driver consumes: mesh tables, instances, the
/// camera, the light pool, compiled materials and the texture table.
pub struct Scene {
    /// Flat mesh tables.
    pub geometry: SceneGeometry,

    /// Instance records.
    pub instances: Vec<PerInstanceData>,

    /// The camera.
    pub camera: Camera,

    /// The light pool.
    pub lights: Lights,

    /// Compiled material programs.
    pub registry: MaterialRegistry,

    /// Texture table addressed by texture nodes.
    pub textures: Vec<Image>,
}
