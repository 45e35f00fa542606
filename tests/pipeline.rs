//! End-to-end wavefront pipeline tests on small scenes rendered with the
//! brute-force intersector.

use raywave::core::geometry::{Matrix4x4, Vector2f, Vector3f, Vector4f};
use raywave::core::pbrt::*;
use raywave::lights::{build_light_distribution, Lights, ShapeLight, WorldLight};
use raywave::nodes::*;
use raywave::renderer::*;

/// Incrementally assembled test scene.
struct SceneBuilder {
    geometry: SceneGeometry,
    instances: Vec<PerInstanceData>,
    registry: MaterialRegistry,
    world_strength: Float,
}

impl SceneBuilder {
    fn new(world_strength: Float) -> Self {
        Self {
            geometry: SceneGeometry::default(),
            instances: Vec::new(),
            registry: MaterialRegistry::new(),
            world_strength,
        }
    }

    /// Adds a mesh as one instance with a single material for every face.
    fn add_mesh(
        &mut self,
        vertices: Vec<Vector3f>,
        normals: Vec<Vector3f>,
        indices: Vec<u32>,
        material: usize,
    ) -> usize {
        let face_count = indices.len() / 3;
        let instance = PerInstanceData {
            vertex_offset: self.geometry.vertices.len() as u32,
            face_offset: self.geometry.materials.len() as u32,
            face_count: face_count as u32,
            ..Default::default()
        };

        let mut bounds_min = Vector3f::splat(INFINITY);
        let mut bounds_max = Vector3f::splat(-INFINITY);
        for v in vertices.iter() {
            bounds_min = bounds_min.min(v);
            bounds_max = bounds_max.max(v);
        }

        self.geometry
            .texcoords
            .extend(vertices.iter().map(|_| Vector2f::ZERO));
        self.geometry.vertices.extend(vertices);
        self.geometry.vertex_normals.extend(normals);
        self.geometry.vertex_indices.extend(indices);
        self.geometry
            .materials
            .extend(std::iter::repeat(material as u16).take(face_count));

        let mut instance = instance;
        instance.bounds_min = bounds_min;
        instance.bounds_size = bounds_max - bounds_min;
        self.instances.push(instance);
        self.instances.len() - 1
    }

    /// Finishes the scene, promoting instances with emissive materials to
    /// shape lights. `material_has_emission` is indexed by material id.
    fn build(mut self, camera: Camera, material_has_emission: Vec<bool>) -> Scene {
        let world_shader = self.registry.add_light(
            MaterialGraph::build(vec![
                Node::new(
                    NodeKind::Background(Background),
                    vec![
                        Binding::color(Vector4f::ONE),
                        Binding::float(self.world_strength),
                    ],
                ),
                Node::new(NodeKind::OutputWorld(OutputWorld), vec![Binding::link(0, 0)]),
            ])
            .unwrap(),
        );

        let world = WorldLight::build(world_shader, 8, 4, &self.registry, &EvalContext::empty());
        let mut lights = Lights::with_world(world);

        for (instance_index, instance) in self.instances.iter_mut().enumerate() {
            let has_emission = self
                .geometry
                .materials
                [instance.face_offset as usize
                    ..(instance.face_offset + instance.face_count) as usize]
                .iter()
                .any(|m| material_has_emission.get(*m as usize).copied().unwrap_or(false));
            if !has_emission {
                continue;
            }

            let face_count = instance.face_count as usize;
            let offset = lights.light_faces.len();
            lights.light_faces.resize(offset + face_count, 0.0);

            let begin = 3 * instance.face_offset as usize;
            let end = begin + 3 * face_count;
            let vertices = &self.geometry.vertices[instance.vertex_offset as usize..];
            let area = build_light_distribution(
                &instance.normal_transform,
                &self.geometry.vertex_indices[begin..end],
                vertices,
                &self.geometry.materials[instance.face_offset as usize..],
                &material_has_emission,
                &mut lights.light_faces[offset..offset + face_count],
            );

            instance.light_face_offset = offset as u32;
            instance.light_face_count = face_count as u32;
            instance.light_index = lights.shape_lights.len() as u32;
            lights.shape_lights.push(ShapeLight {
                instance_index: instance_index as u32,
                emissive_area: area,
            });
        }

        Scene {
            geometry: self.geometry,
            instances: self.instances,
            camera,
            lights,
            registry: self.registry,
            textures: Vec::new(),
        }
    }
}

/// A lat-long unit sphere mesh.
fn sphere_mesh(stacks: usize, slices: usize) -> (Vec<Vector3f>, Vec<Vector3f>, Vec<u32>) {
    let mut vertices = Vec::new();
    for i in 0..=stacks {
        let theta = PI * i as Float / stacks as Float;
        for j in 0..=slices {
            let phi = TWO_PI * j as Float / slices as Float;
            vertices.push(Vector3f::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ));
        }
    }

    let mut indices = Vec::new();
    for i in 0..stacks {
        for j in 0..slices {
            let a = (i * (slices + 1) + j) as u32;
            let b = a + 1;
            let c = a + (slices + 1) as u32;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, c]);
            indices.extend_from_slice(&[b, d, c]);
        }
    }

    let normals = vertices.clone();
    (vertices, normals, indices)
}

/// An axis-aligned quad in the z-plane.
fn quad_mesh(half: Float, z: Float, flip: bool) -> (Vec<Vector3f>, Vec<Vector3f>, Vec<u32>) {
    let vertices = vec![
        Vector3f::new(-half, -half, z),
        Vector3f::new(half, -half, z),
        Vector3f::new(half, half, z),
        Vector3f::new(-half, half, z),
    ];
    let n = if flip {
        Vector3f::new(0.0, 0.0, -1.0)
    } else {
        Vector3f::new(0.0, 0.0, 1.0)
    };
    let indices = if flip {
        vec![0, 2, 1, 0, 3, 2]
    } else {
        vec![0, 1, 2, 0, 2, 3]
    };
    (vertices, vec![n; 4], indices)
}

fn principled_metal() -> MaterialGraph {
    let mut inputs = vec![Binding::float(0.0); 21];
    inputs[0] = Binding::color(Vector4f::ONE); // base color
    inputs[1] = Binding::float(1.0); // metallic
    inputs[2] = Binding::float(0.5); // specular
    inputs[4] = Binding::float(0.4); // roughness
    inputs[11] = Binding::float(1.45); // ior
    inputs[16] = Binding::float(1.0); // alpha
    inputs[17] = Binding::vector(Vector3f::ZERO); // normal (surface default)

    MaterialGraph::build(vec![
        Node::new(NodeKind::BsdfPrincipled(BsdfPrincipled), inputs),
        Node::new(
            NodeKind::OutputMaterial(OutputMaterial),
            vec![
                Binding::link(0, 0),
                Binding::float(0.0),
                Binding::float(0.0),
            ],
        ),
    ])
    .unwrap()
}

fn lambertian(albedo: Float) -> MaterialGraph {
    MaterialGraph::build(vec![
        Node::new(
            NodeKind::BsdfDiffuse(BsdfDiffuse),
            vec![
                Binding::color(Vector4f::new(albedo, albedo, albedo, 1.0)),
                Binding::float(0.0),
                Binding::vector(Vector3f::ZERO),
            ],
        ),
        Node::new(
            NodeKind::OutputMaterial(OutputMaterial),
            vec![
                Binding::link(0, 0),
                Binding::float(0.0),
                Binding::float(0.0),
            ],
        ),
    ])
    .unwrap()
}

fn emitter(strength: Float) -> MaterialGraph {
    MaterialGraph::build(vec![
        Node::new(
            NodeKind::Emission(Emission),
            vec![Binding::color(Vector4f::ONE), Binding::float(strength)],
        ),
        Node::new(
            NodeKind::OutputMaterial(OutputMaterial),
            vec![
                Binding::link(0, 0),
                Binding::float(0.0),
                Binding::float(0.0),
            ],
        ),
    ])
    .unwrap()
}

fn transparent(tint: Vector3f) -> MaterialGraph {
    MaterialGraph::build(vec![
        Node::new(
            NodeKind::BsdfTransparent(BsdfTransparent),
            vec![Binding::color(Vector4f::from_rgb(tint))],
        ),
        Node::new(
            NodeKind::OutputMaterial(OutputMaterial),
            vec![
                Binding::link(0, 0),
                Binding::float(0.0),
                Binding::float(0.0),
            ],
        ),
    ])
    .unwrap()
}

fn camera_at(z: Float) -> Camera {
    Camera {
        transform: Matrix4x4::translate(&Vector3f::new(0.0, 0.0, z)),
        focal_length: 55.0,
        ..Default::default()
    }
}

fn render(
    scene: &Scene,
    uniforms: &Uniforms,
    film: &mut Film,
    frames: u32,
    max_depth: usize,
) {
    let accel = BruteForce::new(&scene.geometry, &scene.instances);
    let driver = WavefrontDriver::new(max_depth);
    let mut uniforms = *uniforms;
    for frame in 0..frames {
        uniforms.frame_index = frame;
        uniforms.random_seed = frame;
        driver.render_frame(scene, &uniforms, &accel, film);
    }
}

/// Averages the mean radiance over every film pixel.
fn film_average(film: &Film) -> Vector3f {
    let mut total = Vector3f::ZERO;
    for y in 0..film.height() {
        for x in 0..film.width() {
            total += film.mean_radiance(x as u16, y as u16);
        }
    }
    total / (film.width() * film.height()) as Float
}

#[test]
fn furnace_metal_sphere_disappears() {
    // A closed environment of constant radiance: an energy-conserving
    // material must blend into the background in every sampling mode.
    let mut builder = SceneBuilder::new(0.5);
    let metal = builder.registry.add_surface(principled_metal());
    let (vertices, normals, indices) = sphere_mesh(12, 24);
    builder.add_mesh(vertices, normals, indices, metal);
    let scene = builder.build(camera_at(3.0), vec![false]);

    for mode in [SamplingMode::Bsdf, SamplingMode::Nee, SamplingMode::Mis] {
        let uniforms = Uniforms {
            sampling_mode: mode,
            rr_depth: 3,
            ..Default::default()
        };
        let mut film = Film::new(6, 6);
        render(&scene, &uniforms, &mut film, 400, 8);

        // The center pixels see the sphere head-on.
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            let mean = film.mean_radiance(x, y);
            assert!(
                (mean.x - 0.5).abs() < 0.03,
                "{mode:?} pixel ({x},{y}): {mean:?}"
            );
        }
    }
}

#[test]
fn sampling_modes_agree_on_direct_lighting() {
    // Lambertian floor under a hittable quad emitter: BSDF-only, NEE-only
    // and MIS estimates of the same scene must converge to the same image.
    let build_scene = || {
        let mut builder = SceneBuilder::new(0.0);
        let floor = builder.registry.add_surface(lambertian(0.8));
        let light = builder.registry.add_surface(emitter(10.0));

        let (v, n, i) = quad_mesh(2.0, 0.0, false);
        builder.add_mesh(v, n, i, floor);
        let (v, n, i) = quad_mesh(0.1, 1.0, true);
        builder.add_mesh(v, n, i, light);

        builder.build(camera_at(2.2), vec![false, true])
    };
    let scene = build_scene();
    assert_eq!(scene.lights.total(), 2);

    let mut means = Vec::new();
    for mode in [SamplingMode::Bsdf, SamplingMode::Nee, SamplingMode::Mis] {
        let uniforms = Uniforms {
            sampling_mode: mode,
            rr_depth: 2,
            ..Default::default()
        };
        let mut film = Film::new(4, 4);
        render(&scene, &uniforms, &mut film, 2000, 4);
        means.push(film_average(&film).mean());
    }

    let reference = means[2];
    assert!(reference > 0.0);
    for (mode, mean) in means.iter().enumerate() {
        let rel = (mean - reference).abs() / reference;
        assert!(rel < 0.3, "mode {mode}: mean {mean} vs {reference}");
    }
}

#[test]
fn next_event_estimation_finds_small_lights() {
    // A tiny bright emitter that BSDF sampling essentially never hits at
    // low sample counts, while light sampling resolves it immediately.
    let build_scene = || {
        let mut builder = SceneBuilder::new(0.0);
        let floor = builder.registry.add_surface(lambertian(0.8));
        let light = builder.registry.add_surface(emitter(4000.0));

        let (v, n, i) = quad_mesh(2.0, 0.0, false);
        builder.add_mesh(v, n, i, floor);
        // The emitter sits outside the camera frustum so only indirect
        // sampling can find it.
        let (v, n, i) = quad_mesh(0.005, 0.0, true);
        let index = builder.add_mesh(v, n, i, light);
        builder.instances[index].point_transform =
            Matrix4x4::translate(&Vector3f::new(1.2, 0.0, 1.0));

        builder.build(camera_at(2.2), vec![false, true])
    };
    let scene = build_scene();

    let mut means = Vec::new();
    for mode in [SamplingMode::Bsdf, SamplingMode::Mis] {
        let uniforms = Uniforms {
            sampling_mode: mode,
            rr_depth: 2,
            ..Default::default()
        };
        let mut film = Film::new(4, 4);
        render(&scene, &uniforms, &mut film, 16, 4);
        means.push(film_average(&film).mean());
    }

    let bsdf_only = means[0];
    let mis = means[1];
    assert!(mis > 0.0, "MIS should resolve the light, got {mis}");
    assert!(
        mis > 10.0 * bsdf_only,
        "MIS {mis} should dwarf BSDF-only {bsdf_only} at low sample counts"
    );
}

#[test]
fn cutout_transparency_tints_the_background() {
    // A transparent quad between camera and environment: rays null-scatter
    // through it and pick up the tint exactly.
    let tint = Vector3f::new(0.5, 0.25, 1.0);
    let mut builder = SceneBuilder::new(1.0);
    let cutout = builder.registry.add_surface(transparent(tint));
    let (v, n, i) = quad_mesh(50.0, 0.0, false);
    builder.add_mesh(v, n, i, cutout);
    let scene = builder.build(camera_at(1.0), vec![false]);

    let uniforms = Uniforms::default();
    let mut film = Film::new(4, 4);
    render(&scene, &uniforms, &mut film, 8, 4);

    for y in 0..4 {
        for x in 0..4 {
            let mean = film.mean_radiance(x, y);
            assert!(
                (mean - tint).length() < 1e-3,
                "pixel ({x},{y}): {mean:?} vs {tint:?}"
            );
        }
    }
}

#[test]
fn visibility_mask_hides_instances_from_camera_rays() {
    let mut builder = SceneBuilder::new(0.75);
    let floor = builder.registry.add_surface(lambertian(0.1));
    let (v, n, i) = quad_mesh(50.0, 0.0, false);
    let index = builder.add_mesh(v, n, i, floor);
    builder.instances[index].visibility = RayFlags::all() & !RayFlags::CAMERA;
    let scene = builder.build(camera_at(1.0), vec![false]);

    let uniforms = Uniforms {
        sampling_mode: SamplingMode::Bsdf,
        ..Default::default()
    };
    let mut film = Film::new(2, 2);
    render(&scene, &uniforms, &mut film, 4, 4);

    // Camera rays pass straight through to the environment.
    for y in 0..2 {
        for x in 0..2 {
            let mean = film.mean_radiance(x, y);
            assert!((mean.x - 0.75).abs() < 1e-3, "pixel ({x},{y}): {mean:?}");
        }
    }
}

#[test]
fn smooth_glass_produces_refracted_camera_paths() {
    use raywave::core::reflection::{RayFlags as Flags, Transmission, UberBsdf};
    use raywave::core::rng::Prng;

    // A grazing hit on smooth glass: the transmission branch must bend the
    // ray into the surface with a direction distinct from mirror
    // reflection.
    let bsdf = UberBsdf {
        lobe_probabilities: [0.0, 0.0, 1.0, 0.0],
        transmission: Transmission {
            reflection_alpha: 1e-8,
            transmission_alpha: 1e-8,
            base_color: Vector3f::ONE,
            cspec0: Vector3f::ONE,
            ior: 1.5,
            weight: 1.0,
            only_refract: false,
        },
        ..Default::default()
    };

    let n = Vector3f::new(0.0, 0.0, 1.0);
    // About 70 degrees off the normal, as on a sphere rim.
    let wo = Vector3f::new(0.94, 0.0, 0.342).normalize();

    let mut prng = Prng::new(123, 0);
    let mut seen_transmission = false;
    for _ in 0..256 {
        let sample = bsdf.sample(&prng.sample_3d(), &wo, &n, &n, Flags::CAMERA);
        if !sample.is_valid() {
            continue;
        }
        if sample.flags.contains(Flags::TRANSMISSION) {
            seen_transmission = true;
            assert!(sample.wi.z < 0.0);
            assert!(sample.wi.dot(&n).abs() < 1.0);
            assert!(sample.pdf > 1.0, "near-delta pdf should be huge");
        }
    }
    assert!(seen_transmission);
}
