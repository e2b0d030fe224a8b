use glam::{Quat, Vec3};
use progressive_tracer::backend::shaders::kernel_source;
use progressive_tracer::backend::{DummyBackend, DummyCommand, KernelDescriptor, RenderDevice};
use progressive_tracer::scene::{Camera, DirectionalLight, SceneConfig};
use progressive_tracer::{FrameOutcome, PathTracer, SkipReason, TracerConfig, TracerState};

const TEST_KERNEL: &str = r#"
@compute @workgroup_size(8, 8, 1)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    textureStore(output_image, vec2<i32>(id.xy), vec4<f32>(uniforms.seed));
}
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Harness {
    device: DummyBackend,
    tracer: PathTracer,
    camera: Camera,
    light: DirectionalLight,
}

impl Harness {
    fn new(width: u32, height: u32, config: TracerConfig) -> Self {
        init_logging();
        let mut device = DummyBackend::new(width, height);
        let mut tracer = PathTracer::new(config);
        tracer
            .load_kernel(
                &mut device,
                &KernelDescriptor {
                    label: Some("Test Kernel".to_string()),
                    shader: kernel_source(TEST_KERNEL),
                    entry_point: "main".to_string(),
                },
            )
            .unwrap();
        tracer.enable(&mut device);

        Self {
            device,
            tracer,
            camera: Camera::new(Vec3::new(0.0, 20.0, -60.0), Vec3::ZERO),
            light: DirectionalLight::new(Quat::from_rotation_x(-0.8), 1.2),
        }
    }

    fn small() -> Self {
        Self::new(
            16,
            8,
            TracerConfig {
                scene: SceneConfig {
                    seed: 42,
                    max_count: 10,
                    placement_radius: 50.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        )
    }

    fn tick(&mut self) -> FrameOutcome {
        let frame = self.device.begin_frame().unwrap();
        let outcome =
            self.tracer
                .render_frame(&mut self.device, &frame, &mut self.camera, &mut self.light);
        self.device.end_frame().unwrap();
        outcome
    }

    fn accumulate_weights(&self) -> Vec<f32> {
        self.device
            .commands()
            .iter()
            .filter_map(|command| match command {
                DummyCommand::Accumulate { sample_weight, .. } => Some(*sample_weight),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn test_samples_count_up() {
    let mut h = Harness::small();
    assert_eq!(h.tracer.state(), TracerState::Steady);

    for expected in 1..=4 {
        assert_eq!(h.tick(), FrameOutcome::Presented { sample: expected });
    }
    assert_eq!(h.tracer.sample_count(), 4);
    assert_eq!(h.accumulate_weights(), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_frame_submission_order() {
    let mut h = Harness::small();
    h.tick();
    h.device.clear_commands();
    h.tick();

    let kinds: Vec<&str> = h
        .device
        .commands()
        .iter()
        .map(|command| match command {
            DummyCommand::BeginFrame { .. } => "begin",
            DummyCommand::Dispatch { .. } => "dispatch",
            DummyCommand::Accumulate { .. } => "accumulate",
            DummyCommand::Present { .. } => "present",
            DummyCommand::EndFrame => "end",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["begin", "dispatch", "accumulate", "present", "end"]);
}

#[test]
fn test_transform_change_resets_to_one() {
    let mut h = Harness::small();
    for _ in 0..5 {
        h.tick();
    }
    assert_eq!(h.tracer.sample_count(), 5);

    h.camera.set_position(Vec3::new(1.0, 20.0, -60.0));
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });

    h.light.set_rotation(Quat::from_rotation_x(-0.5));
    h.tick();
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 2 });
}

#[test]
fn test_field_of_view_change_resets() {
    let mut h = Harness::small();
    h.tick();
    h.tick();

    h.camera.set_field_of_view(h.camera.field_of_view() + 0.001);
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 2 });
}

#[test]
fn test_constant_samples_converge_exactly() {
    let mut h = Harness::small();
    h.device.set_kernel_fn(|_, _, _| [0.5, 0.5, 0.5, 0.5]);

    for _ in 0..3 {
        h.tick();
    }

    let presented = h.device.presented_pixels().unwrap();
    assert_eq!(presented.len(), 16 * 8);
    for pixel in presented {
        assert_eq!(*pixel, [0.5, 0.5, 0.5, 1.0]);
    }
}

#[test]
fn test_alternating_samples_average() {
    let mut h = Harness::small();
    let mut bright = true;
    h.device.set_kernel_fn(move |_, _, _| {
        let value = if bright { 1.0 } else { 0.0 };
        bright = !bright;
        [value; 4]
    });
    // One pixel so the closure alternates per frame
    h.device.resize(1, 1);

    for _ in 0..4 {
        h.tick();
    }
    assert_eq!(h.device.presented_pixels().unwrap()[0], [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn test_resize_reallocates_and_resets() {
    let mut h = Harness::small();
    h.tick();
    h.tick();
    assert_eq!(h.tracer.surfaces().size(), Some((16, 8)));

    h.device.resize(32, 8);
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });
    assert_eq!(h.tracer.surfaces().size(), Some((32, 8)));
    assert_eq!(h.device.live_textures(), 2);

    let dispatch_groups: Vec<(u32, u32)> = h
        .device
        .commands()
        .iter()
        .filter_map(|command| match command {
            DummyCommand::Dispatch { groups, .. } => Some(*groups),
            _ => None,
        })
        .collect();
    assert_eq!(dispatch_groups, vec![(2, 1), (2, 1), (4, 1)]);
}

#[test]
fn test_empty_surface_skips_without_consuming_changes() {
    let mut h = Harness::small();
    h.tick();
    h.tick();

    h.camera.set_position(Vec3::new(5.0, 20.0, -60.0));
    h.device.resize(0, 8);
    assert_eq!(h.tick(), FrameOutcome::Skipped(SkipReason::EmptySurface));
    assert_eq!(h.tracer.sample_count(), 2);

    h.device.resize(16, 8);
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });
}

#[test]
fn test_missing_kernel_skips() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(TracerConfig::default());
    let mut camera = Camera::default();
    let mut light = DirectionalLight::default();

    let frame = device.begin_frame().unwrap();
    assert_eq!(
        tracer.render_frame(&mut device, &frame, &mut camera, &mut light),
        FrameOutcome::Skipped(SkipReason::Disabled)
    );

    tracer.enable(&mut device);
    assert_eq!(
        tracer.render_frame(&mut device, &frame, &mut camera, &mut light),
        FrameOutcome::Skipped(SkipReason::KernelUnavailable)
    );
    device.end_frame().unwrap();

    assert_eq!(tracer.sample_count(), 0);
    assert_eq!(device.live_textures(), 0);
    assert!(device.presented_pixels().is_none());
}

#[test]
fn test_failed_kernel_load_keeps_previous() {
    let mut h = Harness::small();
    h.device.set_fail_kernel_creation(true);
    let result = h.tracer.load_kernel(
        &mut h.device,
        &KernelDescriptor {
            label: None,
            shader: String::new(),
            entry_point: "main".to_string(),
        },
    );
    assert!(result.is_err());
    assert!(h.tracer.has_kernel());
    assert_eq!(h.device.live_kernels(), 1);
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });
}

#[test]
fn test_image_allocation_failure_skips() {
    let mut h = Harness::small();
    h.device.fail_texture_creations(1);
    assert_eq!(h.tick(), FrameOutcome::Skipped(SkipReason::ResourceUnavailable));
    assert_eq!(h.tracer.sample_count(), 0);
    assert_eq!(h.tick(), FrameOutcome::Presented { sample: 1 });
}

#[test]
fn test_jitter_differs_per_frame_and_is_reproducible() {
    fn seeds(h: &mut Harness) -> Vec<(f32, f32, f32)> {
        for _ in 0..3 {
            h.tick();
        }
        h.device
            .commands()
            .iter()
            .filter_map(|command| match command {
                DummyCommand::Dispatch { uniforms, .. } => Some((
                    uniforms.seed,
                    uniforms.pixel_offset.x,
                    uniforms.pixel_offset.y,
                )),
                _ => None,
            })
            .collect()
    }

    let first = seeds(&mut Harness::small());
    let second = seeds(&mut Harness::small());

    assert_eq!(first, second);
    assert_ne!(first[0], first[1]);
    for (seed, x, y) in first {
        assert!((0.0..1.0).contains(&seed));
        assert!((0.0..1.0).contains(&x));
        assert!((0.0..1.0).contains(&y));
    }
}

#[test]
fn test_kernel_sees_scene_and_light() {
    let mut h = Harness::small();
    h.tick();

    let (objects, uniforms) = h
        .device
        .commands()
        .iter()
        .find_map(|command| match command {
            DummyCommand::Dispatch {
                objects, uniforms, ..
            } => Some((*objects, *uniforms)),
            _ => None,
        })
        .unwrap();

    assert_eq!(objects, h.tracer.object_buffer().handle());
    assert_eq!(uniforms.sphere_count as usize, h.tracer.scene().len());
    assert_eq!(uniforms.directional_light, h.light.to_gpu_data());
    assert_eq!(uniforms.camera_to_world, h.camera.camera_to_world());
    assert_eq!(uniforms.inverse_projection, h.camera.inverse_projection(2.0));
}
