use glam::Vec2;
use progressive_tracer::backend::{DummyBackend, DummyCommand, KernelDescriptor, RenderDevice};
use progressive_tracer::resources::TextureData;
use progressive_tracer::scene::{Camera, DirectionalLight, SceneConfig, SceneGenerator};
use progressive_tracer::{FrameOutcome, PathTracer, TracerConfig, TracerState};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn kernel() -> KernelDescriptor {
    KernelDescriptor {
        label: Some("Lifecycle Kernel".to_string()),
        shader: String::new(),
        entry_point: "main".to_string(),
    }
}

fn config(seed: u64, max_count: u32) -> TracerConfig {
    TracerConfig {
        scene: SceneConfig {
            seed,
            radius_range: Vec2::new(3.0, 8.0),
            max_count,
            placement_radius: 50.0,
        },
        ..Default::default()
    }
}

fn tick(
    device: &mut DummyBackend,
    tracer: &mut PathTracer,
    view: &mut (Camera, DirectionalLight),
) -> FrameOutcome {
    let frame = device.begin_frame().unwrap();
    let outcome = tracer.render_frame(device, &frame, &mut view.0, &mut view.1);
    device.end_frame().unwrap();
    outcome
}

#[test]
fn test_enable_generates_and_uploads_once() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(42, 10));
    assert_eq!(tracer.state(), TracerState::Idle);

    tracer.enable(&mut device);
    assert_eq!(tracer.state(), TracerState::Steady);
    assert_eq!(tracer.scene(), &SceneGenerator::generate(&config(42, 10).scene));
    assert_eq!(device.live_buffers(), 1);

    tracer.enable(&mut device);
    assert_eq!(device.live_buffers(), 1);
}

#[test]
fn test_disable_releases_object_buffer_only() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(1, 10));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();
    tracer.enable(&mut device);
    tick(&mut device, &mut tracer, &mut view);

    tracer.disable(&mut device);
    assert_eq!(tracer.state(), TracerState::Idle);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_textures(), 2);
    assert!(tracer.object_buffer().handle().is_none());

    // Re-enabling starts a fresh accumulation with the persisted images
    tracer.enable(&mut device);
    assert_eq!(tick(&mut device, &mut tracer, &mut view), FrameOutcome::Presented { sample: 1 });
    assert_eq!(device.live_textures(), 2);
}

#[test]
fn test_shutdown_releases_everything() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(1, 10));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();
    tracer
        .set_skybox(&mut device, &TextureData::solid_color([40, 80, 160, 255], "sky"))
        .unwrap();
    tracer.enable(&mut device);
    tick(&mut device, &mut tracer, &mut view);
    assert_eq!(device.live_textures(), 3);

    tracer.shutdown(&mut device);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.live_kernels(), 0);

    // A second teardown finds nothing to release
    device.clear_commands();
    tracer.shutdown(&mut device);
    assert!(device.commands().is_empty());
}

#[test]
fn test_empty_scene_binds_no_buffer() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(3, 0));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();
    tracer.enable(&mut device);

    assert!(tracer.scene().is_empty());
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(tick(&mut device, &mut tracer, &mut view), FrameOutcome::Presented { sample: 1 });

    let objects = device.commands().iter().find_map(|command| match command {
        DummyCommand::Dispatch { objects, .. } => Some(*objects),
        _ => None,
    });
    assert_eq!(objects, Some(None));
}

#[test]
fn test_failed_upload_still_renders() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(5, 10));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();

    device.fail_buffer_creations(1);
    tracer.enable(&mut device);

    assert_eq!(tracer.state(), TracerState::Steady);
    assert!(tracer.object_buffer().is_empty());
    assert_eq!(tick(&mut device, &mut tracer, &mut view), FrameOutcome::Presented { sample: 1 });
}

#[test]
fn test_regenerate_uses_new_config() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(1, 10));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();
    tracer.enable(&mut device);
    tick(&mut device, &mut tracer, &mut view);
    tick(&mut device, &mut tracer, &mut view);

    tracer.set_config(config(2, 20));
    assert_eq!(tracer.scene(), &SceneGenerator::generate(&config(1, 10).scene));

    tracer.regenerate(&mut device);
    assert_eq!(tracer.scene(), &SceneGenerator::generate(&config(2, 20).scene));
    assert_eq!(tracer.sample_count(), 0);
    assert_eq!(device.live_buffers(), 1);
    assert_eq!(tick(&mut device, &mut tracer, &mut view), FrameOutcome::Presented { sample: 1 });
}

#[test]
fn test_regenerate_ignored_while_idle() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(1, 10));
    tracer.regenerate(&mut device);
    assert_eq!(tracer.state(), TracerState::Idle);
    assert_eq!(device.live_buffers(), 0);
}

#[test]
fn test_skybox_replacement_restarts_accumulation() {
    init_logging();
    let mut device = DummyBackend::new(8, 8);
    let mut tracer = PathTracer::new(config(1, 10));
    let mut view = (Camera::default(), DirectionalLight::default());
    tracer.load_kernel(&mut device, &kernel()).unwrap();
    tracer.enable(&mut device);
    tick(&mut device, &mut tracer, &mut view);
    tick(&mut device, &mut tracer, &mut view);
    assert_eq!(tracer.sample_count(), 2);

    tracer.set_skybox(&mut device, &TextureData::black()).unwrap();
    tracer.set_skybox(&mut device, &TextureData::black()).unwrap();
    assert_eq!(device.live_textures(), 3);
    assert_eq!(tick(&mut device, &mut tracer, &mut view), FrameOutcome::Presented { sample: 1 });
}
