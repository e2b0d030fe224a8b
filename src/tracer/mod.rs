//! Progressive path tracing driver
//!
//! [`PathTracer`] owns everything that persists between frames: the sphere
//! scene and its GPU copy, the accumulation images and the sample counter.
//! The host calls [`PathTracer::render_frame`] once per displayed frame
//! between `begin_frame` and `end_frame` of its [`RenderDevice`].
//!
//! Each rendered frame records, in order, a kernel dispatch into the working
//! image, an accumulate of the working image into the converged image
//! weighted by the number of samples already in it, and a present of the
//! converged image. Any missing resource skips the whole frame and leaves the
//! sample counter untouched.

mod invalidation;
mod object_buffer;
mod params;
mod surface;

pub use invalidation::*;
pub use object_buffer::*;
pub use params::*;
pub use surface::*;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::backend::traits::*;
use crate::backend::types::KernelDescriptor;
use crate::resources::{upload_texture, TextureData};
use crate::scene::{Camera, DirectionalLight, Scene, SceneGenerator, WatchedTransform};
use crate::TracerConfig;

/// Lifecycle of the tracer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerState {
    /// Disabled, no object buffer
    Idle,
    /// Building the scene and object buffer
    Priming,
    /// Accumulating samples every frame
    Steady,
}

/// Why a frame was not rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The tracer is not enabled
    Disabled,
    /// The destination surface has zero width or height
    EmptySurface,
    /// No kernel has been loaded
    KernelUnavailable,
    /// A GPU resource could not be created or was missing
    ResourceUnavailable,
}

/// Result of [`PathTracer::render_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was traced and presented; `sample` is the number of samples
    /// now averaged in the converged image
    Presented { sample: u32 },
    Skipped(SkipReason),
}

pub struct PathTracer {
    config: TracerConfig,
    state: TracerState,
    sample_count: u32,
    rng: StdRng,
    invalidation: InvalidationTracker,
    surfaces: SurfaceManager,
    objects: ObjectBuffer,
    scene: Scene,
    kernel: Option<KernelHandle>,
    skybox: Option<TextureHandle>,
}

impl PathTracer {
    pub fn new(config: TracerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.scene.seed);
        Self {
            config,
            state: TracerState::Idle,
            sample_count: 0,
            rng,
            invalidation: InvalidationTracker::new(),
            surfaces: SurfaceManager::new(),
            objects: ObjectBuffer::new(),
            scene: Scene::default(),
            kernel: None,
            skybox: None,
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Replace the configuration. Scene parameters take effect at the next
    /// [`enable`](Self::enable) or [`regenerate`](Self::regenerate).
    pub fn set_config(&mut self, config: TracerConfig) {
        self.config = config;
    }

    pub fn state(&self) -> TracerState {
        self.state
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn object_buffer(&self) -> &ObjectBuffer {
        &self.objects
    }

    pub fn surfaces(&self) -> &SurfaceManager {
        &self.surfaces
    }

    pub fn has_kernel(&self) -> bool {
        self.kernel.is_some()
    }

    /// Compile the path tracing kernel, replacing any previous one.
    ///
    /// On failure the previous kernel stays in use.
    pub fn load_kernel<D: RenderDevice + ?Sized>(
        &mut self,
        device: &mut D,
        desc: &KernelDescriptor,
    ) -> BackendResult<()> {
        let kernel = device.create_kernel(desc)?;
        if let Some(previous) = self.kernel.replace(kernel) {
            device.destroy_kernel(previous);
        }
        log::info!("Loaded path tracing kernel {:?}", desc.label);
        Ok(())
    }

    /// Upload a skybox and sample it from the next frame on.
    pub fn set_skybox<D: RenderDevice + ?Sized>(
        &mut self,
        device: &mut D,
        texture: &TextureData,
    ) -> BackendResult<()> {
        let handle = upload_texture(device, texture)?;
        if let Some(previous) = self.skybox.replace(handle) {
            device.destroy_texture(previous);
        }
        self.sample_count = 0;
        Ok(())
    }

    /// Generate the scene, upload it and start accumulating.
    ///
    /// A failed upload is logged and the tracer runs with an empty object
    /// buffer, so the kernel still traces the sky.
    pub fn enable<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        self.state = TracerState::Priming;
        self.sample_count = 0;

        self.rng = StdRng::seed_from_u64(self.config.scene.seed);
        self.scene = SceneGenerator::generate_with(&mut self.rng, &self.config.scene);

        if let Err(err) = self.objects.upload(device, &self.scene.spheres) {
            log::error!("Failed to upload {} spheres: {}", self.scene.len(), err);
        }

        self.state = TracerState::Steady;
        log::info!("Path tracer enabled with {} spheres", self.scene.len());
    }

    /// Rebuild the scene from the current configuration while enabled.
    pub fn regenerate<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        if self.state == TracerState::Idle {
            log::warn!("Ignoring regenerate while disabled");
            return;
        }
        self.enable(device);
    }

    /// Stop rendering and free the object buffer. Images are kept.
    pub fn disable<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        self.objects.release(device);
        self.state = TracerState::Idle;
        log::info!("Path tracer disabled");
    }

    /// Release every GPU resource the tracer owns.
    pub fn shutdown<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        self.disable(device);
        self.surfaces.release(device);
        if let Some(skybox) = self.skybox.take() {
            device.destroy_texture(skybox);
        }
        if let Some(kernel) = self.kernel.take() {
            device.destroy_kernel(kernel);
        }
        self.sample_count = 0;
    }

    /// Trace, accumulate and present one sample.
    pub fn render_frame<D: RenderDevice + ?Sized>(
        &mut self,
        device: &mut D,
        frame: &FrameContext,
        camera: &mut Camera,
        light: &mut DirectionalLight,
    ) -> FrameOutcome {
        if self.state != TracerState::Steady {
            return FrameOutcome::Skipped(SkipReason::Disabled);
        }
        if frame.width == 0 || frame.height == 0 {
            log::warn!("Skipping frame: surface is {}x{}", frame.width, frame.height);
            return FrameOutcome::Skipped(SkipReason::EmptySurface);
        }
        let Some(kernel) = self.kernel else {
            log::warn!("Skipping frame: no kernel loaded");
            return FrameOutcome::Skipped(SkipReason::KernelUnavailable);
        };

        let targets = match self.surfaces.ensure(device, frame.width, frame.height) {
            Ok(targets) => targets,
            Err(err) => {
                log::warn!("Skipping frame: accumulation images unavailable: {}", err);
                return FrameOutcome::Skipped(SkipReason::ResourceUnavailable);
            }
        };

        let field_of_view = camera.field_of_view();
        let mut watched: [&mut dyn WatchedTransform; 2] = [&mut *camera, &mut *light];
        let moved = self.invalidation.should_reset(field_of_view, &mut watched);
        if moved || targets.did_reset {
            self.sample_count = 0;
        }

        let jitter = FrameJitter {
            seed: self.rng.gen(),
            pixel_offset: Vec2::new(self.rng.gen(), self.rng.gen()),
        };
        let aspect = frame.width as f32 / frame.height as f32;
        let dispatch = KernelDispatch {
            kernel,
            uniforms: KernelUniforms::new(
                camera,
                light,
                aspect,
                jitter,
                self.objects.len() as u32,
            ),
            objects: self.objects.handle(),
            skybox: self.skybox,
            output: targets.working,
            groups: dispatch_size(frame.width, frame.height, self.config.tile_size),
        };

        let weight = self.sample_count as f32;
        if let Err(err) = submit_sample(device, &dispatch, &targets, weight, frame) {
            log::warn!("Skipping frame: {}", err);
            return FrameOutcome::Skipped(SkipReason::ResourceUnavailable);
        }

        self.sample_count += 1;
        log::trace!(
            "Presented sample {} at {}x{}",
            self.sample_count,
            frame.width,
            frame.height
        );
        FrameOutcome::Presented {
            sample: self.sample_count,
        }
    }
}

/// Record dispatch, accumulate and present in that order.
fn submit_sample<D: RenderDevice + ?Sized>(
    device: &mut D,
    dispatch: &KernelDispatch,
    targets: &EnsuredTargets,
    sample_weight: f32,
    frame: &FrameContext,
) -> BackendResult<()> {
    device.dispatch_kernel(dispatch)?;
    device.accumulate(targets.working, targets.converged, sample_weight)?;
    device.present(targets.converged, frame)
}
