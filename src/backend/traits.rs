//! Core backend abstraction traits
//!
//! These traits define the interface that both the wgpu and the dummy backend implement.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("No frame in progress")]
    NoFrameInProgress,
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a texture view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewHandle(pub(crate) u64);

/// Handle to a compiled compute kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelHandle(pub(crate) u64);

/// Frame context returned when beginning a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    pub surface_view: TextureViewHandle,
    pub width: u32,
    pub height: u32,
}

/// Everything a single kernel dispatch reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct KernelDispatch {
    pub kernel: KernelHandle,
    pub uniforms: KernelUniforms,
    /// Sphere storage buffer, `None` for an empty scene
    pub objects: Option<BufferHandle>,
    /// Skybox texture, `None` binds a black placeholder
    pub skybox: Option<TextureHandle>,
    /// Image the kernel writes one sample per pixel into
    pub output: TextureHandle,
    /// Work group counts in x and y
    pub groups: (u32, u32),
}

/// GPU device used by the path tracer.
///
/// Every command is recorded into the current frame in call order, so a
/// dispatch followed by an accumulate and a present executes in that order
/// on the GPU. Nothing here waits for completion.
pub trait RenderDevice {
    /// Resize the presentation surface
    fn resize(&mut self, width: u32, height: u32);

    /// Get the actual surface size (may be clamped by device limits)
    fn surface_size(&self) -> (u32, u32);

    /// Begin a new frame
    fn begin_frame(&mut self) -> BackendResult<FrameContext>;

    /// Submit recorded work and present the frame
    fn end_frame(&mut self) -> BackendResult<()>;

    // Resource creation

    /// Create a buffer with initial data
    fn create_buffer_init(&mut self, desc: &BufferDescriptor, data: &[u8])
        -> BackendResult<BufferHandle>;

    /// Create a texture
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Write tightly packed pixel data to a texture
    fn write_texture(&mut self, texture: TextureHandle, data: &[u8], width: u32, height: u32);

    /// Compile a path tracing kernel
    fn create_kernel(&mut self, desc: &KernelDescriptor) -> BackendResult<KernelHandle>;

    // Command recording

    /// Record a kernel dispatch
    fn dispatch_kernel(&mut self, dispatch: &KernelDispatch) -> BackendResult<()>;

    /// Record `destination = (destination * sample_weight + source) / (sample_weight + 1)`
    fn accumulate(
        &mut self,
        source: TextureHandle,
        destination: TextureHandle,
        sample_weight: f32,
    ) -> BackendResult<()>;

    /// Record a copy of `source` onto the frame's surface
    fn present(&mut self, source: TextureHandle, frame: &FrameContext) -> BackendResult<()>;

    // Resource cleanup

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Destroy a kernel
    fn destroy_kernel(&mut self, kernel: KernelHandle);
}
