//! Dummy GPU backend for testing and development.
//!
//! This backend keeps every image in CPU memory and runs the accumulate and
//! present steps on the CPU, so the progressive loop can be exercised
//! without GPU hardware. Kernel dispatches are simulated with a per-pixel
//! closure installed via [`DummyBackend::set_kernel_fn`].

use std::collections::{HashMap, HashSet};

use crate::backend::traits::*;
use crate::backend::types::*;

/// One RGBA float pixel
pub type Pixel = [f32; 4];

/// Per-pixel stand-in for a compute kernel: `(uniforms, x, y) -> color`
pub type KernelFn = Box<dyn FnMut(&KernelUniforms, u32, u32) -> Pixel>;

/// Command recorded by the dummy backend, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum DummyCommand {
    BeginFrame {
        width: u32,
        height: u32,
    },
    CreateBuffer {
        buffer: BufferHandle,
        size: u64,
    },
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
    },
    DestroyBuffer(BufferHandle),
    DestroyTexture(TextureHandle),
    Dispatch {
        kernel: KernelHandle,
        output: TextureHandle,
        objects: Option<BufferHandle>,
        groups: (u32, u32),
        uniforms: KernelUniforms,
    },
    Accumulate {
        source: TextureHandle,
        destination: TextureHandle,
        sample_weight: f32,
    },
    Present {
        source: TextureHandle,
    },
    EndFrame,
}

struct DummyTexture {
    desc: TextureDescriptor,
    pixels: Vec<Pixel>,
}

/// CPU-side backend.
pub struct DummyBackend {
    next_id: u64,
    width: u32,
    height: u32,
    frame_in_progress: bool,
    buffers: HashMap<u64, Vec<u8>>,
    textures: HashMap<u64, DummyTexture>,
    kernels: HashSet<u64>,
    kernel_fn: KernelFn,
    presented: Option<Vec<Pixel>>,
    commands: Vec<DummyCommand>,
    texture_creations_before_failure: usize,
    failing_texture_creations: usize,
    failing_buffer_creations: usize,
    fail_kernel_creation: bool,
}

impl DummyBackend {
    /// Create a dummy backend with the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            next_id: 1,
            width,
            height,
            frame_in_progress: false,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            kernels: HashSet::new(),
            kernel_fn: Box::new(|_, _, _| [0.0; 4]),
            presented: None,
            commands: Vec::new(),
            texture_creations_before_failure: 0,
            failing_texture_creations: 0,
            failing_buffer_creations: 0,
            fail_kernel_creation: false,
        }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    /// Replace the function evaluated for every pixel of a dispatch.
    pub fn set_kernel_fn<F>(&mut self, kernel_fn: F)
    where
        F: FnMut(&KernelUniforms, u32, u32) -> Pixel + 'static,
    {
        self.kernel_fn = Box::new(kernel_fn);
    }

    /// Make the next `count` texture creations fail.
    pub fn fail_texture_creations(&mut self, count: usize) {
        self.fail_texture_creations_after(0, count);
    }

    /// Let `successes` texture creations through, then fail the next `count`.
    pub fn fail_texture_creations_after(&mut self, successes: usize, count: usize) {
        self.texture_creations_before_failure = successes;
        self.failing_texture_creations = count;
    }

    /// Make the next `count` buffer creations fail.
    pub fn fail_buffer_creations(&mut self, count: usize) {
        self.failing_buffer_creations = count;
    }

    /// Make kernel compilation fail until reset.
    pub fn set_fail_kernel_creation(&mut self, fail: bool) {
        self.fail_kernel_creation = fail;
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> &[DummyCommand] {
        &self.commands
    }

    /// Forget recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of buffers currently alive.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of textures currently alive.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of kernels currently alive.
    pub fn live_kernels(&self) -> usize {
        self.kernels.len()
    }

    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(Vec::as_slice)
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures
            .get(&texture.0)
            .map(|t| (t.desc.width, t.desc.height))
    }

    pub fn texture_pixels(&self, texture: TextureHandle) -> Option<&[Pixel]> {
        self.textures.get(&texture.0).map(|t| t.pixels.as_slice())
    }

    /// Pixels of the most recent present, sized to the surface.
    pub fn presented_pixels(&self) -> Option<&[Pixel]> {
        self.presented.as_deref()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn require_frame(&self) -> BackendResult<()> {
        if self.frame_in_progress {
            Ok(())
        } else {
            Err(BackendError::NoFrameInProgress)
        }
    }

    fn texture(&self, texture: TextureHandle) -> BackendResult<&DummyTexture> {
        self.textures
            .get(&texture.0)
            .ok_or_else(|| BackendError::ResourceNotFound(format!("{:?}", texture)))
    }
}

impl RenderDevice for DummyBackend {
    fn resize(&mut self, width: u32, height: u32) {
        log::trace!("DummyBackend: resize to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) -> BackendResult<FrameContext> {
        self.frame_in_progress = true;
        self.commands.push(DummyCommand::BeginFrame {
            width: self.width,
            height: self.height,
        });
        Ok(FrameContext {
            surface_view: TextureViewHandle(0),
            width: self.width,
            height: self.height,
        })
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.require_frame()?;
        self.frame_in_progress = false;
        self.commands.push(DummyCommand::EndFrame);
        Ok(())
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        if self.failing_buffer_creations > 0 {
            self.failing_buffer_creations -= 1;
            return Err(BackendError::OutOfMemory);
        }
        if desc.size == 0 {
            return Err(BackendError::BufferCreationFailed(
                "buffer size must be non-zero".to_string(),
            ));
        }

        let mut contents = data.to_vec();
        contents.resize(desc.size as usize, 0);

        let buffer = BufferHandle(self.allocate_id());
        self.buffers.insert(buffer.0, contents);
        self.commands.push(DummyCommand::CreateBuffer {
            buffer,
            size: desc.size,
        });
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        if self.failing_texture_creations > 0 {
            if self.texture_creations_before_failure > 0 {
                self.texture_creations_before_failure -= 1;
            } else {
                self.failing_texture_creations -= 1;
                return Err(BackendError::OutOfMemory);
            }
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "zero extent {}x{}",
                desc.width, desc.height
            )));
        }

        let texture = TextureHandle(self.allocate_id());
        let pixels = vec![[0.0; 4]; (desc.width * desc.height) as usize];
        self.textures.insert(
            texture.0,
            DummyTexture {
                desc: desc.clone(),
                pixels,
            },
        );
        self.commands.push(DummyCommand::CreateTexture {
            texture,
            width: desc.width,
            height: desc.height,
        });
        Ok(texture)
    }

    fn write_texture(&mut self, texture: TextureHandle, data: &[u8], width: u32, height: u32) {
        let Some(target) = self.textures.get_mut(&texture.0) else {
            log::warn!("DummyBackend: write to unknown texture {:?}", texture);
            return;
        };

        let width = width.min(target.desc.width);
        let height = height.min(target.desc.height);
        let bpp = target.desc.format.bytes_per_pixel() as usize;
        let float = target.desc.format.is_float();

        for y in 0..height {
            for x in 0..width {
                let offset = (y * width + x) as usize * bpp;
                let Some(bytes) = data.get(offset..offset + bpp) else {
                    return;
                };
                let pixel = if float {
                    bytemuck::pod_read_unaligned::<Pixel>(bytes)
                } else {
                    [
                        bytes[0] as f32 / 255.0,
                        bytes[1] as f32 / 255.0,
                        bytes[2] as f32 / 255.0,
                        bytes[3] as f32 / 255.0,
                    ]
                };
                target.pixels[(y * target.desc.width + x) as usize] = pixel;
            }
        }
    }

    fn create_kernel(&mut self, desc: &KernelDescriptor) -> BackendResult<KernelHandle> {
        log::trace!(
            "DummyBackend: creating kernel {:?} (entry: {})",
            desc.label,
            desc.entry_point
        );
        if self.fail_kernel_creation {
            return Err(BackendError::PipelineCreationFailed(
                "kernel creation disabled".to_string(),
            ));
        }
        let kernel = KernelHandle(self.allocate_id());
        self.kernels.insert(kernel.0);
        Ok(kernel)
    }

    fn dispatch_kernel(&mut self, dispatch: &KernelDispatch) -> BackendResult<()> {
        self.require_frame()?;
        if !self.kernels.contains(&dispatch.kernel.0) {
            return Err(BackendError::ResourceNotFound(format!(
                "{:?}",
                dispatch.kernel
            )));
        }

        let kernel_fn = &mut self.kernel_fn;
        let output = self
            .textures
            .get_mut(&dispatch.output.0)
            .ok_or_else(|| BackendError::ResourceNotFound(format!("{:?}", dispatch.output)))?;

        let width = output.desc.width;
        for (index, pixel) in output.pixels.iter_mut().enumerate() {
            let x = index as u32 % width;
            let y = index as u32 / width;
            *pixel = kernel_fn(&dispatch.uniforms, x, y);
        }

        self.commands.push(DummyCommand::Dispatch {
            kernel: dispatch.kernel,
            output: dispatch.output,
            objects: dispatch.objects,
            groups: dispatch.groups,
            uniforms: dispatch.uniforms,
        });
        Ok(())
    }

    fn accumulate(
        &mut self,
        source: TextureHandle,
        destination: TextureHandle,
        sample_weight: f32,
    ) -> BackendResult<()> {
        self.require_frame()?;
        let current = self.texture(source)?.pixels.clone();
        let target = self
            .textures
            .get_mut(&destination.0)
            .ok_or_else(|| BackendError::ResourceNotFound(format!("{:?}", destination)))?;

        let n = sample_weight;
        for (previous, current) in target.pixels.iter_mut().zip(current.iter()) {
            if n > 0.0 {
                for c in 0..4 {
                    previous[c] = (previous[c] * n + current[c]) / (n + 1.0);
                }
            } else {
                *previous = *current;
            }
        }

        self.commands.push(DummyCommand::Accumulate {
            source,
            destination,
            sample_weight,
        });
        Ok(())
    }

    fn present(&mut self, source: TextureHandle, frame: &FrameContext) -> BackendResult<()> {
        self.require_frame()?;
        let image = self.texture(source)?;
        let (src_width, src_height) = (image.desc.width, image.desc.height);

        let mut presented = Vec::with_capacity((frame.width * frame.height) as usize);
        for y in 0..frame.height {
            for x in 0..frame.width {
                let sx = x.min(src_width - 1);
                let sy = y.min(src_height - 1);
                let [r, g, b, _] = image.pixels[(sy * src_width + sx) as usize];
                presented.push([r, g, b, 1.0]);
            }
        }

        self.presented = Some(presented);
        self.commands.push(DummyCommand::Present { source });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer.0).is_none() {
            log::warn!("DummyBackend: destroying unknown buffer {:?}", buffer);
            return;
        }
        self.commands.push(DummyCommand::DestroyBuffer(buffer));
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture.0).is_none() {
            log::warn!("DummyBackend: destroying unknown texture {:?}", texture);
            return;
        }
        self.commands.push(DummyCommand::DestroyTexture(texture));
    }

    fn destroy_kernel(&mut self, kernel: KernelHandle) {
        self.kernels.remove(&kernel.0);
    }
}
