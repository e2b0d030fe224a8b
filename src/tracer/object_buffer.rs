//! GPU copy of the generated spheres

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::scene::Sphere;

/// Storage buffer holding one [`Sphere`] per element.
///
/// An empty scene holds no buffer at all; the kernel then sees zero spheres.
#[derive(Debug, Default)]
pub struct ObjectBuffer {
    buffer: Option<BufferHandle>,
    len: usize,
}

impl ObjectBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `spheres`, releasing the previous buffer first.
    pub fn upload<D: RenderDevice + ?Sized>(
        &mut self,
        device: &mut D,
        spheres: &[Sphere],
    ) -> BackendResult<()> {
        self.release(device);

        if spheres.is_empty() {
            return Ok(());
        }

        let data: &[u8] = bytemuck::cast_slice(spheres);
        let buffer = device.create_buffer_init(
            &BufferDescriptor {
                label: Some("Sphere Buffer".to_string()),
                size: data.len() as u64,
                usage: BufferUsage::STORAGE,
            },
            data,
        )?;

        log::debug!("Uploaded {} spheres ({} bytes)", spheres.len(), data.len());
        self.buffer = Some(buffer);
        self.len = spheres.len();
        Ok(())
    }

    /// Free the buffer. Safe to call when nothing is allocated.
    pub fn release<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        if let Some(buffer) = self.buffer.take() {
            device.destroy_buffer(buffer);
        }
        self.len = 0;
    }

    /// Buffer to bind, `None` if the scene is empty
    pub fn handle(&self) -> Option<BufferHandle> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
