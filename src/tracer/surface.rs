//! Working and converged accumulation images

use crate::backend::traits::*;
use crate::backend::types::*;

/// Pair of equally sized float images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AccumulationTargets {
    working: TextureHandle,
    converged: TextureHandle,
    width: u32,
    height: u32,
}

/// Result of [`SurfaceManager::ensure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsuredTargets {
    /// Image the kernel writes the current sample into
    pub working: TextureHandle,
    /// Running average of all samples since the last reset
    pub converged: TextureHandle,
    /// True if the images were (re)created and hold no samples
    pub did_reset: bool,
}

/// Owns the accumulation images and keeps them sized to the output surface.
#[derive(Debug, Default)]
pub struct SurfaceManager {
    targets: Option<AccumulationTargets>,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return images of exactly `width` x `height`, reallocating both if needed.
    ///
    /// Old images are released before new ones are created. If creation
    /// fails no images are held afterwards.
    pub fn ensure<D: RenderDevice + ?Sized>(
        &mut self,
        device: &mut D,
        width: u32,
        height: u32,
    ) -> BackendResult<EnsuredTargets> {
        if let Some(targets) = self.targets {
            if targets.width == width && targets.height == height {
                return Ok(EnsuredTargets {
                    working: targets.working,
                    converged: targets.converged,
                    did_reset: false,
                });
            }
        }

        self.release(device);

        let working =
            device.create_texture(&TextureDescriptor::storage_image("Working Image", width, height))?;
        let converged = match device.create_texture(&TextureDescriptor::storage_image(
            "Converged Image",
            width,
            height,
        )) {
            Ok(converged) => converged,
            Err(err) => {
                device.destroy_texture(working);
                return Err(err);
            }
        };

        log::info!("Allocated accumulation images at {}x{}", width, height);
        self.targets = Some(AccumulationTargets {
            working,
            converged,
            width,
            height,
        });

        Ok(EnsuredTargets {
            working,
            converged,
            did_reset: true,
        })
    }

    /// Release both images. Safe to call when nothing is allocated.
    pub fn release<D: RenderDevice + ?Sized>(&mut self, device: &mut D) {
        if let Some(targets) = self.targets.take() {
            device.destroy_texture(targets.working);
            device.destroy_texture(targets.converged);
        }
    }

    /// Current image size, if allocated
    pub fn size(&self) -> Option<(u32, u32)> {
        self.targets.map(|t| (t.width, t.height))
    }

    pub fn is_allocated(&self) -> bool {
        self.targets.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, DummyCommand};

    #[test]
    fn test_same_size_reuses_images() {
        let mut device = DummyBackend::new(64, 32);
        let mut surfaces = SurfaceManager::new();

        let first = surfaces.ensure(&mut device, 64, 32).unwrap();
        let second = surfaces.ensure(&mut device, 64, 32).unwrap();

        assert!(first.did_reset);
        assert!(!second.did_reset);
        assert_eq!(first.working, second.working);
        assert_eq!(first.converged, second.converged);
        assert_eq!(device.live_textures(), 2);
    }

    #[test]
    fn test_resize_releases_before_creating() {
        let mut device = DummyBackend::new(64, 32);
        let mut surfaces = SurfaceManager::new();
        let first = surfaces.ensure(&mut device, 64, 32).unwrap();
        device.clear_commands();

        let second = surfaces.ensure(&mut device, 32, 32).unwrap();
        assert!(second.did_reset);
        assert_ne!(first.working, second.working);
        assert_eq!(device.live_textures(), 2);

        let commands = device.commands();
        assert_eq!(commands[0], DummyCommand::DestroyTexture(first.working));
        assert_eq!(commands[1], DummyCommand::DestroyTexture(first.converged));
        assert!(matches!(commands[2], DummyCommand::CreateTexture { .. }));
    }

    #[test]
    fn test_partial_failure_leaves_nothing() {
        let mut device = DummyBackend::new(16, 16);
        let mut surfaces = SurfaceManager::new();
        surfaces.ensure(&mut device, 16, 16).unwrap();

        // Working image is created, converged image fails
        device.fail_texture_creations_after(1, 1);
        let result = surfaces.ensure(&mut device, 32, 16);

        assert_eq!(result, Err(BackendError::OutOfMemory));
        assert!(!surfaces.is_allocated());
        assert_eq!(device.live_textures(), 0);

        let recovered = surfaces.ensure(&mut device, 32, 16).unwrap();
        assert!(recovered.did_reset);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut device = DummyBackend::new(8, 8);
        let mut surfaces = SurfaceManager::new();
        surfaces.release(&mut device);
        surfaces.ensure(&mut device, 8, 8).unwrap();
        surfaces.release(&mut device);
        surfaces.release(&mut device);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(surfaces.size(), None);
    }
}
