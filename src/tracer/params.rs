//! Per-frame kernel parameters

use glam::Vec2;

pub use crate::backend::types::KernelUniforms;
use crate::scene::{Camera, DirectionalLight};

/// Random values drawn once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameJitter {
    pub seed: f32,
    pub pixel_offset: Vec2,
}

impl KernelUniforms {
    pub fn new(
        camera: &Camera,
        light: &DirectionalLight,
        aspect: f32,
        jitter: FrameJitter,
        sphere_count: u32,
    ) -> Self {
        Self {
            camera_to_world: camera.camera_to_world(),
            inverse_projection: camera.inverse_projection(aspect),
            directional_light: light.to_gpu_data(),
            pixel_offset: jitter.pixel_offset,
            seed: jitter.seed,
            sphere_count,
        }
    }
}

/// Number of work groups covering `width` x `height` with square tiles.
pub fn dispatch_size(width: u32, height: u32, tile_size: u32) -> (u32, u32) {
    let tile = tile_size.max(1);
    (width.div_ceil(tile), height.div_ceil(tile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(800, 600, 8, (100, 75))]
    #[case(801, 600, 8, (101, 75))]
    #[case(1, 1, 8, (1, 1))]
    #[case(17, 9, 16, (2, 1))]
    fn test_dispatch_size(
        #[case] width: u32,
        #[case] height: u32,
        #[case] tile: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(dispatch_size(width, height, tile), expected);
    }

    #[test]
    fn test_uniforms_from_scene() {
        let camera = Camera::default();
        let light = DirectionalLight::default();
        let jitter = FrameJitter {
            seed: 0.25,
            pixel_offset: Vec2::new(0.5, 0.75),
        };
        let uniforms = KernelUniforms::new(&camera, &light, 2.0, jitter, 12);

        assert_eq!(uniforms.seed, 0.25);
        assert_eq!(uniforms.pixel_offset, Vec2::new(0.5, 0.75));
        assert_eq!(uniforms.sphere_count, 12);
        assert_eq!(uniforms.directional_light, light.to_gpu_data());
        assert_eq!(uniforms.inverse_projection, camera.inverse_projection(2.0));
    }
}
