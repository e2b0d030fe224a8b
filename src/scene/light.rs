//! Directional light

use glam::{Quat, Vec3, Vec4};

use super::transform::{TrackedTransform, Transform, WatchedTransform};

/// Sun-like light; the direction is the forward axis of its transform.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    transform: TrackedTransform,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            transform: TrackedTransform::default(),
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn new(rotation: Quat, intensity: f32) -> Self {
        Self {
            transform: TrackedTransform::new(Transform::from_position_rotation(Vec3::ZERO, rotation)),
            intensity,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.transform.get().forward()
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.set_rotation(rotation);
    }

    /// Direction in `xyz`, intensity in `w`
    pub fn to_gpu_data(&self) -> Vec4 {
        self.direction().extend(self.intensity)
    }
}

impl WatchedTransform for DirectionalLight {
    fn has_changed(&self) -> bool {
        self.transform.has_changed()
    }

    fn clear_changed(&mut self) {
        self.transform.clear_changed();
    }
}
