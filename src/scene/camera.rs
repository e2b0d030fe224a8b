//! Camera

use glam::{Mat4, Quat, Vec3};

use super::transform::{TrackedTransform, Transform, WatchedTransform};

/// Perspective camera the kernel shoots primary rays from.
///
/// Pose changes raise the transform's dirty flag. The field of view is not
/// part of the pose and is compared by value instead.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: TrackedTransform,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: TrackedTransform::default(),
            fov_y: 60.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut transform = Transform::from_position(position);
        transform.look_at(target, Vec3::Y);
        Self {
            transform: TrackedTransform::new(transform),
            ..Default::default()
        }
    }

    pub fn with_fov(mut self, fov_y_degrees: f32) -> Self {
        self.fov_y = fov_y_degrees;
        self
    }

    pub fn transform(&self) -> &Transform {
        self.transform.get()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.get().position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.set_rotation(rotation);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.transform.look_at(target, Vec3::Y);
    }

    pub fn field_of_view(&self) -> f32 {
        self.fov_y
    }

    pub fn set_field_of_view(&mut self, fov_y_degrees: f32) {
        self.fov_y = fov_y_degrees;
    }

    pub fn camera_to_world(&self) -> Mat4 {
        self.transform.get().matrix()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far)
    }

    pub fn inverse_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect).inverse()
    }
}

impl WatchedTransform for Camera {
    fn has_changed(&self) -> bool {
        self.transform.has_changed()
    }

    fn clear_changed(&mut self) {
        self.transform.clear_changed();
    }
}
