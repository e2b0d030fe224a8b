//! Transforms and pose change tracking

use glam::{Mat4, Quat, Vec3};

/// Position and orientation in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Get forward direction (local -Z in world space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get up direction (local +Y in world space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Look at a target position
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));
    }
}

/// A pose owned elsewhere that reports whether it moved since the last check.
pub trait WatchedTransform {
    fn has_changed(&self) -> bool;

    fn clear_changed(&mut self);
}

/// Transform with a dirty flag raised by every mutation.
///
/// The flag starts raised so the first check after creation sees a change.
#[derive(Debug, Clone)]
pub struct TrackedTransform {
    transform: Transform,
    changed: bool,
}

impl Default for TrackedTransform {
    fn default() -> Self {
        Self::new(Transform::default())
    }
}

impl TrackedTransform {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            changed: true,
        }
    }

    pub fn get(&self) -> &Transform {
        &self.transform
    }

    pub fn set(&mut self, transform: Transform) {
        self.transform = transform;
        self.changed = true;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.changed = true;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
        self.changed = true;
    }

    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.transform.look_at(target, up);
        self.changed = true;
    }
}

impl WatchedTransform for TrackedTransform {
    fn has_changed(&self) -> bool {
        self.changed
    }

    fn clear_changed(&mut self) {
        self.changed = false;
    }
}
