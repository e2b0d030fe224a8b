//! Sphere primitive shared with the path tracing kernel

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Surface response of a sphere, decided once at generation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SphereMaterial {
    /// Near-black albedo, colored specular
    Metal { specular: Vec3, smoothness: f32 },
    /// Colored albedo, near-black specular
    Diffuse { albedo: Vec3, smoothness: f32 },
    /// Light source, albedo and specular stay zero
    Emissive { emission: Vec3 },
}

/// GPU layout of a sphere.
///
/// Fields are tightly packed `f32`s so the array stride is 56 bytes, the
/// same as the `Sphere` struct in the kernel interface.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub albedo: Vec3,
    pub specular: Vec3,
    pub smoothness: f32,
    pub emission: Vec3,
}

impl Sphere {
    /// Size of one element in the object buffer
    pub const STRIDE: usize = std::mem::size_of::<Sphere>();

    /// Albedo and specular of non-emissive materials that are not colored
    pub const DIM_COLOR: Vec3 = Vec3::splat(0.1);

    pub fn new(position: Vec3, radius: f32, material: SphereMaterial) -> Self {
        let mut sphere = Self {
            position,
            radius,
            albedo: Vec3::ZERO,
            specular: Vec3::ZERO,
            smoothness: 0.0,
            emission: Vec3::ZERO,
        };
        match material {
            SphereMaterial::Metal {
                specular,
                smoothness,
            } => {
                sphere.albedo = Self::DIM_COLOR;
                sphere.specular = specular;
                sphere.smoothness = smoothness;
            }
            SphereMaterial::Diffuse { albedo, smoothness } => {
                sphere.albedo = albedo;
                sphere.specular = Self::DIM_COLOR;
                sphere.smoothness = smoothness;
            }
            SphereMaterial::Emissive { emission } => {
                sphere.emission = emission;
            }
        }
        sphere
    }

    pub fn is_emissive(&self) -> bool {
        self.emission != Vec3::ZERO
    }

    /// True if the two spheres interpenetrate.
    ///
    /// Compares squared distances, touching spheres do not overlap.
    pub fn overlaps(&self, other: &Sphere) -> bool {
        let min_dist = self.radius + other.radius;
        self.position.distance_squared(other.position) < min_dist * min_dist
    }
}
