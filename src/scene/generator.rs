//! Procedural sphere scene generation
//!
//! Spheres are scattered on a disk around the origin and rest on the ground
//! plane (`y == radius`). Each draw proposes one candidate; candidates that
//! interpenetrate an already accepted sphere are discarded without retry, so
//! dense configurations end up with fewer spheres than requested.

use bytemuck::Zeroable;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::sphere::{Sphere, SphereMaterial};

/// Below this the sphere reflects light, above it emits light
const REFLECTIVE_CHANCE: f32 = 0.8;
/// Below this a reflective sphere is metal, otherwise diffuse
const METAL_CHANCE: f32 = 0.4;
/// Value range of emissive colors
const EMISSION_VALUE_RANGE: (f32, f32) = (3.0, 8.0);

/// Parameters read once per scene generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub seed: u64,
    /// Minimum and maximum sphere radius
    pub radius_range: Vec2,
    /// Number of placement attempts
    pub max_count: u32,
    /// Radius of the disk sphere centers are drawn from
    pub placement_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            radius_range: Vec2::new(3.0, 8.0),
            max_count: 100,
            placement_radius: 100.0,
        }
    }
}

/// Generated spheres in acceptance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Raw bytes for the object buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spheres)
    }
}

pub struct SceneGenerator;

impl SceneGenerator {
    /// Generate a scene from a fresh stream seeded with `config.seed`.
    pub fn generate(config: &SceneConfig) -> Scene {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::generate_with(&mut rng, config)
    }

    /// Generate a scene drawing from an existing stream.
    ///
    /// The stream is left positioned after the last draw so callers can keep
    /// using it for per-frame jitter.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, config: &SceneConfig) -> Scene {
        let mut spheres: Vec<Sphere> = Vec::new();
        let (min_radius, max_radius) = (config.radius_range.x, config.radius_range.y);

        for _ in 0..config.max_count {
            let radius = min_radius + rng.gen::<f32>() * (max_radius - min_radius);
            let offset = sample_unit_disk(rng) * config.placement_radius;
            let position = Vec3::new(offset.x, radius, offset.y);

            let candidate = Sphere {
                position,
                radius,
                ..Zeroable::zeroed()
            };
            if spheres.iter().any(|other| other.overlaps(&candidate)) {
                continue;
            }

            let material = sample_material(rng);
            spheres.push(Sphere::new(position, radius, material));
        }

        log::debug!(
            "Generated {} spheres from {} attempts (seed {})",
            spheres.len(),
            config.max_count,
            config.seed
        );

        Scene { spheres }
    }
}

/// Uniform point inside the unit disk by rejection from the enclosing square
fn sample_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let p = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

fn sample_material<R: Rng + ?Sized>(rng: &mut R) -> SphereMaterial {
    let color = hsv_to_rgb(rng.gen(), rng.gen(), rng.gen());
    let chance: f32 = rng.gen();

    if chance < REFLECTIVE_CHANCE {
        let smoothness = rng.gen();
        if chance < METAL_CHANCE {
            SphereMaterial::Metal {
                specular: color,
                smoothness,
            }
        } else {
            SphereMaterial::Diffuse {
                albedo: color,
                smoothness,
            }
        }
    } else {
        let (low, high) = EMISSION_VALUE_RANGE;
        let emission = hsv_to_rgb(rng.gen(), rng.gen(), rng.gen_range(low..=high));
        SphereMaterial::Emissive { emission }
    }
}

/// Convert hue, saturation and value to RGB.
///
/// `h` and `s` are in `[0, 1]`; `v` may exceed one for HDR colors, in which
/// case every channel scales with it.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(v);
    }

    let h = (h.fract() + 1.0).fract() * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}
