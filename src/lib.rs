//! Progressive Tracer - A progressive GPU path tracing driver
//!
//! The crate builds a procedural scene of spheres, feeds per-frame
//! parameters to a user supplied path tracing compute kernel and averages
//! the noisy samples into a converged image that refines over time.
//!
//! # Features
//! - Deterministic, seeded sphere placement with overlap rejection
//! - Automatic accumulation reset on camera, light or field of view changes
//! - Accumulation images that follow the output surface size
//! - wgpu backend, plus a CPU dummy backend for headless testing

pub mod backend;
pub mod resources;
pub mod scene;
pub mod tracer;

pub use backend::{DummyBackend, RenderDevice};
#[cfg(feature = "wgpu-backend")]
pub use backend::WgpuBackend;
pub use scene::{Camera, DirectionalLight, SceneConfig, SceneGenerator};
pub use tracer::{FrameOutcome, PathTracer, SkipReason, TracerState};

/// Configuration for the path tracer
#[derive(Debug, Clone, PartialEq)]
pub struct TracerConfig {
    /// Scene generation parameters
    pub scene: SceneConfig,
    /// Work group edge of the path tracing kernel (in pixels)
    pub tile_size: u32,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            tile_size: 8,
        }
    }
}
