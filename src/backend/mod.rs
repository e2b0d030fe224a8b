//! Backend abstraction layer
//!
//! Provides the device trait the path tracer drives, a wgpu implementation
//! and a CPU-side dummy used in tests.

pub mod dummy;
pub mod shaders;
pub mod traits;
pub mod types;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub use dummy::{DummyBackend, DummyCommand};
pub use traits::*;
pub use types::*;

#[cfg(feature = "wgpu-backend")]
pub use wgpu_backend::WgpuBackend;
