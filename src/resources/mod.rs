//! Resource loading
//!
//! Handles decoding and upload of the skybox texture.

mod texture;

pub use texture::*;
