//! Scene description: procedurally placed spheres, camera and light

mod camera;
mod generator;
mod light;
mod sphere;
mod transform;

pub use camera::*;
pub use generator::*;
pub use light::*;
pub use sphere::*;
pub use transform::*;
