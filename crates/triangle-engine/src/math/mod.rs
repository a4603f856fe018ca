//! Matrices fed to the vertex shader.

mod camera;
mod rotation;
mod uniforms;

pub use camera::Camera;
pub use rotation::Rotation;
pub use uniforms::UniformBlock;
