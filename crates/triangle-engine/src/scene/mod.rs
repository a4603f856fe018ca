//! Immutable description of what the renderer draws.
//!
//! A [`SceneDescriptor`] is handed to the renderer at construction. Tests swap
//! in their own mesh or shader without touching renderer internals.

mod descriptor;
mod mesh;
mod shader;

pub use descriptor::{Animation, CameraDesc, SceneDescriptor};
pub use mesh::{Mesh, Vertex, TRIANGLE_INDICES, TRIANGLE_VERTICES};
pub use shader::{ShaderSource, DEFAULT_SHADER_PATH, TRIANGLE_WGSL};
pub(crate) use shader::{validate_wgsl, FRAGMENT_ENTRY, VERTEX_ENTRY};
