use glam::Vec3;

use crate::coords::ColorRgba;

use super::{Mesh, ShaderSource};

/// Perspective camera parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraDesc {
    /// Vertical field of view, in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Translation applied by the view matrix.
    pub eye_offset: Vec3,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            z_near: 0.1,
            z_far: 256.0,
            eye_offset: Vec3::new(0.0, 0.0, -2.5),
        }
    }
}

/// Model rotation driven by elapsed time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Animation {
    /// Unit rotation axis.
    pub axis: Vec3,
    /// Radians per second. Zero keeps the triangle static.
    pub speed: f32,
}

impl Animation {
    pub const fn still() -> Self {
        Self {
            axis: Vec3::Y,
            speed: 0.0,
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            speed: 1.0,
        }
    }
}

/// Everything the renderer needs to know about what it draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescriptor {
    pub mesh: Mesh,
    pub shader: ShaderSource,
    pub camera: CameraDesc,
    pub animation: Animation,
    pub clear_color: ColorRgba,
}

impl SceneDescriptor {
    pub fn with_shader(mut self, shader: ShaderSource) -> Self {
        self.shader = shader;
        self
    }
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self {
            mesh: Mesh::triangle(),
            shader: ShaderSource::default(),
            camera: CameraDesc::default(),
            animation: Animation::default(),
            clear_color: ColorRgba::backdrop(),
        }
    }
}
