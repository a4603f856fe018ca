use bytemuck::{Pod, Zeroable};

/// Position + colour vertex as consumed by `triangle.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex { position: [1.0, 1.0, 0.0], color: [1.0, 0.0, 0.0] },
    Vertex { position: [-1.0, 1.0, 0.0], color: [0.0, 1.0, 0.0] },
    Vertex { position: [0.0, -1.0, 0.0], color: [0.0, 0.0, 1.0] },
];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// Fixed indexed mesh: one triangle.
///
/// The arrays are sized so a mesh can never hold anything but 3 vertices and
/// 3 indices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: [Vertex; 3],
    pub indices: [u32; 3],
}

impl Mesh {
    pub const fn triangle() -> Self {
        Self {
            vertices: TRIANGLE_VERTICES,
            indices: TRIANGLE_INDICES,
        }
    }

    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    #[inline]
    pub const fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::triangle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(Vertex::layout().array_stride, 24);
    }

    #[test]
    fn triangle_corners_and_colours() {
        let m = Mesh::triangle();
        assert_eq!(m.vertices[0].position, [1.0, 1.0, 0.0]);
        assert_eq!(m.vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(m.vertices[1].position, [-1.0, 1.0, 0.0]);
        assert_eq!(m.vertices[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(m.vertices[2].position, [0.0, -1.0, 0.0]);
        assert_eq!(m.vertices[2].color, [0.0, 0.0, 1.0]);
        assert_eq!(m.indices, [0, 1, 2]);
    }

    #[test]
    fn byte_views_match_sizes() {
        let m = Mesh::triangle();
        assert_eq!(m.vertex_bytes().len(), 3 * 24);
        assert_eq!(m.index_bytes().len(), 3 * 4);
        assert_eq!(m.index_count(), 3);
    }
}
