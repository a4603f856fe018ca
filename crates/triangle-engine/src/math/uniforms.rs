use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Vertex-stage uniform block.
///
/// Layout matches `Uniforms` in `triangle.wgsl`: three column-major 4x4 matrices.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub projection: Mat4,
    pub model: Mat4,
    pub view: Mat4,
}

impl UniformBlock {
    pub const SIZE: u64 = std::mem::size_of::<UniformBlock>() as u64;

    /// Returns the `wgpu` minimum binding size for the uniform buffer.
    pub(crate) const fn min_binding_size() -> std::num::NonZeroU64 {
        match std::num::NonZeroU64::new(Self::SIZE) {
            Some(size) => size,
            None => panic!("UniformBlock is zero-sized"),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_three_matrices() {
        assert_eq!(UniformBlock::SIZE, 192);
        assert_eq!(UniformBlock::default().as_bytes().len(), 192);
    }

    #[test]
    fn projection_comes_first_in_memory() {
        let block = UniformBlock {
            projection: Mat4::from_scale(glam::Vec3::splat(2.0)),
            ..UniformBlock::default()
        };
        let floats: &[f32] = bytemuck::cast_slice(block.as_bytes());
        assert_eq!(floats[0], 2.0);
        // model starts at offset 16 and is identity.
        assert_eq!(floats[16], 1.0);
        assert_eq!(floats[17], 0.0);
    }
}
