/// Smallest accepted swapchain dimension.
pub const MIN_EXTENT_DIM: u32 = 1;

/// Largest accepted swapchain dimension.
pub const MAX_EXTENT_DIM: u32 = 0xffff;

/// Swapchain size in physical pixels.
///
/// Both dimensions are always inside `[MIN_EXTENT_DIM, MAX_EXTENT_DIM]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Extent {
    width: u32,
    height: u32,
}

impl Extent {
    /// Clamps `width` and `height` into the accepted range.
    #[inline]
    pub fn clamped(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(MIN_EXTENT_DIM, MAX_EXTENT_DIM),
            height: height.clamp(MIN_EXTENT_DIM, MAX_EXTENT_DIM),
        }
    }

    #[inline]
    pub const fn width(self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Width over height; never zero or infinite.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::clamped(1280, 720)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Extent {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::clamped(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_raised_to_one() {
        let e = Extent::clamped(0, 0);
        assert_eq!((e.width(), e.height()), (1, 1));
    }

    #[test]
    fn oversized_is_capped() {
        let e = Extent::clamped(70_000, u32::MAX);
        assert_eq!((e.width(), e.height()), (65_535, 65_535));
    }

    #[test]
    fn in_range_is_untouched() {
        let e = Extent::clamped(640, 480);
        assert_eq!((e.width(), e.height()), (640, 480));
        assert_eq!(e.aspect_ratio(), 640.0 / 480.0);
    }

    #[test]
    fn physical_size_conversion_clamps() {
        let e: Extent = winit::dpi::PhysicalSize::new(0u32, 720u32).into();
        assert_eq!((e.width(), e.height()), (1, 720));
    }
}
