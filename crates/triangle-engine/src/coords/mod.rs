//! Size and colour types shared by the renderer and its backends.
//!
//! Sizes are physical pixels. Colours are linear RGBA.

mod color;
mod extent;

pub use color::ColorRgba;
pub use extent::{Extent, MAX_EXTENT_DIM, MIN_EXTENT_DIM};
