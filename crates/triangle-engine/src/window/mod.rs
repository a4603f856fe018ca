//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to a [`Renderer`].
//! [`run_headless`] drives the same renderer without a window.
//!
//! [`Renderer`]: crate::renderer::Renderer

mod headless;
mod runtime;

pub use headless::{run_headless, HeadlessReport};
pub use runtime::{Runtime, RuntimeConfig};
