//! Triangle engine crate.
//!
//! A hello-triangle renderer: one [`renderer::Renderer`] state machine drives
//! any [`backend::GraphicsBackend`], either on a `winit` window through
//! `wgpu` or headless.

pub mod backend;
pub mod coords;
pub mod error;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod time;
pub mod window;

pub mod logging;

pub use error::{ErrorKind, RendererError, RendererResult};
