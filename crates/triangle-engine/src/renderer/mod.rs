//! Renderer lifecycle.
//!
//! [`Renderer`] is written once against
//! [`GraphicsBackend`](crate::backend::GraphicsBackend) and owns the state
//! machine, the camera and the rotation accumulator. Frame pacing lives in
//! [`crate::time`], not here.

mod config;
mod lifecycle;
mod state;

pub use config::RendererConfig;
pub use lifecycle::Renderer;
pub use state::{FrameStatus, RendererState};
