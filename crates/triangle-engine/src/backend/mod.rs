//! Graphics backend abstraction.
//!
//! The renderer state machine is written once against [`GraphicsBackend`].
//! Backend divergence stays inside the trait's operations.
//!
//! # Available Backends
//!
//! - [`wgpu::WgpuBackend`]: Vulkan, Direct3D 12, OpenGL/GLES or Metal via wgpu
//! - [`headless::HeadlessBackend`]: no GPU; live-object diagnostics for tests

pub mod headless;
mod kind;
pub mod wgpu;

pub use kind::{BackendKind, ParseBackendKindError};

use crate::coords::Extent;
use crate::error::RendererResult;
use crate::math::UniformBlock;
use crate::scene::SceneDescriptor;

/// Result of a successful swapchain (re)build.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SwapchainInfo {
    /// Size the swapchain was actually built at.
    pub extent: Extent,
    /// Back buffers the presentation engine cycles through. For wgpu this is
    /// the count implied by the requested frame latency.
    pub image_count: u32,
}

/// What happened to one submitted frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Drawn into back buffer `image_index` and queued for presentation.
    Presented { image_index: u32 },
    /// No back buffer was available in time; nothing was drawn.
    Skipped,
}

/// Live GPU objects owned by a backend.
///
/// Zero across the board once the backend has been released.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub swapchains: u32,
    pub swapchain_images: u32,
    pub depth_targets: u32,
    pub pipelines: u32,
    pub shader_modules: u32,
    pub buffers: u32,
    pub vertices: u32,
    pub indices: u32,
}

impl ResourceCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One native graphics API behind the renderer.
///
/// Construction covers instance, adapter, device, queue, command recording,
/// mesh upload and pipeline creation. The swapchain is built separately by
/// [`configure_swapchain`](Self::configure_swapchain) so that construction and
/// resize share one path.
pub trait GraphicsBackend: Sized {
    /// What the backend presents into (a window, or nothing).
    type Target;

    /// Backend-specific configuration.
    type Settings: Clone + std::fmt::Debug;

    fn create(
        target: Self::Target,
        settings: &Self::Settings,
        scene: &SceneDescriptor,
    ) -> RendererResult<Self>;

    fn kind(&self) -> BackendKind;

    /// Destroys the current swapchain, depth buffer and per-image targets,
    /// then builds new ones at `extent`.
    fn configure_swapchain(&mut self, extent: Extent) -> RendererResult<SwapchainInfo>;

    /// Copies `block` into GPU-visible uniform memory.
    fn write_uniforms(&mut self, block: &UniformBlock) -> RendererResult<()>;

    /// Acquires a back buffer, draws the mesh, submits and presents.
    ///
    /// Blocks until the previous frame finished, so at most one frame is in
    /// flight.
    fn draw_frame(&mut self) -> RendererResult<FrameOutcome>;

    /// Blocks until all submitted work has completed.
    fn wait_idle(&mut self) -> RendererResult<()>;

    /// Releases every owned resource in reverse creation order.
    ///
    /// Must be idempotent.
    fn release(&mut self);

    fn resource_counts(&self) -> ResourceCounts;
}
