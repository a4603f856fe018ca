use std::time::Duration;

use crate::backend::{FrameOutcome, GraphicsBackend};
use crate::coords::Extent;
use crate::error::{RendererError, RendererResult};
use crate::math::{Camera, Rotation, UniformBlock};
use crate::scene::SceneDescriptor;

use super::{FrameStatus, RendererConfig, RendererState};

/// Owns one backend and drives it through the triangle's lifecycle.
///
/// Construction builds everything needed to draw, `render` produces one
/// frame, `resize` rebuilds the swapchain, and `destroy` (or `Drop`)
/// releases all of it.
pub struct Renderer<B: GraphicsBackend> {
    backend: B,
    state: RendererState,
    config: RendererConfig,

    extent: Extent,
    camera: Camera,
    rotation: Rotation,
    uniforms: UniformBlock,

    frames_presented: u64,
    swapchain_rebuilds: u64,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Creates the backend, builds the swapchain at `extent`, uploads the
    /// mesh and uniforms.
    ///
    /// On failure every partially created resource is released and no
    /// renderer is returned.
    pub fn new(
        target: B::Target,
        extent: Extent,
        scene: &SceneDescriptor,
        settings: &B::Settings,
        config: RendererConfig,
    ) -> RendererResult<Self> {
        let backend = B::create(target, settings, scene)?;
        log::info!("{} backend initialized", backend.kind());

        let camera = Camera::new(scene.camera);
        let rotation = Rotation::new(scene.animation);
        let uniforms = UniformBlock {
            projection: camera.projection(extent),
            model: rotation.model(),
            view: camera.view(),
        };

        let mut renderer = Self {
            backend,
            state: RendererState::Initialized,
            config,
            extent,
            camera,
            rotation,
            uniforms,
            frames_presented: 0,
            swapchain_rebuilds: 0,
        };

        if let Err(e) = renderer.rebuild_swapchain(extent) {
            renderer.backend.release();
            renderer.state = RendererState::Destroyed;
            return Err(match e {
                RendererError::Initialization(_) => e,
                other => RendererError::initialization(format!("swapchain setup failed: {other}")),
            });
        }

        Ok(renderer)
    }

    #[inline]
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Size the swapchain is currently built at.
    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Matrices as last written to the GPU.
    #[inline]
    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    /// Current rotation angle in radians, in `[0, 2π)`.
    pub fn rotation_angle(&self) -> f32 {
        self.rotation.angle()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Swapchain builds after the initial one, whether from `resize` or from
    /// stale-swapchain recovery.
    pub fn swapchain_rebuilds(&self) -> u64 {
        self.swapchain_rebuilds
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Advances the animation by `dt` and draws one frame.
    ///
    /// A stale swapchain is rebuilt at the current extent and reported as
    /// [`FrameStatus::SwapchainRebuilt`]. Fatal errors move the renderer to
    /// [`RendererState::Failed`].
    pub fn render(&mut self, dt: Duration) -> RendererResult<FrameStatus> {
        self.expect_ready("render")?;

        self.rotation.advance(dt.as_secs_f32());
        self.uniforms.model = self.rotation.model();

        match self.submit_frame() {
            Ok(status) => Ok(status),
            Err(RendererError::SwapchainStale) if self.config.rebuild_on_stale => {
                log::debug!("swapchain stale; rebuilding at {:?}", self.extent);
                self.rebuild_swapchain(self.extent)?;
                if self.config.redraw_after_rebuild {
                    return self.submit_frame();
                }
                Ok(FrameStatus::SwapchainRebuilt)
            }
            Err(e) => Err(e),
        }
    }

    /// Rebuilds the swapchain at `width` x `height`, clamped to
    /// `[1, 65535]` per dimension, and recomputes the projection.
    ///
    /// Returns the extent actually built.
    pub fn resize(&mut self, width: u32, height: u32) -> RendererResult<Extent> {
        self.expect_ready("resize")?;

        let extent = Extent::clamped(width, height);
        if extent.width() != width || extent.height() != height {
            log::debug!("resize {width}x{height} clamped to {extent:?}");
        }

        self.rebuild_swapchain(extent)?;
        Ok(self.extent)
    }

    /// Waits for the GPU to go idle and releases every resource.
    ///
    /// Idempotent; also run on drop.
    pub fn destroy(&mut self) {
        if self.state == RendererState::Destroyed {
            return;
        }
        if let Err(e) = self.backend.wait_idle() {
            log::warn!("wait for idle before destroy failed: {e}");
        }
        self.backend.release();
        self.transition(RendererState::Destroyed);
        log::info!(
            "renderer destroyed after {} frames ({} swapchain rebuilds)",
            self.frames_presented,
            self.swapchain_rebuilds
        );
    }

    fn submit_frame(&mut self) -> RendererResult<FrameStatus> {
        let outcome = self
            .backend
            .write_uniforms(&self.uniforms)
            .and_then(|()| self.backend.draw_frame());

        match outcome {
            Ok(FrameOutcome::Presented { image_index }) => {
                self.frames_presented += 1;
                Ok(FrameStatus::Presented { image_index })
            }
            Ok(FrameOutcome::Skipped) => Ok(FrameStatus::Skipped),
            Err(e) => Err(self.observe(e)),
        }
    }

    /// Tears down and rebuilds the swapchain at `extent`.
    fn rebuild_swapchain(&mut self, extent: Extent) -> RendererResult<()> {
        let initial = self.state == RendererState::Initialized;
        self.transition(RendererState::Resizing);

        let info = self
            .backend
            .configure_swapchain(extent)
            .map_err(|e| self.observe(e))?;

        self.extent = info.extent;
        self.uniforms.projection = self.camera.projection(info.extent);
        self.backend
            .write_uniforms(&self.uniforms)
            .map_err(|e| self.observe(e))?;

        if !initial {
            self.swapchain_rebuilds += 1;
        }
        self.transition(RendererState::Ready);
        Ok(())
    }

    /// Moves to `Failed` on fatal errors; recoverable ones leave the state
    /// as it was before the failing operation started.
    fn observe(&mut self, e: RendererError) -> RendererError {
        if e.is_fatal() {
            log::error!("renderer failed: {e}");
            self.transition(RendererState::Failed);
        } else if self.state == RendererState::Resizing {
            self.transition(RendererState::Ready);
        }
        e
    }

    fn expect_ready(&self, op: &'static str) -> RendererResult<()> {
        if self.state == RendererState::Ready {
            Ok(())
        } else {
            Err(RendererError::InvalidState {
                op,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: RendererState) {
        if self.state != next {
            log::trace!("renderer: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl<B: GraphicsBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
