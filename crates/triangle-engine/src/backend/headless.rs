//! Headless backend.
//!
//! Performs no GPU work but models everything the renderer relies on: shader
//! validation, the swapchain image cycle, one-frame-in-flight fencing and
//! live-object bookkeeping. Failures can be injected through
//! [`HeadlessSettings`] to drive the renderer's error paths.

use std::collections::VecDeque;

use crate::coords::Extent;
use crate::error::{RendererError, RendererResult};
use crate::math::UniformBlock;
use crate::scene::{validate_wgsl, Mesh, SceneDescriptor};

use super::{BackendKind, FrameOutcome, GraphicsBackend, ResourceCounts, SwapchainInfo};

/// Presented frames kept for inspection.
const PRESENT_HISTORY: usize = 64;

/// Configuration and failure injection for [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessSettings {
    /// Back buffers in the simulated swapchain.
    pub image_count: u32,
    /// Fail construction with this message.
    pub fail_create: Option<String>,
    /// The next `stale_frames` calls to `draw_frame` report a stale swapchain.
    pub stale_frames: u32,
    /// Report device loss once this many frames have been submitted.
    pub lose_device_after: Option<u64>,
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        Self {
            image_count: 3,
            fail_create: None,
            stale_frames: 0,
            lose_device_after: None,
        }
    }
}

/// Record of one presented frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PresentedFrame {
    /// Submission sequence number, starting at 0.
    pub frame: u64,
    pub image_index: u32,
    pub extent: Extent,
    /// Uniforms visible to the GPU when the draw was submitted.
    pub uniforms: UniformBlock,
    /// Earlier submission whose fence this frame waited on before acquiring
    /// its image. `None` when nothing was in flight.
    pub waited_on: Option<u64>,
}

#[derive(Debug, Clone)]
struct Swapchain {
    extent: Extent,
    image_count: u32,
    next_image: u32,
}

#[derive(Debug)]
pub struct HeadlessBackend {
    settings: HeadlessSettings,
    mesh: Mesh,
    counts: ResourceCounts,
    swapchain: Option<Swapchain>,
    swapchain_builds: u32,
    uniforms: Option<UniformBlock>,

    submitted: u64,
    in_flight: u32,
    max_in_flight: u32,
    presented: VecDeque<PresentedFrame>,

    released: bool,
}

impl HeadlessBackend {
    /// Mesh as uploaded at construction.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Extent of the live swapchain, if any.
    pub fn extent(&self) -> Option<Extent> {
        self.swapchain.as_ref().map(|s| s.extent)
    }

    /// How many times a swapchain has been built.
    pub fn swapchain_builds(&self) -> u32 {
        self.swapchain_builds
    }

    /// Most recent uniform upload.
    pub fn uniforms(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.submitted
    }

    /// Highest number of frames ever in flight at once.
    pub fn max_frames_in_flight(&self) -> u32 {
        self.max_in_flight
    }

    /// Frames currently executing on the simulated GPU.
    pub fn frames_in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Most recent presented frames, oldest first.
    pub fn presented(&self) -> impl Iterator<Item = &PresentedFrame> {
        self.presented.iter()
    }

    pub fn last_presented(&self) -> Option<&PresentedFrame> {
        self.presented.back()
    }

    /// Queues `n` more stale-swapchain reports.
    pub fn inject_stale_frames(&mut self, n: u32) {
        self.settings.stale_frames += n;
    }

    /// Loses the device on the next `draw_frame`.
    pub fn inject_device_loss(&mut self) {
        self.settings.lose_device_after = Some(self.submitted);
    }

    /// Stands in for the fence wait on the previous submission.
    ///
    /// Returns the submission that was still pending, if any.
    fn retire_in_flight(&mut self) -> Option<u64> {
        if self.in_flight == 0 {
            return None;
        }
        self.in_flight = 0;
        let frame = self.submitted - 1;
        log::trace!("headless: retired frame {frame}");
        Some(frame)
    }

    fn ensure_live(&self, op: &str) -> RendererResult<()> {
        if self.released {
            return Err(RendererError::device_lost(format!(
                "headless backend already released ({op})"
            )));
        }
        Ok(())
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Target = ();
    type Settings = HeadlessSettings;

    fn create(
        _target: (),
        settings: &HeadlessSettings,
        scene: &SceneDescriptor,
    ) -> RendererResult<Self> {
        if let Some(msg) = &settings.fail_create {
            return Err(RendererError::initialization(msg.clone()));
        }
        if settings.image_count == 0 {
            return Err(RendererError::initialization("swapchain needs at least one image"));
        }

        let source = scene.shader.load()?;
        validate_wgsl(&scene.shader.label(), &source)?;

        let mesh = scene.mesh;
        let counts = ResourceCounts {
            pipelines: 1,
            shader_modules: 1,
            // vertex + index + uniform
            buffers: 3,
            vertices: mesh.vertices.len() as u32,
            indices: mesh.index_count(),
            ..ResourceCounts::default()
        };

        log::debug!("headless backend created ({} swapchain images)", settings.image_count);

        Ok(Self {
            settings: settings.clone(),
            mesh,
            counts,
            swapchain: None,
            swapchain_builds: 0,
            uniforms: None,
            submitted: 0,
            in_flight: 0,
            max_in_flight: 0,
            presented: VecDeque::with_capacity(PRESENT_HISTORY),
            released: false,
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Headless
    }

    fn configure_swapchain(&mut self, extent: Extent) -> RendererResult<SwapchainInfo> {
        self.ensure_live("configure_swapchain")?;
        self.retire_in_flight();

        if self.swapchain.take().is_some() {
            self.counts.swapchains -= 1;
            self.counts.swapchain_images = 0;
            self.counts.depth_targets -= 1;
        }

        let image_count = self.settings.image_count;
        self.swapchain = Some(Swapchain {
            extent,
            image_count,
            next_image: 0,
        });
        self.counts.swapchains += 1;
        self.counts.swapchain_images = image_count;
        self.counts.depth_targets += 1;
        self.swapchain_builds += 1;

        Ok(SwapchainInfo { extent, image_count })
    }

    fn write_uniforms(&mut self, block: &UniformBlock) -> RendererResult<()> {
        self.ensure_live("write_uniforms")?;
        self.uniforms = Some(*block);
        Ok(())
    }

    fn draw_frame(&mut self) -> RendererResult<FrameOutcome> {
        self.ensure_live("draw_frame")?;

        if self
            .settings
            .lose_device_after
            .is_some_and(|n| self.submitted >= n)
        {
            return Err(RendererError::device_lost("injected device loss"));
        }

        if self.settings.stale_frames > 0 {
            self.settings.stale_frames -= 1;
            return Err(RendererError::SwapchainStale);
        }

        let uniforms = self
            .uniforms
            .ok_or_else(|| RendererError::initialization("uniform buffer never written"))?;
        if self.swapchain.is_none() {
            return Err(RendererError::SwapchainStale);
        }

        // The previous frame stays in flight until here.
        let waited_on = self.retire_in_flight();

        let Some(swapchain) = self.swapchain.as_mut() else {
            return Err(RendererError::SwapchainStale);
        };
        let image_index = swapchain.next_image;
        swapchain.next_image = (swapchain.next_image + 1) % swapchain.image_count;
        let extent = swapchain.extent;

        let frame = self.submitted;
        self.submitted += 1;
        self.in_flight += 1;
        self.max_in_flight = self.max_in_flight.max(self.in_flight);

        if self.presented.len() == PRESENT_HISTORY {
            self.presented.pop_front();
        }
        self.presented.push_back(PresentedFrame {
            frame,
            image_index,
            extent,
            uniforms,
            waited_on,
        });

        Ok(FrameOutcome::Presented { image_index })
    }

    fn wait_idle(&mut self) -> RendererResult<()> {
        self.retire_in_flight();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.retire_in_flight();
        self.swapchain = None;
        self.uniforms = None;
        self.counts = ResourceCounts::default();
        self.released = true;
        log::debug!("headless backend released after {} frames", self.submitted);
    }

    fn resource_counts(&self) -> ResourceCounts {
        self.counts
    }
}
