//! GPU backend on top of `wgpu`.
//!
//! One backend covers Vulkan, Direct3D 12, OpenGL/GLES and Metal; the API is
//! picked through [`WgpuSettings::api`]. The surface is created from an
//! `Arc<Window>` so it borrows nothing and can live inside the renderer.

mod pipeline;
mod resources;
mod surface;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use winit::window::Window;

use crate::coords::{ColorRgba, Extent};
use crate::error::{RendererError, RendererResult};
use crate::math::UniformBlock;
use crate::scene::{validate_wgsl, SceneDescriptor};

use super::{BackendKind, FrameOutcome, GraphicsBackend, ResourceCounts, SwapchainInfo};
use pipeline::TrianglePipeline;
use resources::{create_uniform_buffer, DepthTarget, MeshBuffers};
use surface::{
    choose_alpha_mode, choose_present_mode, choose_surface_format, fit_to_device,
    map_surface_error, AcquireFailure,
};

/// How the wgpu backend picks its adapter and configures the surface.
#[derive(Debug, Clone)]
pub struct WgpuSettings {
    /// Native API to drive. `Auto` lets wgpu choose among the primary APIs.
    pub api: BackendKind,

    /// Pick `Bgra8UnormSrgb` or `Rgba8UnormSrgb` when the surface lists one.
    pub prefer_srgb: bool,

    /// Requested swap behavior. Unsupported modes become FIFO.
    pub present_mode: wgpu::PresentMode,

    /// Compositor alpha. `None` or an unsupported mode takes the surface's first.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the presentation engine may queue ahead. The swapchain is sized
    /// one image above this.
    pub desired_maximum_frame_latency: u32,
}

impl Default for WgpuSettings {
    fn default() -> Self {
        Self {
            api: BackendKind::Auto,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::default(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 1,
        }
    }
}

/// Core objects, declared in reverse creation order.
struct GpuContext {
    queue: wgpu::Queue,
    device: wgpu::Device,
    surface: wgpu::Surface<'static>,
    _adapter: wgpu::Adapter,
    _instance: wgpu::Instance,
}

pub struct WgpuBackend {
    window: Arc<Window>,
    kind: BackendKind,
    clear_color: ColorRgba,

    config: wgpu::SurfaceConfiguration,
    image_count: u32,
    configured: bool,
    suboptimal: bool,
    next_image: u32,
    device_lost: Arc<AtomicBool>,

    depth: Option<DepthTarget>,
    mesh: Option<MeshBuffers>,
    uniforms: Option<wgpu::Buffer>,
    pipeline: Option<TrianglePipeline>,
    bind_group: Option<wgpu::BindGroup>,
    gpu: Option<GpuContext>,
}

impl WgpuBackend {
    fn gpu(&self) -> RendererResult<&GpuContext> {
        self.gpu
            .as_ref()
            .ok_or_else(|| RendererError::device_lost("wgpu backend already released"))
    }

    fn check_device(&self) -> RendererResult<()> {
        if self.device_lost.load(Ordering::Acquire) {
            return Err(RendererError::device_lost("device reported lost"));
        }
        Ok(())
    }

    fn wait_for(&self, submission: Option<wgpu::SubmissionIndex>) -> RendererResult<()> {
        let gpu = self.gpu()?;
        gpu.device
            .poll(wgpu::PollType::Wait {
                submission_index: submission,
                timeout: None,
            })
            .map_err(|e| RendererError::device_lost(format!("device poll failed: {e}")))?;
        self.check_device()
    }
}

impl GraphicsBackend for WgpuBackend {
    type Target = Arc<Window>;
    type Settings = WgpuSettings;

    fn create(
        window: Arc<Window>,
        settings: &WgpuSettings,
        scene: &SceneDescriptor,
    ) -> RendererResult<Self> {
        if !settings.api.is_gpu() {
            return Err(RendererError::initialization(
                "the wgpu backend needs a GPU API, not `headless`",
            ));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: settings.api.wgpu_backends(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RendererError::initialization(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: settings.power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| {
            RendererError::initialization(format!(
                "no {} adapter compatible with the window: {e}",
                settings.api
            ))
        })?;

        let info = adapter.get_info();
        let kind = BackendKind::from_wgpu(info.backend);
        log::info!("adapter: {} ({}, {:?})", info.name, kind, info.device_type);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("triangle device"),
            required_features: settings.required_features,
            required_limits: settings.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| RendererError::initialization(format!("failed to create device: {e}")))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        {
            let flag = device_lost.clone();
            device.set_device_lost_callback(move |reason, message| {
                if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                    log::debug!("device destroyed: {message}");
                } else {
                    log::error!("device lost ({reason:?}): {message}");
                }
                flag.store(true, Ordering::Release);
            });
        }

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps, settings.prefer_srgb)
            .ok_or_else(|| RendererError::initialization("surface reports no supported formats"))?;

        let latency = settings.desired_maximum_frame_latency.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: 1,
            height: 1,
            present_mode: choose_present_mode(&caps, settings.present_mode),
            alpha_mode: choose_alpha_mode(&caps, settings.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: latency,
        };
        log::debug!(
            "surface format {:?}, present mode {:?}, alpha {:?}",
            config.format,
            config.present_mode,
            config.alpha_mode
        );

        let mesh = MeshBuffers::upload(&device, &scene.mesh);
        let uniforms = create_uniform_buffer(&device);

        let label = scene.shader.label();
        let source = scene.shader.load()?;
        validate_wgsl(&label, &source)?;
        let pipeline = TrianglePipeline::new(&device, &label, &source, config.format);
        let bind_group = pipeline.bind_group(&device, &uniforms);

        Ok(Self {
            window,
            kind,
            clear_color: scene.clear_color,
            config,
            // The presentation engine holds one image per frame of latency
            // plus the one being drawn.
            image_count: latency + 1,
            configured: false,
            suboptimal: false,
            next_image: 0,
            device_lost,
            depth: None,
            mesh: Some(mesh),
            uniforms: Some(uniforms),
            pipeline: Some(pipeline),
            bind_group: Some(bind_group),
            gpu: Some(GpuContext {
                queue,
                device,
                surface,
                _adapter: adapter,
                _instance: instance,
            }),
        })
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn configure_swapchain(&mut self, extent: Extent) -> RendererResult<SwapchainInfo> {
        self.check_device()?;
        self.wait_for(None)?;

        // Old targets go before new ones are built.
        self.depth = None;
        self.configured = false;

        let Some(gpu) = self.gpu.as_ref() else {
            return Err(RendererError::device_lost("wgpu backend already released"));
        };
        let max_dim = gpu.device.limits().max_texture_dimension_2d;
        let (extent, cut) = fit_to_device(extent, max_dim);
        if cut {
            log::warn!(
                "requested swapchain exceeds device limit {max_dim}; using {}x{}",
                extent.width(),
                extent.height()
            );
        }

        self.config.width = extent.width();
        self.config.height = extent.height();
        gpu.surface.configure(&gpu.device, &self.config);
        let depth = DepthTarget::new(&gpu.device, extent);

        log::debug!(
            "swapchain configured at {}x{} ({} images)",
            extent.width(),
            extent.height(),
            self.image_count
        );

        self.depth = Some(depth);
        self.configured = true;
        self.suboptimal = false;
        self.next_image = 0;

        Ok(SwapchainInfo {
            extent,
            image_count: self.image_count,
        })
    }

    fn write_uniforms(&mut self, block: &UniformBlock) -> RendererResult<()> {
        let gpu = self.gpu()?;
        let Some(buffer) = self.uniforms.as_ref() else {
            return Err(RendererError::initialization("uniform buffer missing"));
        };
        gpu.queue.write_buffer(buffer, 0, block.as_bytes());
        Ok(())
    }

    fn draw_frame(&mut self) -> RendererResult<FrameOutcome> {
        self.check_device()?;
        if !self.configured || self.suboptimal {
            return Err(RendererError::SwapchainStale);
        }

        let Some(gpu) = self.gpu.as_ref() else {
            return Err(RendererError::device_lost("wgpu backend already released"));
        };
        let (Some(pipeline), Some(bind_group), Some(mesh), Some(depth)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.mesh.as_ref(),
            self.depth.as_ref(),
        ) else {
            return Err(RendererError::initialization("pipeline resources missing"));
        };

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                log::debug!("surface acquire failed: {err}");
                return match map_surface_error(err) {
                    AcquireFailure::Skip => Ok(FrameOutcome::Skipped),
                    AcquireFailure::Fail(e) => Err(e),
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("triangle frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("triangle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pipeline.pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vertex.slice(..));
            rpass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        let submission = gpu.queue.submit(std::iter::once(encoder.finish()));

        let suboptimal = surface_texture.suboptimal;
        self.window.pre_present_notify();
        drop(view);
        surface_texture.present();

        let image_index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        if suboptimal {
            log::debug!("surface reported suboptimal; rebuilding before next frame");
            self.suboptimal = true;
        }

        // One frame in flight: the next acquire happens after this work retires.
        self.wait_for(Some(submission))?;

        Ok(FrameOutcome::Presented { image_index })
    }

    fn wait_idle(&mut self) -> RendererResult<()> {
        if self.gpu.is_none() {
            return Ok(());
        }
        self.wait_for(None)
    }

    fn release(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        if let Err(e) = gpu.device.poll(wgpu::PollType::wait_indefinitely()) {
            log::warn!("device did not go idle before release: {e}");
        }

        self.bind_group = None;
        self.pipeline = None;
        self.uniforms = None;
        self.mesh = None;
        self.depth = None;
        self.configured = false;
        self.gpu = None;

        log::debug!("wgpu backend released");
    }

    fn resource_counts(&self) -> ResourceCounts {
        let live = |present: bool| u32::from(present);
        let (vertices, indices) = self
            .mesh
            .as_ref()
            .map_or((0, 0), |m| (m.vertex_count, m.index_count));

        ResourceCounts {
            swapchains: live(self.configured),
            swapchain_images: if self.configured { self.image_count } else { 0 },
            depth_targets: live(self.depth.is_some()),
            pipelines: live(self.pipeline.is_some()),
            shader_modules: live(self.pipeline.is_some()),
            buffers: live(self.uniforms.is_some()) + 2 * live(self.mesh.is_some()),
            vertices,
            indices,
        }
    }
}

impl Drop for WgpuBackend {
    fn drop(&mut self) {
        self.release();
    }
}
