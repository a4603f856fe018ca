use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::GraphicsBackend;
use crate::coords::Extent;
use crate::renderer::{FrameStatus, Renderer, RendererConfig, RendererState};
use crate::scene::SceneDescriptor;
use crate::time::{FrameClock, FrameDecision, FrameLimiter, DEFAULT_FPS_CAP};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Frame-rate cap. `None` renders as fast as the present mode allows.
    pub fps_cap: Option<f32>,
    pub renderer: RendererConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Hello Triangle".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            fps_cap: Some(DEFAULT_FPS_CAP),
            renderer: RendererConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub(crate) fn limiter(&self) -> FrameLimiter {
        match self.fps_cap {
            Some(fps) => FrameLimiter::capped(fps),
            None => FrameLimiter::uncapped(),
        }
    }
}

/// Entry point for the windowed runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, builds a [`Renderer`] on it and draws until the
    /// window is closed.
    ///
    /// Returns an error if the renderer could not be created or failed
    /// fatally while running.
    pub fn run<B>(config: RuntimeConfig, settings: B::Settings, scene: SceneDescriptor) -> Result<()>
    where
        B: GraphicsBackend<Target = Arc<Window>> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::<B>::new(config, settings, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct WindowEntry<B: GraphicsBackend> {
    // Dropped first so the surface goes before the window.
    renderer: Renderer<B>,
    window: Arc<Window>,
    clock: FrameClock,
    limiter: FrameLimiter,
    wake_at: Option<Instant>,
}

struct AppState<B: GraphicsBackend> {
    config: RuntimeConfig,
    settings: B::Settings,
    scene: SceneDescriptor,

    entry: Option<WindowEntry<B>>,
    fatal: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<B> AppState<B>
where
    B: GraphicsBackend<Target = Arc<Window>>,
{
    fn new(config: RuntimeConfig, settings: B::Settings, scene: SceneDescriptor) -> Self {
        Self {
            config,
            settings,
            scene,
            entry: None,
            fatal: None,
            exit_requested: false,
        }
    }

    fn renderer_state(&self) -> RendererState {
        self.entry
            .as_ref()
            .map_or(RendererState::Uninitialized, |e| e.renderer.state())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal.get_or_insert(err);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            entry.renderer.destroy();
        }
        self.request_exit(event_loop);
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let extent = Extent::from(window.inner_size());
        let renderer = Renderer::<B>::new(
            window.clone(),
            extent,
            &self.scene,
            &self.settings,
            self.config.renderer.clone(),
        )
        .context("failed to initialize renderer")?;

        window.request_redraw();
        self.entry = Some(WindowEntry {
            renderer,
            window,
            clock: FrameClock::new(),
            limiter: self.config.limiter(),
            wake_at: None,
        });
        Ok(())
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop, size: PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        // Minimized windows report 0x0; nothing to draw into until restored.
        if size.width == 0 || size.height == 0 {
            log::debug!("window minimized; keeping swapchain at {:?}", entry.renderer.extent());
            return;
        }

        match entry.renderer.resize(size.width, size.height) {
            Ok(extent) => {
                log::debug!("resized to {}x{}", extent.width(), extent.height());
                entry.clock.reset();
                entry.window.request_redraw();
            }
            Err(e) if !e.is_fatal() => log::warn!("resize failed: {e}"),
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("resize failed")),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let now = Instant::now();
        match entry.limiter.poll(now) {
            FrameDecision::Wait { until } => {
                entry.wake_at = Some(until);
                return;
            }
            FrameDecision::Render { .. } => entry.wake_at = None,
        }

        let ft = entry.clock.tick_at(now);
        match entry.renderer.render(ft.dt_duration()) {
            Ok(FrameStatus::Presented { image_index }) => {
                log::trace!("frame {} presented on image {image_index}", ft.frame_index);
            }
            Ok(FrameStatus::Skipped) => log::debug!("frame {} skipped", ft.frame_index),
            Ok(FrameStatus::SwapchainRebuilt) => {
                log::debug!("frame {} dropped; swapchain rebuilt", ft.frame_index);
                entry.clock.reset();
            }
            Err(e) if !e.is_fatal() => log::warn!("frame {} failed: {e}", ft.frame_index),
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("render failed")),
        }
    }
}

impl<B> ApplicationHandler for AppState<B>
where
    B: GraphicsBackend<Target = Arc<Window>>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // Continuous redraw, paced by the limiter.
        match entry.wake_at {
            Some(until) if Instant::now() < until => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(until));
            }
            _ => {
                entry.wake_at = None;
                event_loop.set_control_flow(ControlFlow::Wait);
                entry.window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if self.entry.as_ref().is_none_or(|e| e.window.id() != window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.close(event_loop);
            }

            WindowEvent::Resized(new_size) => self.resize(event_loop, new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.window.inner_size()) {
                    self.resize(event_loop, size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            // Input is observed but drives nothing.
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                log::trace!("mouse {button:?} pressed={pressed}");
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(x, y) => log::trace!("wheel lines ({x}, {y})"),
                MouseScrollDelta::PixelDelta(p) => log::trace!("wheel pixels ({}, {})", p.x, p.y),
            },
            WindowEvent::CursorMoved { position, .. } => {
                log::trace!("cursor at ({:.1}, {:.1})", position.x, position.y);
            }

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::debug!("event loop exiting (renderer {})", self.renderer_state());
        if let Some(mut entry) = self.entry.take() {
            entry.renderer.destroy();
        }
    }
}
