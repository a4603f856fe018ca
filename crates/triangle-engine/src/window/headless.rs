use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::backend::{GraphicsBackend, ResourceCounts};
use crate::coords::Extent;
use crate::renderer::{FrameStatus, Renderer, RendererConfig};
use crate::scene::SceneDescriptor;
use crate::time::{FrameClock, FrameDecision, FrameLimiter};

/// Summary of a windowless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub presented: u64,
    pub skipped: u64,
    pub swapchain_rebuilds: u64,
    /// Rotation angle after the last frame, in radians.
    pub final_angle: f32,
    pub elapsed: Duration,
    /// Live objects after `destroy`; empty unless something leaked.
    pub leaked: ResourceCounts,
}

/// Drives a [`Renderer`] for `frames` frames without a window.
///
/// `fps` caps the loop like the windowed runtime does; `None` runs flat out.
pub fn run_headless<B>(
    frames: u64,
    extent: Extent,
    settings: &B::Settings,
    scene: &SceneDescriptor,
    fps: Option<f32>,
) -> Result<HeadlessReport>
where
    B: GraphicsBackend<Target = ()>,
{
    let mut renderer = Renderer::<B>::new((), extent, scene, settings, RendererConfig::default())
        .context("failed to initialize renderer")?;

    let started = Instant::now();
    let mut limiter = match fps {
        Some(fps) => FrameLimiter::capped_at(fps, started),
        None => FrameLimiter::uncapped(),
    };
    let mut clock = FrameClock::starting_at(started);

    let (mut presented, mut skipped) = (0u64, 0u64);
    let mut attempted = 0u64;

    while attempted < frames {
        let now = Instant::now();
        if let FrameDecision::Wait { until } = limiter.poll(now) {
            std::thread::sleep(until.saturating_duration_since(now));
            continue;
        }

        let ft = clock.tick_at(now);
        attempted += 1;
        match renderer
            .render(ft.dt_duration())
            .with_context(|| format!("frame {} failed", ft.frame_index))?
        {
            FrameStatus::Presented { .. } => presented += 1,
            FrameStatus::Skipped | FrameStatus::SwapchainRebuilt => skipped += 1,
        }
    }

    let final_angle = renderer.rotation_angle();
    let swapchain_rebuilds = renderer.swapchain_rebuilds();
    renderer.destroy();

    let report = HeadlessReport {
        presented,
        skipped,
        swapchain_rebuilds,
        final_angle,
        elapsed: started.elapsed(),
        leaked: renderer.backend().resource_counts(),
    };
    log::info!(
        "headless run: {} presented, {} skipped in {:.2?}",
        report.presented,
        report.skipped,
        report.elapsed
    );
    Ok(report)
}
