use crate::coords::Extent;
use crate::error::RendererError;

/// sRGB formats tried in order before settling for whatever the surface lists first.
const SRGB_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

/// `None` when the surface cannot be presented to by this adapter.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let srgb = SRGB_FORMATS
        .into_iter()
        .filter(|_| prefer_srgb)
        .find(|f| caps.formats.contains(f));
    srgb.or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if caps.alpha_modes.contains(&mode) => mode,
        _ => caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

/// Fits `extent` into the device's 2D texture limit.
///
/// Returns the extent to configure and whether anything was cut.
pub(crate) fn fit_to_device(extent: Extent, max_dim: u32) -> (Extent, bool) {
    let (w, h) = (extent.width(), extent.height());
    let fitted = Extent::clamped(w.min(max_dim), h.min(max_dim));
    (fitted, fitted != extent)
}

/// Falls back to FIFO, which every surface supports.
pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if caps.present_modes.contains(&requested) {
        requested
    } else {
        log::warn!("present mode {requested:?} unsupported, using Fifo");
        wgpu::PresentMode::Fifo
    }
}

/// What to do with a frame whose back buffer could not be acquired.
#[derive(Debug)]
pub(crate) enum AcquireFailure {
    /// Drop this frame and try again next time.
    Skip,
    /// Surface the error to the renderer.
    Fail(RendererError),
}

pub(crate) fn map_surface_error(err: wgpu::SurfaceError) -> AcquireFailure {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            AcquireFailure::Fail(RendererError::SwapchainStale)
        }
        wgpu::SurfaceError::OutOfMemory => AcquireFailure::Fail(RendererError::OutOfMemory),
        wgpu::SurfaceError::Timeout => AcquireFailure::Skip,
        wgpu::SurfaceError::Other => AcquireFailure::Skip,
    }
}
