/// Renderer policy knobs that do not depend on the backend.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Rebuild the swapchain when the backend reports it stale.
    ///
    /// When disabled the stale error is returned to the caller, which is then
    /// expected to call `resize` itself.
    pub rebuild_on_stale: bool,

    /// After a rebuild, draw the frame again instead of dropping it.
    pub redraw_after_rebuild: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            rebuild_on_stale: true,
            redraw_after_rebuild: false,
        }
    }
}
