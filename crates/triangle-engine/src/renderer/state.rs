use std::fmt;

/// Lifecycle state of a [`Renderer`](super::Renderer).
///
/// ```text
/// Uninitialized -> Initialized -> Ready <-> Resizing
///                                   |
///                                   +-> Failed
/// (any) -> Destroyed
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RendererState {
    /// No backend exists yet.
    Uninitialized,
    /// Backend objects exist; no swapchain has been built.
    Initialized,
    /// Swapchain built; frames may be rendered.
    Ready,
    /// Swapchain is being torn down and rebuilt.
    Resizing,
    /// A fatal error was observed. Only `destroy` is accepted.
    Failed,
    /// All resources released.
    Destroyed,
}

impl fmt::Display for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Ready => "ready",
            Self::Resizing => "resizing",
            Self::Failed => "failed",
            Self::Destroyed => "destroyed",
        };
        f.write_str(s)
    }
}

/// Result of one [`Renderer::render`](super::Renderer::render) call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Frame drawn into back buffer `image_index` and presented.
    Presented { image_index: u32 },
    /// No back buffer was available; nothing was drawn.
    Skipped,
    /// The swapchain was stale and has been rebuilt; this frame was dropped.
    SwapchainRebuilt,
}

impl FrameStatus {
    pub fn presented(self) -> bool {
        matches!(self, Self::Presented { .. })
    }
}
