//! Renderer error taxonomy.
//!
//! Every lifecycle operation returns [`RendererResult`]. Callers branch on
//! [`RendererError::kind`] to decide between rebuilding the swapchain and
//! tearing the renderer down.

use std::path::PathBuf;

use crate::renderer::RendererState;

pub type RendererResult<T> = Result<T, RendererError>;

/// Coarse classification of a [`RendererError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Construction could not complete; no usable renderer exists.
    FatalInitialization,
    /// The swapchain no longer matches the surface; rebuild and retry.
    RecoverableSwapchainStale,
    /// The device went away mid-frame.
    FatalDeviceLost,
    /// GPU allocation failed.
    FatalResource,
    /// An operation was called in a state that does not allow it.
    Usage,
}

#[derive(thiserror::Error, Debug)]
pub enum RendererError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("failed to read shader {}: {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("swapchain is out of date")]
    SwapchainStale,

    #[error("device lost: {0}")]
    DeviceLost(String),

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("cannot {op} while renderer is {state}")]
    InvalidState {
        op: &'static str,
        state: RendererState,
    },
}

impl RendererError {
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    pub fn shader_compile(msg: impl Into<String>) -> Self {
        Self::ShaderCompile(msg.into())
    }

    pub fn device_lost(msg: impl Into<String>) -> Self {
        Self::DeviceLost(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Initialization(_) | Self::ShaderLoad { .. } | Self::ShaderCompile(_) => {
                ErrorKind::FatalInitialization
            }
            Self::SwapchainStale => ErrorKind::RecoverableSwapchainStale,
            Self::DeviceLost(_) => ErrorKind::FatalDeviceLost,
            Self::OutOfMemory => ErrorKind::FatalResource,
            Self::InvalidState { .. } => ErrorKind::Usage,
        }
    }

    /// Only a stale swapchain can be fixed by the renderer itself.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::RecoverableSwapchainStale
    }

    /// Errors after which the renderer must not be used for drawing again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::FatalInitialization | ErrorKind::FatalDeviceLost | ErrorKind::FatalResource
        )
    }
}
