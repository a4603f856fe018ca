//! Time subsystem.
//!
//! Frame timing lives here, outside the renderer:
//! - `FrameLimiter` decides *when* a frame should be rendered
//! - `FrameClock` measures *how much* time the rendered frame covers

mod frame_clock;
mod frame_limiter;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_limiter::{FrameDecision, FrameLimiter, DEFAULT_FPS_CAP};
