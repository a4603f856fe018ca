use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    #[inline]
    pub fn dt_duration(&self) -> Duration {
        Duration::from_secs_f32(self.dt)
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per window, so that delta-time state is never shared.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms to 250 ms).
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    /// Moves the baseline to now without producing a frame.
    ///
    /// Called by the runtime after a resize or swapchain rebuild; the time
    /// spent there is not animated.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_increments() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let a = clock.tick_at(start + Duration::from_millis(16));
        let b = clock.tick_at(start + Duration::from_millis(32));
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn dt_is_measured_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start + Duration::from_millis(20));
        assert!((ft.dt - 0.020).abs() < 1e-6);
    }

    #[test]
    fn dt_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let stall = clock.tick_at(start + Duration::from_secs(5));
        assert!((stall.dt - 0.25).abs() < 1e-6);
        let burst = clock.tick_at(stall.now);
        assert!((burst.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn reset_discards_the_stall() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(16));

        // 200 ms spent rebuilding the swapchain.
        clock.reset_at(start + Duration::from_millis(216));
        let ft = clock.tick_at(start + Duration::from_millis(232));
        assert!((ft.dt - 0.016).abs() < 1e-6, "{}", ft.dt);
        assert_eq!(ft.frame_index, 1);
    }
}
