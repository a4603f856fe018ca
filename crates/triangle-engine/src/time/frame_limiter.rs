use std::time::{Duration, Instant};

/// Frame rate the demo caps to unless told otherwise.
pub const DEFAULT_FPS_CAP: f32 = 60.0;

/// Outcome of asking the limiter whether a frame is due.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameDecision {
    /// Render now; `elapsed` is the time since the previous rendered frame.
    Render { elapsed: Duration },
    /// Too early; the next frame is due at `until`.
    Wait { until: Instant },
}

/// Frame-rate cap.
///
/// The limiter only decides; it never sleeps. The event loop turns
/// `FrameDecision::Wait` into `ControlFlow::WaitUntil`.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    min_interval: Option<Duration>,
    last: Instant,
}

impl FrameLimiter {
    /// Caps to `fps` frames per second.
    ///
    /// Non-positive or non-finite values disable the cap, as does a rate so
    /// low that its frame interval does not fit a `Duration`.
    pub fn capped(fps: f32) -> Self {
        Self::capped_at(fps, Instant::now())
    }

    /// Like [`capped`](Self::capped) with an explicit baseline.
    pub fn capped_at(fps: f32, start: Instant) -> Self {
        let min_interval = if fps.is_finite() && fps > 0.0 {
            Duration::try_from_secs_f32(fps.recip()).ok()
        } else {
            None
        };
        if min_interval.is_none() {
            log::debug!("frame cap {fps} disabled");
        }
        Self {
            min_interval,
            last: start,
        }
    }

    pub fn uncapped() -> Self {
        Self {
            min_interval: None,
            last: Instant::now(),
        }
    }

    #[inline]
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }

    /// Decides whether a frame should be rendered at `now`.
    ///
    /// A `Render` decision moves the baseline to `now`.
    pub fn poll(&mut self, now: Instant) -> FrameDecision {
        let elapsed = now.saturating_duration_since(self.last);

        if let Some(interval) = self.min_interval {
            if elapsed < interval {
                return FrameDecision::Wait {
                    until: self.last + interval,
                };
            }
        }

        self.last = now;
        FrameDecision::Render { elapsed }
    }
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::capped(DEFAULT_FPS_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn waits_until_interval_elapsed() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::capped_at(60.0, start);

        match limiter.poll(start + ms(5)) {
            FrameDecision::Wait { until } => {
                let interval = limiter.min_interval().unwrap();
                assert_eq!(until, start + interval);
            }
            other => panic!("expected wait, got {other:?}"),
        }
    }

    #[test]
    fn renders_after_interval_and_moves_baseline() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::capped_at(60.0, start);

        assert_eq!(
            limiter.poll(start + ms(17)),
            FrameDecision::Render { elapsed: ms(17) }
        );
        // Baseline moved: 5 ms later is too early again.
        assert!(matches!(limiter.poll(start + ms(22)), FrameDecision::Wait { .. }));
        assert_eq!(
            limiter.poll(start + ms(40)),
            FrameDecision::Render { elapsed: ms(23) }
        );
    }

    #[test]
    fn at_most_sixty_frames_per_second() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::capped_at(60.0, start);
        let rendered = (1..=1000u64)
            .filter(|i| matches!(limiter.poll(start + ms(*i)), FrameDecision::Render { .. }))
            .count();
        assert!(rendered <= 60, "{rendered}");
        assert!(rendered >= 55, "{rendered}");
    }

    #[test]
    fn uncapped_always_renders() {
        let mut limiter = FrameLimiter::uncapped();
        let now = Instant::now();
        for _ in 0..10 {
            assert!(matches!(limiter.poll(now), FrameDecision::Render { .. }));
        }
    }

    #[test]
    fn zero_fps_means_uncapped() {
        assert!(FrameLimiter::capped(0.0).min_interval().is_none());
        assert!(FrameLimiter::capped(f32::INFINITY).min_interval().is_none());
    }

    #[test]
    fn unrepresentable_interval_means_uncapped() {
        let mut limiter = FrameLimiter::capped(1e-20);
        assert!(limiter.min_interval().is_none());
        assert!(matches!(limiter.poll(Instant::now()), FrameDecision::Render { .. }));

        assert!(FrameLimiter::capped(f32::MIN_POSITIVE).min_interval().is_none());
        assert!(FrameLimiter::capped(f32::NAN).min_interval().is_none());
    }

    #[test]
    fn one_frame_per_second_is_still_capped() {
        let interval = FrameLimiter::capped(1.0).min_interval();
        assert_eq!(interval, Some(Duration::from_secs(1)));
    }
}
