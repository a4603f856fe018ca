use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use crate::scene::Animation;

/// Rotation angle accumulator.
///
/// The angle is kept in `[0, 2π)`; it is the only state carried from one frame
/// to the next.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    axis: Vec3,
    speed: f32,
    angle: f32,
}

impl Rotation {
    pub fn new(animation: Animation) -> Self {
        let axis = animation.axis.try_normalize().unwrap_or(Vec3::Y);
        Self {
            axis,
            speed: animation.speed,
            angle: 0.0,
        }
    }

    /// Current angle in radians.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances by `dt_secs` of elapsed time and returns the new angle.
    pub fn advance(&mut self, dt_secs: f32) -> f32 {
        if dt_secs.is_finite() && dt_secs > 0.0 {
            let next = (self.angle + dt_secs * self.speed).rem_euclid(TAU);
            // rem_euclid can round up to exactly TAU for tiny negative inputs.
            self.angle = if next >= TAU { 0.0 } else { next };
        }
        self.angle
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_axis_angle(self.axis, self.angle)
    }
}
