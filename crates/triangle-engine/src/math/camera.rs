use glam::Mat4;

use crate::coords::Extent;
use crate::scene::CameraDesc;

/// Right-handed perspective camera with a `[0, 1]` depth range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    desc: CameraDesc,
}

impl Camera {
    pub fn new(desc: CameraDesc) -> Self {
        debug_assert!(desc.fov_y_degrees > 0.0 && desc.fov_y_degrees < 180.0);
        debug_assert!(desc.z_near > 0.0 && desc.z_far > desc.z_near);
        Self { desc }
    }

    #[inline]
    pub fn fov_y_radians(&self) -> f32 {
        self.desc.fov_y_degrees.to_radians()
    }

    pub fn projection(&self, extent: Extent) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_radians(),
            extent.aspect_ratio(),
            self.desc.z_near,
            self.desc.z_far,
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(self.desc.eye_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn camera() -> Camera {
        Camera::new(CameraDesc::default())
    }

    #[test]
    fn projection_encodes_aspect_and_fov() {
        let cam = camera();
        for (w, h) in [(1, 1), (1280, 720), (640, 480), (1, 65_535), (65_535, 1)] {
            let extent = Extent::clamped(w, h);
            let p = cam.projection(extent);
            let half = (cam.fov_y_radians() * 0.5).tan();

            assert!((p.y_axis.y * half - 1.0).abs() < EPS, "{w}x{h}");
            let rel = p.x_axis.x * extent.aspect_ratio() * half - 1.0;
            assert!(rel.abs() < 1e-4, "{w}x{h}: {rel}");
        }
    }

    #[test]
    fn view_is_pure_translation() {
        let v = camera().view();
        assert_eq!(v.w_axis.truncate(), glam::Vec3::new(0.0, 0.0, -2.5));
        assert_eq!(v.x_axis, glam::Vec4::X);
        assert_eq!(v.y_axis, glam::Vec4::Y);
        assert_eq!(v.z_axis, glam::Vec4::Z);
    }

    #[test]
    fn default_fov_is_sixty_degrees() {
        assert!((camera().fov_y_radians() - std::f32::consts::FRAC_PI_3).abs() < EPS);
    }
}
