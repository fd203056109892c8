//! Follow camera
//!
//! Tracks a floor-clamped copy of the object height with a fixed per-frame
//! smoothing factor, so responsiveness depends on frame rate.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::*;
use crate::lerp_vec3;

/// Size of the view in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(CAMERA_OFFSET_X, CAMERA_RESET_RISE, CAMERA_OFFSET_Z),
            look_at: Vec3::ZERO,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            aspect: 16.0 / 9.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl CameraRig {
    /// Frame the drop origin immediately, no smoothing
    pub fn snap(&mut self, drop_x: f32, y0: f32) {
        self.position = Vec3::new(drop_x + CAMERA_OFFSET_X, y0 + CAMERA_RESET_RISE, CAMERA_OFFSET_Z);
        self.look_at = Vec3::new(drop_x, y0, 0.0);
    }

    /// Ease one frame toward the framing for height `y`
    pub fn follow(&mut self, drop_x: f32, y: f32) {
        let cam_y = y.max(CAMERA_MIN_TRACK_Y);
        let target = Vec3::new(
            drop_x + CAMERA_OFFSET_X,
            cam_y + CAMERA_FOLLOW_RISE,
            CAMERA_OFFSET_Z,
        );
        self.position = lerp_vec3(self.position, target, CAMERA_LERP);
        self.look_at = Vec3::new(drop_x, cam_y - CAMERA_LOOK_DROP, 0.0);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to screen pixels (origin top-left)
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Vec2 {
        let ndc = self.view_projection().project_point3(world);
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.width,
            (-(ndc.y * 0.5) + 0.5) * viewport.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_frames_drop_origin() {
        let mut cam = CameraRig::default();
        cam.snap(0.0, 60.0);
        assert_eq!(cam.position, Vec3::new(30.0, 75.0, 50.0));
        assert_eq!(cam.look_at, Vec3::new(0.0, 60.0, 0.0));
    }

    #[test]
    fn test_follow_moves_a_tenth_per_frame() {
        let mut cam = CameraRig::default();
        cam.snap(0.0, 60.0);
        cam.follow(0.0, 40.0);
        // target y = 50, from 75: 75 + (50 - 75) * 0.1
        assert!((cam.position.y - 72.5).abs() < 1e-4);
        assert_eq!(cam.look_at.y, 35.0);
    }

    #[test]
    fn test_follow_is_floor_clamped() {
        let mut cam = CameraRig::default();
        for _ in 0..500 {
            cam.follow(0.0, 0.0);
        }
        assert!((cam.position.y - 20.0).abs() < 1e-3);
        assert_eq!(cam.look_at.y, 5.0);
    }

    #[test]
    fn test_look_at_point_projects_to_screen_centre() {
        let mut cam = CameraRig::default();
        cam.snap(0.0, 60.0);
        let vp = Viewport::new(800.0, 600.0);
        cam.set_viewport(vp);
        let p = cam.project(Vec3::new(0.0, 60.0, 0.0), vp);
        assert!((p.x - 400.0).abs() < 0.5);
        assert!((p.y - 300.0).abs() < 0.5);

        // Higher in the world is higher on screen
        let above = cam.project(Vec3::new(0.0, 62.0, 0.0), vp);
        assert!(above.y < p.y);
    }
}
