//! Object pose and the two direction arrows drawn beside it

use glam::{Mat4, Quat, Vec3};

use super::state::SimState;
use crate::consts::*;

/// Transform of the falling object
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectPose {
    pub position: Vec3,
    /// Euler angles (x, y, z), radians
    pub rotation: Vec3,
}

impl ObjectPose {
    /// Decorative tumble for `dt` seconds of fall
    pub fn tumble(&mut self, dt: f32) {
        self.rotation.x += dt * TUMBLE_RATE_X;
        self.rotation.z += dt * TUMBLE_RATE_Z;
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rot, self.position)
    }
}

/// A straight-down arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub visible: bool,
    /// Tail position
    pub origin: Vec3,
    /// Total length including the head
    pub length: f32,
    pub head_length: f32,
    pub head_width: f32,
}

impl Arrow {
    fn hidden() -> Self {
        Self {
            visible: false,
            origin: Vec3::ZERO,
            length: 1.0,
            head_length: ARROW_HEAD_LENGTH,
            head_width: ARROW_HEAD_WIDTH,
        }
    }

    /// Arrows always point down
    pub const DIRECTION: Vec3 = Vec3::NEG_Y;

    pub fn tip(&self) -> Vec3 {
        self.origin + Self::DIRECTION * self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub velocity: Arrow,
    pub acceleration: Arrow,
}

impl Default for Indicators {
    fn default() -> Self {
        Self {
            velocity: Arrow::hidden(),
            acceleration: Arrow::hidden(),
        }
    }
}

impl Indicators {
    /// Re-derive both arrows from the state and the object's position
    pub fn update(&mut self, state: &SimState, origin: Vec3) {
        if state.v > VELOCITY_ARROW_MIN_SPEED {
            self.velocity.visible = true;
            self.velocity.origin = origin + Vec3::X * ARROW_OFFSET_X;
            self.velocity.length = (state.v * VELOCITY_ARROW_SCALE).min(VELOCITY_ARROW_MAX_LENGTH);
        } else {
            self.velocity.visible = false;
        }

        if !state.finished {
            self.acceleration.visible = true;
            self.acceleration.origin = origin - Vec3::X * ARROW_OFFSET_X;
            self.acceleration.length = ACCELERATION_ARROW_LENGTH;
        } else {
            self.acceleration.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> SimState {
        SimState::new(&SimulationConfig::default(), &mut Pcg32::seed_from_u64(0))
    }

    #[test]
    fn test_velocity_arrow_hidden_at_rest() {
        let mut ind = Indicators::default();
        let s = state();
        ind.update(&s, s.object_pos());
        assert!(!ind.velocity.visible);
        assert!(ind.acceleration.visible);
        assert_eq!(ind.acceleration.length, 3.0);
        assert_eq!(ind.acceleration.origin, Vec3::new(-1.5, 60.0, 0.0));
    }

    #[test]
    fn test_velocity_arrow_length_is_capped() {
        let mut ind = Indicators::default();
        let mut s = state();
        s.v = 20.0;
        ind.update(&s, s.object_pos());
        assert!(ind.velocity.visible);
        assert!((ind.velocity.length - 4.0).abs() < 1e-5);
        assert_eq!(ind.velocity.origin.x, 1.5);

        s.v = 200.0;
        ind.update(&s, s.object_pos());
        assert_eq!(ind.velocity.length, 10.0);
        assert_eq!(ind.velocity.tip().y, s.y - 10.0);
    }

    #[test]
    fn test_acceleration_arrow_hidden_after_landing() {
        let mut ind = Indicators::default();
        let mut s = state();
        s.finished = true;
        ind.update(&s, s.object_pos());
        assert!(!ind.acceleration.visible);
    }

    #[test]
    fn test_tumble_accumulates() {
        let mut pose = ObjectPose::default();
        pose.tumble(0.1);
        pose.tumble(0.1);
        assert!((pose.rotation.x - 0.5).abs() < 1e-6);
        assert!((pose.rotation.z - 0.2).abs() < 1e-6);
        assert_eq!(pose.rotation.y, 0.0);
    }
}
