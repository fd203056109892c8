//! Freefall Lab - uniformly accelerated motion, visualized
//!
//! Core modules:
//! - `sim`: Simulation core (kinematics, state machine, per-frame visual sync)
//! - `driver`: Per-frame driver tying the core to telemetry and rendering
//! - `telemetry`: Readout formatting, tooltip content, output sinks
//! - `measurements`: Measurement log of telemetry snapshots
//! - `scene`: Static scene assets (ocean, cliff, ruler, laptop, sharks)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser bindings (DOM telemetry, controls, lifecycle)
//! - `config`: User-supplied simulation parameters

pub mod config;
pub mod driver;
pub mod measurements;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod sim;
pub mod telemetry;

pub use config::{ConfigKey, SimulationConfig};
pub use measurements::{LogEntry, MeasurementLog};

use glam::Vec3;

/// Simulation and scene constants
pub mod consts {
    /// Largest frame delta fed to the kinematics (s)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Fixed delta applied by the Step action (s)
    pub const STEP_DT: f32 = 0.1;
    /// Delta used for the very first frame, before a previous timestamp exists
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Horizontal position of the cliff's sea face
    pub const CLIFF_EDGE_X: f32 = -4.0;
    /// Horizontal drop position, measured from the cliff edge
    pub const DROP_OFFSET_X: f32 = 4.0;

    /// Tolerance before a height change restages an idle scene (m)
    pub const HEIGHT_RESET_TOLERANCE: f32 = 0.01;

    /// Trajectory samples kept per fall
    pub const TRAJECTORY_CAPACITY: usize = 1000;

    /// Splash particle count
    pub const SPLASH_PARTICLES: usize = 200;
    /// Splash opacity at the landing instant
    pub const SPLASH_OPACITY: f32 = 0.8;
    /// Opacity lost per second
    pub const SPLASH_FADE_RATE: f32 = 0.8;
    /// Downward acceleration applied to splash droplets (m/s²)
    pub const SPLASH_GRAVITY: f32 = 9.81;
    /// Horizontal launch speed spread (each axis in [-h/2, h/2))
    pub const SPLASH_SPREAD: f32 = 8.0;
    /// Upward launch speed range [0, v)
    pub const SPLASH_LIFT: f32 = 8.0;

    /// Decorative tumble rates (rad/s)
    pub const TUMBLE_RATE_X: f32 = 2.5;
    pub const TUMBLE_RATE_Z: f32 = 1.0;

    /// Velocity arrow only shows above this speed (m/s)
    pub const VELOCITY_ARROW_MIN_SPEED: f32 = 0.1;
    /// Velocity arrow length per m/s
    pub const VELOCITY_ARROW_SCALE: f32 = 0.2;
    pub const VELOCITY_ARROW_MAX_LENGTH: f32 = 10.0;
    pub const ACCELERATION_ARROW_LENGTH: f32 = 3.0;
    /// Sideways offset of each arrow from the object
    pub const ARROW_OFFSET_X: f32 = 1.5;
    pub const ARROW_HEAD_LENGTH: f32 = 1.0;
    pub const ARROW_HEAD_WIDTH: f32 = 0.5;

    /// Camera follow smoothing per frame (not time-scaled)
    pub const CAMERA_LERP: f32 = 0.1;
    /// Lowest height the camera tracks
    pub const CAMERA_MIN_TRACK_Y: f32 = 10.0;
    pub const CAMERA_OFFSET_X: f32 = 30.0;
    pub const CAMERA_OFFSET_Z: f32 = 50.0;
    pub const CAMERA_FOLLOW_RISE: f32 = 10.0;
    pub const CAMERA_LOOK_DROP: f32 = 5.0;
    pub const CAMERA_RESET_RISE: f32 = 15.0;
    /// Vertical field of view (degrees)
    pub const CAMERA_FOV_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;

    /// Tooltip anchor height above the object (m)
    pub const TOOLTIP_LIFT: f32 = 2.0;

    /// Decorative shark count and orbit parameters
    pub const SHARK_COUNT: usize = 6;
    pub const SHARK_ORBIT_CENTER_X: f32 = 5.0;
    pub const SHARK_MIN_SPEED: f32 = 0.03;
    pub const SHARK_SPEED_SPREAD: f32 = 0.04;
    pub const SHARK_MIN_RADIUS: f32 = 4.0;
    pub const SHARK_RADIUS_SPREAD: f32 = 8.0;
}

/// Linear interpolation between two points
#[inline]
pub fn lerp_vec3(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t
}

/// Point on a horizontal circle in the XZ plane
#[inline]
pub fn orbit_point(center_x: f32, radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(center_x + angle.cos() * radius, y, angle.sin() * radius)
}
