//! Simulation state and the decorative agents that share it
//!
//! `SimState` is the only record the physics touches. It is owned by a single
//! writer (the frame loop and the action dispatcher) and read by telemetry.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::consts::*;
use crate::orbit_point;
use glam::Vec3;

/// Observable phase of the drop, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Object resting at the top, waiting for Start or Step
    Idle,
    /// Time is advancing
    Falling,
    /// Mid-fall, time frozen
    Paused,
    /// Object reached the water
    Landed,
}

/// A decorative shark circling below the cliff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shark {
    /// Current orbit angle (radians)
    pub angle: f32,
    /// Angle added every frame (radians/frame)
    pub angular_speed: f32,
    /// Orbit radius (m)
    pub radius: f32,
    /// Orbit centre along x
    pub center_x: f32,
    /// Swim depth (m, negative is under water)
    pub depth: f32,
    /// Current world position
    pub pos: Vec3,
}

impl Shark {
    /// Random orbit around the splash zone
    pub fn random(rng: &mut Pcg32) -> Self {
        let start = Vec3::new(
            (rng.random::<f32>() - 0.5) * 15.0 + 5.0,
            -0.5 - rng.random::<f32>(),
            (rng.random::<f32>() - 0.5) * 15.0,
        );
        Self {
            angle: rng.random::<f32>() * std::f32::consts::TAU,
            angular_speed: SHARK_MIN_SPEED + rng.random::<f32>() * SHARK_SPEED_SPREAD,
            radius: SHARK_MIN_RADIUS + rng.random::<f32>() * SHARK_RADIUS_SPREAD,
            center_x: SHARK_ORBIT_CENTER_X,
            depth: start.y,
            pos: start,
        }
    }

    /// Advance one frame along the orbit
    pub fn swim(&mut self) {
        self.angle += self.angular_speed;
        self.pos = orbit_point(self.center_x, self.radius, self.angle, self.depth);
    }

    /// Heading around the vertical axis
    #[inline]
    pub fn heading(&self) -> f32 {
        -self.angle
    }
}

/// Free-fall state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Elapsed simulation time (s)
    pub t: f32,
    /// Drop origin height (m)
    pub y0: f32,
    /// Current height (m), always within [0, y0]
    pub y: f32,
    /// Downward speed (m/s), never negative
    pub v: f32,
    /// Active gravity (m/s²)
    pub g: f32,
    /// Carried for display, unused by the kinematics
    pub mass: f32,
    pub running: bool,
    pub paused: bool,
    pub finished: bool,
    /// Horizontal drop position
    pub drop_x: f32,
    /// Horizontal position of the cliff face
    pub cliff_edge_x: f32,
    /// Decorative agents
    pub sharks: Vec<Shark>,
}

impl SimState {
    /// Fresh idle state staged for `config`
    pub fn new(config: &SimulationConfig, rng: &mut Pcg32) -> Self {
        let cliff_edge_x = CLIFF_EDGE_X;
        let sharks = (0..SHARK_COUNT).map(|_| Shark::random(rng)).collect();
        Self {
            t: 0.0,
            y0: config.height,
            y: config.height,
            v: 0.0,
            g: config.gravity,
            mass: config.mass,
            running: false,
            paused: false,
            finished: false,
            drop_x: cliff_edge_x + DROP_OFFSET_X,
            cliff_edge_x,
            sharks,
        }
    }

    /// Current state-machine phase
    pub fn phase(&self) -> SimPhase {
        if self.finished {
            SimPhase::Landed
        } else if !self.running {
            SimPhase::Idle
        } else if self.paused {
            SimPhase::Paused
        } else {
            SimPhase::Falling
        }
    }

    /// Whether time should advance this frame
    #[inline]
    pub fn is_advancing(&self) -> bool {
        self.running && !self.paused
    }

    /// Restage at the top: t=0, y=y0, v=0, all flags cleared
    ///
    /// Sharks and placement constants are kept.
    pub fn restage(&mut self, config: &SimulationConfig) {
        self.running = false;
        self.paused = false;
        self.finished = false;
        self.t = 0.0;
        self.y0 = config.height;
        self.y = config.height;
        self.v = 0.0;
        self.g = config.gravity;
    }

    /// World position of the falling object
    #[inline]
    pub fn object_pos(&self) -> Vec3 {
        Vec3::new(self.drop_x, self.y, 0.0)
    }
}
