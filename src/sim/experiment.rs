//! The single owned record behind the scene
//!
//! Bundles the physics state with everything the frame loop keeps in sync
//! with it. Nothing here is observable; readers take snapshots.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::{CameraRig, Viewport};
use super::indicators::{Indicators, ObjectPose};
use super::kinematics::{self, Landing};
use super::splash::Splash;
use super::state::{SimPhase, SimState};
use super::tooltip::Tooltip;
use super::trajectory::Trajectory;
use crate::config::SimulationConfig;
use crate::consts::HEIGHT_RESET_TOLERANCE;

pub struct Experiment {
    pub state: SimState,
    pub trajectory: Trajectory,
    pub splash: Splash,
    pub pose: ObjectPose,
    pub indicators: Indicators,
    pub camera: CameraRig,
    /// Tooltip placement for the current frame
    pub tooltip: Option<Tooltip>,
    config: SimulationConfig,
    rng: Pcg32,
    /// Bumped on every reset; the cliff is rebuilt when it changes
    stage_revision: u64,
    trajectory_full_logged: bool,
}

impl Experiment {
    /// Build and stage the scene for `config`
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = SimState::new(&config, &mut rng);
        let mut lab = Self {
            state,
            trajectory: Trajectory::new(),
            splash: Splash::new(),
            pose: ObjectPose::default(),
            indicators: Indicators::default(),
            camera: CameraRig::default(),
            tooltip: None,
            config,
            rng,
            stage_revision: 0,
            trajectory_full_logged: false,
        };
        lab.reset();
        lab
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> SimPhase {
        self.state.phase()
    }

    pub fn stage_revision(&self) -> u64 {
        self.stage_revision
    }

    /// Back to Idle at the configured height
    ///
    /// Clears the trail and splash, zeroes the tumble, snaps the camera and
    /// hides the tooltip.
    pub fn reset(&mut self) {
        self.state.restage(&self.config);
        self.trajectory.clear();
        self.trajectory_full_logged = false;
        self.splash.clear();
        self.pose.rotation = glam::Vec3::ZERO;
        self.pose.position = self.state.object_pos();
        self.camera.snap(self.state.drop_x, self.state.y0);
        self.tooltip = None;
        self.stage_revision += 1;
        log::info!(
            "Scene staged: y0 = {:.1} m, g = {:.2} m/s²",
            self.state.y0,
            self.state.g
        );
    }

    /// React to a config change
    ///
    /// Gravity and mass apply at once, even mid-fall. A height change only
    /// restages the scene while nothing is running; mid-fall it waits for the
    /// next reset. Returns whether the scene was restaged.
    pub fn apply_config(&mut self, config: SimulationConfig) -> bool {
        self.config = config;
        self.state.g = config.gravity;
        self.state.mass = config.mass;

        if !self.state.running && (self.state.y0 - config.height).abs() > HEIGHT_RESET_TOLERANCE {
            self.reset();
            return true;
        }
        false
    }

    /// Advance the fall by `dt`, tumbling the object and splashing on landing
    pub fn advance(&mut self, dt: f32) -> Option<Landing> {
        self.pose.tumble(dt);
        let landing = kinematics::advance(&mut self.state, dt);
        if let Some(l) = landing {
            let origin = glam::Vec3::new(self.state.drop_x, 0.0, 0.0);
            self.splash.trigger(origin, &mut self.rng);
            log::info!("Landed at t = {:.3} s, v = {:.2} m/s", l.t, l.v);
        }
        landing
    }

    /// Record a trail sample if the fall is live and the buffer has room
    pub(crate) fn record_trajectory(&mut self) -> Option<usize> {
        if !self.state.running || self.state.finished {
            return None;
        }
        let written = self.trajectory.record(self.state.object_pos());
        if written.is_none() && !self.trajectory_full_logged {
            log::debug!("Trajectory buffer full ({} samples)", self.trajectory.capacity());
            self.trajectory_full_logged = true;
        }
        written
    }

    /// Tooltip visibility and screen placement for this frame
    pub fn place_tooltip(&mut self, viewport: Viewport) {
        self.tooltip = Tooltip::place(&self.state, self.pose.position, &self.camera, viewport);
    }
}
