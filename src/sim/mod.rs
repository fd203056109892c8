//! Simulation core
//!
//! All physics and visual-sync logic lives here. This module stays free of
//! rendering and platform dependencies:
//! - Closed-form kinematics, recomputed from absolute time
//! - A single owned mutable record (`Experiment`), one writer at a time
//! - Seeded RNG only, for decorative randomness

pub mod action;
pub mod camera;
pub mod experiment;
pub mod indicators;
pub mod kinematics;
pub mod splash;
pub mod state;
pub mod tick;
pub mod tooltip;
pub mod trajectory;

pub use action::{Action, ActionEvent, ActionTrigger, Dispatcher};
pub use camera::{CameraRig, Viewport};
pub use experiment::Experiment;
pub use indicators::{Arrow, Indicators, ObjectPose};
pub use kinematics::{Landing, advance, height_at, time_to_land, velocity_at};
pub use splash::{Droplet, Splash};
pub use state::{Shark, SimPhase, SimState};
pub use tick::{TickReport, tick};
pub use tooltip::Tooltip;
pub use trajectory::Trajectory;
