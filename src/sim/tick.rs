//! Per-frame simulation and visual-sync step
//!
//! Covers everything a frame does before telemetry and rendering: advancing
//! the fall, syncing the object transform, the trail, the arrows, the splash,
//! the sharks and the camera.

use super::experiment::Experiment;
use super::kinematics::Landing;
use crate::consts::MAX_FRAME_DT;

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Delta actually applied after clamping
    pub dt: f32,
    /// Set on the frame the object hits the water
    pub landing: Option<Landing>,
    /// Index of the trail sample written this frame
    pub trajectory_sample: Option<usize>,
}

/// Run one frame of the simulation with a raw frame delta
pub fn tick(lab: &mut Experiment, raw_dt: f32) -> TickReport {
    // Bound the step across frame hitches
    let dt = raw_dt.clamp(0.0, MAX_FRAME_DT);
    let mut report = TickReport {
        dt,
        ..Default::default()
    };

    if lab.state.is_advancing() {
        report.landing = lab.advance(dt);
    }

    lab.pose.position = lab.state.object_pos();

    report.trajectory_sample = lab.record_trajectory();

    let origin = lab.pose.position;
    lab.indicators.update(&lab.state, origin);

    lab.splash.update(dt);

    for shark in &mut lab.state.sharks {
        shark.swim();
    }

    lab.camera.follow(lab.state.drop_x, lab.state.y);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::consts::TRAJECTORY_CAPACITY;
    use crate::sim::SimPhase;

    fn lab() -> Experiment {
        Experiment::new(SimulationConfig::default(), 12345)
    }

    #[test]
    fn test_idle_frames_do_not_advance() {
        let mut lab = lab();
        for _ in 0..10 {
            tick(&mut lab, 1.0 / 60.0);
        }
        assert_eq!(lab.state.t, 0.0);
        assert_eq!(lab.state.y, 60.0);
        assert!(lab.trajectory.is_empty());
        // Idle visuals keep moving
        assert!(lab.indicators.acceleration.visible);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut lab = lab();
        lab.state.running = true;
        let report = tick(&mut lab, 2.0);
        assert_eq!(report.dt, 0.1);
        assert!((lab.state.t - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_falling_records_trail_and_tumbles() {
        let mut lab = lab();
        lab.state.running = true;
        let report = tick(&mut lab, 0.05);
        assert_eq!(report.trajectory_sample, Some(0));
        assert_eq!(lab.trajectory.points()[0].y, lab.state.y);
        assert!(lab.pose.rotation.x > 0.0);
        assert_eq!(lab.pose.position, lab.state.object_pos());
    }

    #[test]
    fn test_paused_frames_freeze_time() {
        let mut lab = lab();
        lab.state.running = true;
        tick(&mut lab, 0.05);
        lab.state.paused = true;
        let (t, y, rot) = (lab.state.t, lab.state.y, lab.pose.rotation);
        tick(&mut lab, 0.05);
        assert_eq!(lab.state.t, t);
        assert_eq!(lab.state.y, y);
        assert_eq!(lab.pose.rotation, rot);
    }

    #[test]
    fn test_full_drop_lands_and_splashes() {
        let mut lab = lab();
        lab.state.running = true;
        let mut landed_on = None;
        for frame in 0..600 {
            let report = tick(&mut lab, 1.0 / 60.0);
            if report.landing.is_some() {
                landed_on = Some(frame);
                // No trail sample on the landing frame
                assert!(report.trajectory_sample.is_none());
                break;
            }
        }
        assert!(landed_on.is_some());
        assert_eq!(lab.phase(), SimPhase::Landed);
        assert_eq!(lab.state.y, 0.0);
        assert!(lab.splash.is_active());
        assert!(!lab.indicators.acceleration.visible);

        // Splash fades out over the following second
        for _ in 0..70 {
            tick(&mut lab, 1.0 / 60.0);
        }
        assert!(!lab.splash.is_active());
    }

    #[test]
    fn test_trail_stops_at_capacity() {
        let mut lab = lab();
        lab.state.running = true;
        lab.state.paused = true;
        // Paused but running still samples every frame
        for _ in 0..(TRAJECTORY_CAPACITY + 100) {
            tick(&mut lab, 1.0 / 60.0);
        }
        assert_eq!(lab.trajectory.len(), TRAJECTORY_CAPACITY);
    }

    #[test]
    fn test_camera_eases_toward_object() {
        let mut lab = lab();
        lab.state.running = true;
        let start = lab.camera.position.y;
        for _ in 0..60 {
            tick(&mut lab, 1.0 / 60.0);
        }
        assert!(lab.camera.position.y < start);
        assert!(lab.camera.position.y > lab.state.y);
    }

    #[test]
    fn test_sharks_keep_swimming_when_idle() {
        let mut lab = lab();
        let before: Vec<f32> = lab.state.sharks.iter().map(|s| s.angle).collect();
        tick(&mut lab, 1.0 / 60.0);
        for (shark, old) in lab.state.sharks.iter().zip(before) {
            assert!((shark.angle - old - shark.angular_speed).abs() < 1e-6);
        }
    }
}
