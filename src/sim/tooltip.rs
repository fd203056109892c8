//! Info overlay pinned above the object while paused or after landing

use glam::{Vec2, Vec3};

use super::camera::{CameraRig, Viewport};
use super::state::{SimPhase, SimState};
use crate::consts::TOOLTIP_LIFT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tooltip {
    pub title: &'static str,
    pub body: &'static str,
    /// Anchor in screen pixels
    pub screen: Vec2,
}

impl Tooltip {
    /// Title and body for the current phase, if the tooltip should show
    pub fn content(state: &SimState) -> Option<(&'static str, &'static str)> {
        match state.phase() {
            SimPhase::Landed => Some(("SPLASH!", "Experiment finished.")),
            SimPhase::Paused => Some(("PAUSED", "Record data in the log.")),
            SimPhase::Idle | SimPhase::Falling => None,
        }
    }

    /// Place the tooltip for this frame, or `None` when hidden
    pub fn place(
        state: &SimState,
        object_pos: Vec3,
        camera: &CameraRig,
        viewport: Viewport,
    ) -> Option<Self> {
        let (title, body) = Self::content(state)?;
        let anchor = object_pos + Vec3::Y * TOOLTIP_LIFT;
        Some(Self {
            title,
            body,
            screen: camera.project(anchor, viewport),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_visible_only_when_paused_or_landed() {
        let mut s = SimState::new(&SimulationConfig::default(), &mut Pcg32::seed_from_u64(0));
        let mut cam = CameraRig::default();
        cam.snap(s.drop_x, s.y0);
        let vp = Viewport::new(1024.0, 768.0);

        assert!(Tooltip::place(&s, s.object_pos(), &cam, vp).is_none());

        s.running = true;
        assert!(Tooltip::place(&s, s.object_pos(), &cam, vp).is_none());

        s.paused = true;
        let tip = Tooltip::place(&s, s.object_pos(), &cam, vp).unwrap();
        assert_eq!(tip.title, "PAUSED");
        // Anchor sits above the look-at point, so above screen centre
        assert!(tip.screen.y < 384.0);

        s.running = false;
        s.paused = false;
        s.finished = true;
        let tip = Tooltip::place(&s, s.object_pos(), &cam, vp).unwrap();
        assert_eq!(tip.title, "SPLASH!");
        assert_eq!(tip.body, "Experiment finished.");
    }
}
