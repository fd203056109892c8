//! Frame driver
//!
//! One call per display refresh. The order is fixed:
//! 1. Clamp the frame delta
//! 2. Advance the fall (Falling only)
//! 3. Sync the object transform
//! 4. Record a trail sample
//! 5. Update the velocity and acceleration arrows
//! 6. Animate the splash
//! 7. Swim the sharks
//! 8. Ease the camera
//! 9. Place the tooltip
//! 10. Push telemetry text
//! 11. Draw
//!
//! Steps 1-8 live in [`crate::sim::tick`]; this module adds the outer three
//! and the frame timing.

use crate::consts::FIRST_FRAME_DT;
use crate::sim::{Experiment, TickReport, Viewport, tick};
use crate::telemetry::{Readouts, TelemetrySink};

/// Draws the current experiment state
pub trait FrameRenderer {
    fn render(&mut self, lab: &Experiment);
}

/// Renderer that draws nothing, for headless runs
#[derive(Debug, Default)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn render(&mut self, _lab: &Experiment) {}
}

/// Telemetry sink that discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn write_readouts(&mut self, _readouts: &Readouts) {}
    fn write_tooltip(&mut self, _tooltip: Option<&crate::sim::Tooltip>) {}
}

/// Run one full frame
pub fn run_frame(
    lab: &mut Experiment,
    raw_dt: f32,
    viewport: Viewport,
    sink: &mut dyn TelemetrySink,
    renderer: &mut dyn FrameRenderer,
) -> TickReport {
    let report = tick(lab, raw_dt);

    lab.camera.set_viewport(viewport);
    lab.place_tooltip(viewport);

    sink.write_readouts(&Readouts::from_state(&lab.state));
    sink.write_tooltip(lab.tooltip.as_ref());

    renderer.render(lab);
    report
}

/// Timing for the animation-frame loop
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    last_time: Option<f64>,
    cancelled: bool,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame, from a millisecond timestamp
    ///
    /// The first frame gets a nominal delta. Returns `None` once cancelled.
    pub fn frame_delta(&mut self, time_ms: f64) -> Option<f32> {
        if self.cancelled {
            return None;
        }
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => FIRST_FRAME_DT,
        };
        self.last_time = Some(time_ms);
        Some(dt)
    }

    /// Stop the loop; true only on the first call
    pub fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::sim::{Action, SimPhase, Tooltip, action};

    #[derive(Default)]
    struct RecordingSink {
        readouts: Vec<Readouts>,
        tooltips: Vec<Option<(&'static str, String)>>,
    }

    impl TelemetrySink for RecordingSink {
        fn write_readouts(&mut self, readouts: &Readouts) {
            self.readouts.push(readouts.clone());
        }

        fn write_tooltip(&mut self, tooltip: Option<&Tooltip>) {
            self.tooltips.push(tooltip.map(|t| (t.title, t.body.to_string())));
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_t: f32,
    }

    impl FrameRenderer for CountingRenderer {
        fn render(&mut self, lab: &Experiment) {
            self.frames += 1;
            self.last_t = lab.state.t;
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    #[test]
    fn test_every_frame_writes_telemetry_and_draws() {
        let mut lab = Experiment::new(SimulationConfig::default(), 7);
        let mut sink = RecordingSink::default();
        let mut renderer = CountingRenderer::default();

        for _ in 0..5 {
            run_frame(&mut lab, 1.0 / 60.0, viewport(), &mut sink, &mut renderer);
        }
        assert_eq!(renderer.frames, 5);
        assert_eq!(sink.readouts.len(), 5);
        assert_eq!(sink.readouts[4].height, "60.00 m");
        assert!(sink.tooltips.iter().all(Option::is_none));
    }

    #[test]
    fn test_renderer_sees_state_after_tick() {
        let mut lab = Experiment::new(SimulationConfig::default(), 7);
        let mut renderer = CountingRenderer::default();
        action::apply(&mut lab, Action::Start);
        run_frame(&mut lab, 0.05, viewport(), &mut NullSink, &mut renderer);
        assert!((renderer.last_t - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_tooltip_follows_phase() {
        let mut lab = Experiment::new(SimulationConfig::default(), 7);
        let mut sink = RecordingSink::default();
        let mut renderer = NullRenderer;

        action::apply(&mut lab, Action::Step);
        run_frame(&mut lab, 1.0 / 60.0, viewport(), &mut sink, &mut renderer);
        assert_eq!(lab.phase(), SimPhase::Paused);
        assert_eq!(sink.tooltips.last().unwrap().as_ref().unwrap().0, "PAUSED");

        action::apply(&mut lab, Action::Pause);
        for _ in 0..600 {
            run_frame(&mut lab, 1.0 / 60.0, viewport(), &mut sink, &mut renderer);
        }
        assert_eq!(lab.phase(), SimPhase::Landed);
        let (title, body) = sink.tooltips.last().unwrap().clone().unwrap();
        assert_eq!(title, "SPLASH!");
        assert_eq!(body, "Experiment finished.");
        assert_eq!(sink.readouts.last().unwrap().height, "0.00 m");
    }

    #[test]
    fn test_first_frame_gets_nominal_delta() {
        let mut lc = LoopControl::new();
        assert_eq!(lc.frame_delta(1000.0), Some(FIRST_FRAME_DT));
        let dt = lc.frame_delta(1050.0).unwrap();
        assert!((dt - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut lc = LoopControl::new();
        lc.frame_delta(0.0);
        assert!(lc.cancel());
        assert!(!lc.cancel());
        assert!(lc.is_cancelled());
        assert_eq!(lc.frame_delta(16.0), None);
    }

    #[test]
    fn test_long_hitch_is_clamped_by_the_tick() {
        let mut lab = Experiment::new(SimulationConfig::default(), 7);
        let mut lc = LoopControl::new();
        action::apply(&mut lab, Action::Start);
        lc.frame_delta(0.0);
        let dt = lc.frame_delta(5000.0).unwrap();
        let report = run_frame(&mut lab, dt, viewport(), &mut NullSink, &mut NullRenderer);
        assert_eq!(report.dt, 0.1);
    }
}
