//! Live telemetry output
//!
//! The frame driver pushes formatted text into a sink every frame; the sink
//! writes straight into its display targets. There is no subscription and no
//! re-render cycle in between.

use crate::sim::{SimState, Tooltip};

pub const TIME_UNIT: &str = " s";
pub const HEIGHT_UNIT: &str = " m";
pub const VELOCITY_UNIT: &str = " m/s";
pub const ACCELERATION_UNIT: &str = " m/s²";

/// The four live readouts, formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readouts {
    pub time: String,
    pub height: String,
    pub velocity: String,
    pub acceleration: String,
}

impl Readouts {
    pub fn from_state(state: &SimState) -> Self {
        Self {
            time: format!("{:.2}{}", state.t, TIME_UNIT),
            height: format!("{:.2}{}", state.y, HEIGHT_UNIT),
            velocity: format!("{:.2}{}", state.v, VELOCITY_UNIT),
            acceleration: format!("{:.2}{}", state.g, ACCELERATION_UNIT),
        }
    }
}

/// Display targets for telemetry
///
/// Implementations skip any target that is not available.
pub trait TelemetrySink {
    fn write_readouts(&mut self, readouts: &Readouts);
    /// `None` hides the tooltip
    fn write_tooltip(&mut self, tooltip: Option<&Tooltip>);
}

/// Remove a trailing unit suffix, if present
pub fn strip_unit<'a>(text: &'a str, unit: &str) -> &'a str {
    text.strip_suffix(unit).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_readouts_use_two_decimals() {
        let mut s = SimState::new(&SimulationConfig::default(), &mut Pcg32::seed_from_u64(0));
        s.t = 1.234_567;
        s.y = 52.5;
        s.v = 12.107;
        let r = Readouts::from_state(&s);
        assert_eq!(r.time, "1.23 s");
        assert_eq!(r.height, "52.50 m");
        assert_eq!(r.velocity, "12.11 m/s");
        assert_eq!(r.acceleration, "9.81 m/s²");
    }

    #[test]
    fn test_strip_unit() {
        assert_eq!(strip_unit("3.50 m/s", VELOCITY_UNIT), "3.50");
        assert_eq!(strip_unit("3.50", VELOCITY_UNIT), "3.50");
        // Height unit must not eat the end of a velocity string
        assert_eq!(strip_unit("3.50 m/s", HEIGHT_UNIT), "3.50 m/s");
    }
}
