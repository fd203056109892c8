//! Closed-form free-fall kinematics
//!
//! Height and speed are recomputed from absolute time on every call, so no
//! error accumulates across frames:
//!
//! - y(t) = y0 - ½·g·t²
//! - v(t) = g·t

use super::state::SimState;

/// Emitted once, on the call that brings the object down to the water
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Simulation time of the landing step (s)
    pub t: f32,
    /// Speed at that step (m/s)
    pub v: f32,
}

/// Height after `t` seconds, before clamping
#[inline]
pub fn height_at(y0: f32, g: f32, t: f32) -> f32 {
    y0 - 0.5 * g * t * t
}

/// Speed after `t` seconds
#[inline]
pub fn velocity_at(g: f32, t: f32) -> f32 {
    g * t
}

/// Exact time to fall `y0` metres
#[inline]
pub fn time_to_land(y0: f32, g: f32) -> f32 {
    (2.0 * y0 / g).sqrt()
}

/// Advance the fall by `dt` seconds
///
/// Clamps at the water: `y` becomes exactly 0, the state is marked finished
/// and stops running. Returns the landing on that transition only. A state
/// that has already landed is left untouched.
pub fn advance(state: &mut SimState, dt: f32) -> Option<Landing> {
    if state.finished {
        return None;
    }

    state.t += dt.max(0.0);
    state.y = height_at(state.y0, state.g, state.t);
    state.v = velocity_at(state.g, state.t);

    if state.y <= 0.0 {
        state.y = 0.0;
        state.finished = true;
        state.running = false;
        return Some(Landing {
            t: state.t,
            v: state.v,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn staged(y0: f32, g: f32) -> SimState {
        let cfg = SimulationConfig {
            height: y0,
            gravity: g,
            mass: 1.0,
        };
        let mut state = SimState::new(&cfg, &mut Pcg32::seed_from_u64(1));
        state.running = true;
        state
    }

    #[test]
    fn test_single_step_from_rest() {
        let mut state = staged(60.0, 9.81);
        assert!(advance(&mut state, 0.1).is_none());
        assert!((state.t - 0.1).abs() < 1e-6);
        assert!((state.v - 0.981).abs() < 1e-4);
        assert!((state.y - 59.95095).abs() < 1e-4);
    }

    #[test]
    fn test_landing_clamps_to_zero() {
        let mut state = staged(60.0, 9.81);
        let landing = advance(&mut state, 5.0).expect("should land");
        assert_eq!(state.y, 0.0);
        assert!(state.finished);
        assert!(!state.running);
        assert_eq!(landing.t, 5.0);
        assert!((landing.v - 49.05).abs() < 1e-3);

        // Landed states are inert
        assert!(advance(&mut state, 1.0).is_none());
        assert_eq!(state.t, 5.0);
    }

    #[test]
    fn test_sixty_metre_drop_timing() {
        let t_land = time_to_land(60.0, 9.81);
        assert!((t_land - (2.0 * 60.0 / 9.81f32).sqrt()).abs() < 1e-6);
        assert!((t_land - 3.4975).abs() < 1e-3);
        assert!((velocity_at(9.81, t_land) - 34.31).abs() < 0.02);

        // Driven at 60 Hz the landing frame is the first one past t_land
        let mut state = staged(60.0, 9.81);
        let mut landing = None;
        for _ in 0..1000 {
            if let Some(l) = advance(&mut state, 1.0 / 60.0) {
                landing = Some(l);
                break;
            }
        }
        let landing = landing.expect("should land within 1000 frames");
        assert!(landing.t >= t_land - 1e-4);
        assert!(landing.t < t_land + 1.0 / 60.0 + 1e-4);
        assert!((landing.v - 34.32).abs() < 0.2);
    }

    #[test]
    fn test_gravity_change_mid_fall_keeps_time() {
        let mut state = staged(60.0, 9.81);
        advance(&mut state, 1.0);
        state.g = 1.6;
        advance(&mut state, 0.0);
        assert_eq!(state.t, 1.0);
        assert!((state.y - (60.0 - 0.8)).abs() < 1e-4);
        assert!((state.v - 1.6).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_closed_form_before_landing(
            y0 in 10.0f32..100.0,
            g in 1.6f32..20.0,
            t in 0.0f32..5.0,
        ) {
            let mut state = staged(y0, g);
            let landed = advance(&mut state, t).is_some();
            let expected = height_at(y0, g, t);
            if expected > 0.0 {
                prop_assert!(!landed);
                prop_assert!((state.y - expected).abs() < 1e-3);
                prop_assert!((state.v - g * t).abs() < 1e-3);
            } else {
                prop_assert!(landed);
                prop_assert_eq!(state.y, 0.0);
                prop_assert!(state.finished);
                prop_assert!(!state.running);
            }
            prop_assert!(state.y >= 0.0 && state.y <= y0);
            prop_assert!(state.v >= 0.0);
        }

        #[test]
        fn prop_zero_dt_is_idempotent(
            y0 in 10.0f32..100.0,
            g in 1.6f32..20.0,
            t in 0.0f32..3.0,
        ) {
            let mut state = staged(y0, g);
            advance(&mut state, t);
            let (t1, y1, v1) = (state.t, state.y, state.v);
            advance(&mut state, 0.0);
            prop_assert_eq!(state.t, t1);
            prop_assert_eq!(state.y, y1);
            prop_assert_eq!(state.v, v1);
        }

        #[test]
        fn prop_accumulation_does_not_drift(
            y0 in 50.0f32..100.0,
            g in 1.6f32..20.0,
            steps in 1usize..200,
        ) {
            // Keep the total short enough that neither path lands
            let total = time_to_land(y0, g) * 0.9;
            let dt = total / steps as f32;

            let mut many = staged(y0, g);
            for _ in 0..steps {
                advance(&mut many, dt);
            }
            let mut one = staged(y0, g);
            advance(&mut one, many.t);

            prop_assert_eq!(many.y, one.y);
            prop_assert_eq!(many.v, one.v);
        }
    }
}
