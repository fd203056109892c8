//! Discrete user commands and the state machine they drive
//!
//! ```text
//!            Start                 Pause
//!   Idle ─────────────▶ Falling ◀───────▶ Paused
//!    ▲  ╲                  │                 │
//!    │   ╲ Step            │ lands           │ Step lands
//!    │    ╲────▶ Paused    ▼                 ▼
//!    └──────── Reset ──── Landed ◀───────────┘
//!                          │ Start (implicit Reset)
//!                          ▼
//!                       Falling
//! ```
//!
//! Every command is tagged with a sequence number so pressing the same button
//! twice yields two events. The dispatcher only reacts to sequence numbers it
//! has not seen yet.

use super::experiment::Experiment;
use super::kinematics::Landing;
use super::state::SimPhase;
use crate::consts::STEP_DT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Step,
    Reset,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Step => "step",
            Action::Reset => "reset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(Action::Start),
            "pause" => Some(Action::Pause),
            "step" => Some(Action::Step),
            "reset" => Some(Action::Reset),
            _ => None,
        }
    }
}

/// A command paired with its sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub action: Action,
    pub seq: u64,
}

/// Latest command issued by the control panel
#[derive(Debug, Clone, Default)]
pub struct ActionTrigger {
    latest: Option<ActionEvent>,
}

impl ActionTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a command; repeated commands still get a fresh sequence number
    pub fn fire(&mut self, action: Action) -> ActionEvent {
        let seq = self.latest.map_or(0, |e| e.seq) + 1;
        let event = ActionEvent { action, seq };
        self.latest = Some(event);
        event
    }

    pub fn latest(&self) -> Option<ActionEvent> {
        self.latest
    }
}

/// Applies new command events to the experiment
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    last_seq: Option<u64>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to `event` if it is new; returns whether it was applied
    pub fn observe(&mut self, lab: &mut Experiment, event: Option<ActionEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };
        if self.last_seq.is_some_and(|seen| event.seq <= seen) {
            return false;
        }
        self.last_seq = Some(event.seq);
        log::debug!("Action #{}: {} in {:?}", event.seq, event.action.as_str(), lab.phase());
        apply(lab, event.action);
        true
    }

    /// Observe whatever the trigger holds now
    ///
    /// Safe to call every frame: the latest command stays in the trigger,
    /// but it is applied only once.
    pub fn poll(&mut self, lab: &mut Experiment, trigger: &ActionTrigger) -> bool {
        self.observe(lab, trigger.latest())
    }
}

/// Apply one command to the state machine
pub fn apply(lab: &mut Experiment, action: Action) -> Option<Landing> {
    match action {
        Action::Start => {
            match lab.phase() {
                SimPhase::Landed => {
                    lab.reset();
                    lab.state.running = true;
                    lab.state.paused = false;
                }
                SimPhase::Idle => {
                    lab.state.running = true;
                    lab.state.paused = false;
                }
                // Start never un-pauses; Pause toggles back
                SimPhase::Falling | SimPhase::Paused => {}
            }
            None
        }
        Action::Pause => {
            if lab.state.running && !lab.state.finished {
                lab.state.paused = !lab.state.paused;
            }
            None
        }
        Action::Step => {
            if lab.state.finished {
                return None;
            }
            lab.state.running = true;
            lab.state.paused = true;
            lab.advance(STEP_DT)
        }
        Action::Reset => {
            lab.reset();
            None
        }
    }
}
