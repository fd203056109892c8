//! Measurement log
//!
//! Snapshots of the displayed readouts, newest first, kept for the session
//! only.

use serde::{Deserialize, Serialize};

use crate::telemetry::{HEIGHT_UNIT, Readouts, TIME_UNIT, VELOCITY_UNIT, strip_unit};

/// Fallbacks used when a readout target has no text yet
pub const EMPTY_TIME: &str = "0.00 s";
pub const EMPTY_HEIGHT: &str = "0.00 m";
pub const EMPTY_VELOCITY: &str = "0.00 m/s";

/// One logged row, unit suffixes removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub height: String,
    pub velocity: String,
}

impl LogEntry {
    /// Build an entry from displayed readout text
    ///
    /// Missing targets fall back to zero readings.
    pub fn from_display(time: Option<&str>, height: Option<&str>, velocity: Option<&str>) -> Self {
        Self {
            time: strip_unit(time.unwrap_or(EMPTY_TIME), TIME_UNIT).to_string(),
            height: strip_unit(height.unwrap_or(EMPTY_HEIGHT), HEIGHT_UNIT).to_string(),
            velocity: strip_unit(velocity.unwrap_or(EMPTY_VELOCITY), VELOCITY_UNIT).to_string(),
        }
    }

    pub fn from_readouts(readouts: &Readouts) -> Self {
        Self::from_display(
            Some(&readouts.time),
            Some(&readouts.height),
            Some(&readouts.velocity),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementLog {
    pub entries: Vec<LogEntry>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry at the top
    pub fn record(&mut self, entry: LogEntry) {
        self.entries.insert(0, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Most recent entry (if any)
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }
}
