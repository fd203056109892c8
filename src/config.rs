//! Simulation parameters supplied by the control panel
//!
//! Optionally seeded from a JSON block embedded in the page.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// One of the three sliders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Height,
    Gravity,
    Mass,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Height, ConfigKey::Gravity, ConfigKey::Mass];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Height => "height",
            ConfigKey::Gravity => "gravity",
            ConfigKey::Mass => "mass",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "height" => Some(ConfigKey::Height),
            "gravity" => Some(ConfigKey::Gravity),
            "mass" => Some(ConfigKey::Mass),
            _ => None,
        }
    }

    /// Accepted slider range
    pub fn range(&self) -> RangeInclusive<f32> {
        match self {
            ConfigKey::Height => 10.0..=100.0,
            ConfigKey::Gravity => 1.6..=20.0,
            ConfigKey::Mass => 0.5..=5.0,
        }
    }

    /// Slider step
    pub fn step(&self) -> f32 {
        match self {
            ConfigKey::Height => 1.0,
            ConfigKey::Gravity => 0.1,
            ConfigKey::Mass => 0.5,
        }
    }

    /// Unit shown next to the slider value
    pub fn unit(&self) -> &'static str {
        match self {
            ConfigKey::Height => "m",
            ConfigKey::Gravity => "m/s²",
            ConfigKey::Mass => "kg",
        }
    }

    /// Slider value label, e.g. "9.81 m/s²"
    pub fn label(&self, value: f32) -> String {
        format!("{} {}", value, self.unit())
    }

    fn clamp(&self, value: f32) -> f32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

/// Drop parameters
///
/// `mass` is carried for display only: free fall without drag is
/// mass-independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Drop height (m)
    pub height: f32,
    /// Gravitational acceleration (m/s²)
    pub gravity: f32,
    /// Object mass (kg)
    pub mass: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            height: 60.0,
            gravity: 9.81,
            mass: 2.5,
        }
    }
}

impl SimulationConfig {
    pub fn get(&self, key: ConfigKey) -> f32 {
        match key {
            ConfigKey::Height => self.height,
            ConfigKey::Gravity => self.gravity,
            ConfigKey::Mass => self.mass,
        }
    }

    /// Update one field, clamped into the slider range
    pub fn set(&mut self, key: ConfigKey, value: f32) {
        let value = key.clamp(value);
        match key {
            ConfigKey::Height => self.height = value,
            ConfigKey::Gravity => self.gravity = value,
            ConfigKey::Mass => self.mass = value,
        }
    }

    /// Copy with one field replaced (value semantics for the owner)
    pub fn with(mut self, key: ConfigKey, value: f32) -> Self {
        self.set(key, value);
        self
    }

    /// Clamp every field into range
    pub fn clamped(self) -> Self {
        ConfigKey::ALL
            .iter()
            .fold(self, |cfg, &key| cfg.with(key, cfg.get(key)))
    }

    /// Parse a (possibly partial) JSON object; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let cfg: Self = serde_json::from_str(json)?;
        Ok(cfg.clamped())
    }

    /// Element id of the optional embedded config block
    pub const ELEMENT_ID: &'static str = "lab-config";

    /// Load the embedded page config (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = text {
            match Self::from_json(&json) {
                Ok(cfg) => {
                    log::info!("Loaded lab config from page: {:?}", cfg);
                    return cfg;
                }
                Err(e) => log::warn!("Ignoring malformed lab config: {}", e),
            }
        }

        log::info!("Using default lab config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
