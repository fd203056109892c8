//! Browser bindings
//!
//! DOM-backed implementations of the telemetry sink, the measurement log
//! table and the ruler label overlay. Event wiring and the animation loop
//! live in the binary.

pub mod dom;

use web_sys::HtmlElement;

use crate::measurements::{LogEntry, MeasurementLog};
use crate::scene::RulerLabel;
use crate::sim::{CameraRig, Tooltip, Viewport};
use crate::telemetry::{Readouts, TelemetrySink};

/// Element ids used by the page
pub mod ids {
    pub const CANVAS: &str = "canvas";
    pub const LOADING: &str = "loading";

    pub const TIME: &str = "telemetry-time";
    pub const HEIGHT: &str = "telemetry-height";
    pub const VELOCITY: &str = "telemetry-velocity";
    pub const ACCELERATION: &str = "telemetry-acceleration";

    pub const TOOLTIP: &str = "tooltip";
    pub const TOOLTIP_TITLE: &str = "tooltip-title";
    pub const TOOLTIP_TEXT: &str = "tooltip-text";

    pub const LOG_ROWS: &str = "log-rows";
    pub const LOG_POINT: &str = "btn-log";
    pub const LOG_CLEAR: &str = "btn-clear";

    pub const RULER_LABELS: &str = "ruler-labels";

    /// Slider input for a config key
    pub fn slider(key: crate::ConfigKey) -> String {
        format!("slider-{}", key.as_str())
    }

    /// Value label next to a slider
    pub fn slider_value(key: crate::ConfigKey) -> String {
        format!("value-{}", key.as_str())
    }

    /// Button for an action
    pub fn button(action: crate::sim::Action) -> String {
        format!("btn-{}", action.as_str())
    }
}

/// Telemetry written straight into the overlay elements
///
/// Elements are looked up once; any that are missing are skipped.
pub struct DomTelemetry {
    time: Option<HtmlElement>,
    height: Option<HtmlElement>,
    velocity: Option<HtmlElement>,
    acceleration: Option<HtmlElement>,
    tooltip: Option<HtmlElement>,
    tooltip_title: Option<HtmlElement>,
    tooltip_text: Option<HtmlElement>,
}

impl DomTelemetry {
    pub fn attach() -> Self {
        Self {
            time: dom::element(ids::TIME),
            height: dom::element(ids::HEIGHT),
            velocity: dom::element(ids::VELOCITY),
            acceleration: dom::element(ids::ACCELERATION),
            tooltip: dom::element(ids::TOOLTIP),
            tooltip_title: dom::element(ids::TOOLTIP_TITLE),
            tooltip_text: dom::element(ids::TOOLTIP_TEXT),
        }
    }
}

fn write(el: &Option<HtmlElement>, text: &str) {
    if let Some(el) = el {
        el.set_text_content(Some(text));
    }
}

impl TelemetrySink for DomTelemetry {
    fn write_readouts(&mut self, readouts: &Readouts) {
        write(&self.time, &readouts.time);
        write(&self.height, &readouts.height);
        write(&self.velocity, &readouts.velocity);
        write(&self.acceleration, &readouts.acceleration);
    }

    fn write_tooltip(&mut self, tooltip: Option<&Tooltip>) {
        // All three parts are needed to show anything
        let (Some(el), Some(_), Some(_)) = (&self.tooltip, &self.tooltip_title, &self.tooltip_text)
        else {
            return;
        };
        match tooltip {
            Some(tip) => {
                dom::place(el, tip.screen.x, tip.screen.y);
                write(&self.tooltip_title, tip.title);
                write(&self.tooltip_text, tip.body);
                dom::set_hidden(el, false);
            }
            None => dom::set_hidden(el, true),
        }
    }
}

/// Snapshot the readouts as currently displayed
pub fn snapshot_readouts() -> LogEntry {
    LogEntry::from_display(
        dom::text_of(ids::TIME).as_deref(),
        dom::text_of(ids::HEIGHT).as_deref(),
        dom::text_of(ids::VELOCITY).as_deref(),
    )
}

/// Redraw the measurement table, newest first
pub fn render_log(log: &MeasurementLog) {
    let Some(body) = dom::element(ids::LOG_ROWS) else {
        return;
    };
    dom::clear_children(&body);

    if log.is_empty() {
        if let Some(empty) = dom::create("div", "log-empty", None) {
            empty.set_inner_html("No data.<br/>Press \"LOG POINT\".");
            let _ = body.append_child(&empty);
        }
        return;
    }

    for entry in &log.entries {
        let Some(row) = dom::create("div", "log-row", None) else {
            continue;
        };
        for (class, text) in [
            ("log-time", &entry.time),
            ("log-height", &entry.height),
            ("log-velocity", &entry.velocity),
        ] {
            if let Some(cell) = dom::create("div", class, Some(text.as_str())) {
                let _ = row.append_child(&cell);
            }
        }
        let _ = body.append_child(&row);
    }
}

/// Height labels beside the ruler, pinned to their world positions
#[derive(Default)]
pub struct RulerOverlay {
    revision: Option<u64>,
    labels: Vec<(HtmlElement, glam::Vec3)>,
}

impl RulerOverlay {
    /// Recreate the label elements for a new stage
    pub fn rebuild(&mut self, revision: u64, labels: &[RulerLabel]) {
        if self.revision == Some(revision) {
            return;
        }
        self.revision = Some(revision);
        self.labels.clear();

        let Some(container) = dom::element(ids::RULER_LABELS) else {
            return;
        };
        dom::clear_children(&container);
        for label in labels {
            if let Some(el) = dom::create("span", "ruler-label", Some(label.text.as_str())) {
                let _ = container.append_child(&el);
                self.labels.push((el, label.world));
            }
        }
    }

    /// Re-project every label for the current camera
    pub fn update(&self, camera: &CameraRig, viewport: Viewport) {
        for (el, world) in &self.labels {
            let screen = camera.project(*world, viewport);
            dom::place(el, screen.x, screen.y);
        }
    }
}
