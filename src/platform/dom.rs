//! Thin DOM helpers
//!
//! Lookups return `Option` so missing overlay elements are skipped rather than
//! treated as errors. Only startup-critical lookups panic.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, Window};

pub fn window() -> Window {
    web_sys::window().expect("no global window")
}

pub fn document() -> Document {
    window().document().expect("no document")
}

pub fn canvas(id: &str) -> HtmlCanvasElement {
    document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("no #{id} canvas"))
        .dyn_into()
        .unwrap_or_else(|_| panic!("#{id} is not a canvas"))
}

pub fn element(id: &str) -> Option<HtmlElement> {
    document()
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn input(id: &str) -> Option<HtmlInputElement> {
    document()
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = document().get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn text_of(id: &str) -> Option<String> {
    document()
        .get_element_by_id(id)
        .and_then(|el| el.text_content())
        .filter(|t| !t.is_empty())
}

/// Toggle the `hidden` class
pub fn set_hidden(el: &HtmlElement, hidden: bool) {
    let classes = el.class_list();
    let _ = if hidden {
        classes.add_1("hidden")
    } else {
        classes.remove_1("hidden")
    };
}

/// Absolutely position an overlay at screen pixels
pub fn place(el: &HtmlElement, x: f32, y: f32) {
    let style = el.style();
    let _ = style.set_property("left", &format!("{x}px"));
    let _ = style.set_property("top", &format!("{y}px"));
}

/// New element with a class and optional text
pub fn create(tag: &str, class: &str, text: Option<&str>) -> Option<HtmlElement> {
    let el = document().create_element(tag).ok()?;
    el.set_class_name(class);
    if text.is_some() {
        el.set_text_content(text);
    }
    el.dyn_into::<HtmlElement>().ok()
}

/// Remove every child of `el`
pub fn clear_children(el: &HtmlElement) {
    el.set_inner_html("");
}
