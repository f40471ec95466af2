//! Thin helpers over `web_sys` shared by every behavior unit.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::PageError;

pub fn window() -> Result<Window, PageError> {
    web_sys::window().ok_or(PageError::NoDocument)
}

pub fn document() -> Result<Document, PageError> {
    window()?.document().ok_or(PageError::NoDocument)
}

pub fn body(document: &Document) -> Result<HtmlElement, PageError> {
    document
        .body()
        .ok_or_else(|| PageError::MissingElement("body".to_string()))
}

/// `querySelectorAll` collected into elements. Non-element nodes are skipped.
pub fn query_all(root: &Document, selector: &str) -> Result<Vec<Element>, PageError> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn query(root: &Document, selector: &str) -> Result<Option<Element>, PageError> {
    Ok(root.query_selector(selector)?)
}

pub fn set_class(element: &Element, class: &str, on: bool) -> Result<(), PageError> {
    element.class_list().toggle_with_force(class, on)?;
    Ok(())
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) -> Result<(), PageError> {
    element.style().set_property(property, value)?;
    Ok(())
}

/// Marks `element` as bound under `guard`. Returns false when it already was,
/// so callers register each handler at most once per element.
pub fn claim_binding(element: &Element, guard: &str) -> Result<bool, PageError> {
    if element.has_attribute(guard) {
        return Ok(false);
    }
    element.set_attribute(guard, "")?;
    Ok(true)
}

/// Registers a page-lifetime listener on `target`.
pub fn listen<F>(target: &web_sys::EventTarget, event: &str, handler: F) -> Result<(), PageError>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

pub fn alert(message: &str) {
    if let Ok(window) = window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn viewport_height(window: &Window) -> Result<f64, PageError> {
    window
        .inner_height()?
        .as_f64()
        .ok_or_else(|| PageError::Js("innerHeight is not a number".to_string()))
}
