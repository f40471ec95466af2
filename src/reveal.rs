use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::config::{PageConfig, RevealConfig};
use crate::dom;
use crate::error::PageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Revealed,
}

/// One-way reveal bookkeeping for a fixed list of tracked elements.
#[derive(Clone, Debug)]
pub struct RevealTracker {
    states: Vec<RevealState>,
}

impl RevealTracker {
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![RevealState::Pending; len],
        }
    }

    #[cfg(test)]
    fn state(&self, index: usize) -> Option<RevealState> {
        self.states.get(index).copied()
    }

    pub fn pending(&self) -> usize {
        self.states.iter().filter(|s| **s == RevealState::Pending).count()
    }

    /// Feeds one intersection entry. Returns true exactly once per element:
    /// on its first intersecting entry.
    pub fn observe(&mut self, index: usize, intersecting: bool) -> bool {
        match self.states.get_mut(index) {
            Some(state) if intersecting && *state == RevealState::Pending => {
                *state = RevealState::Revealed;
                true
            }
            _ => false,
        }
    }
}

struct Cards {
    elements: Vec<HtmlElement>,
    tracker: RefCell<RevealTracker>,
    style: RevealConfig,
}

impl Cards {
    fn hide_all(&self) -> Result<(), PageError> {
        for el in &self.elements {
            dom::set_style(el, "opacity", &self.style.hidden_opacity)?;
            dom::set_style(el, "transform", &self.style.hidden_transform)?;
            dom::set_style(el, "transition", &self.style.transition)?;
        }
        Ok(())
    }

    fn handle(
        &self,
        entry: &IntersectionObserverEntry,
        observer: &IntersectionObserver,
    ) -> Result<(), PageError> {
        let target = entry.target();
        let Some(index) = self.elements.iter().position(|el| **el == target) else {
            return Ok(());
        };
        if !self.tracker.borrow_mut().observe(index, entry.is_intersecting()) {
            return Ok(());
        }

        let el = &self.elements[index];
        dom::set_style(el, "opacity", &self.style.shown_opacity)?;
        dom::set_style(el, "transform", &self.style.shown_transform)?;
        observer.unobserve(&target);
        debug!("Revealed card {}, {} still pending", index, self.tracker.borrow().pending());
        Ok(())
    }
}

pub fn init(config: &PageConfig) -> Result<(), PageError> {
    let document = dom::document()?;
    let elements: Vec<HtmlElement> = dom::query_all(&document, &config.reveal.selector)?
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect();
    if elements.is_empty() {
        return Ok(());
    }

    let cards = Rc::new(Cards {
        tracker: RefCell::new(RevealTracker::new(elements.len())),
        elements,
        style: config.reveal.clone(),
    });

    let callback = {
        let cards = cards.clone();
        Closure::wrap(Box::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if let Err(e) = cards.handle(&entry, &observer) {
                    warn!("Reveal failed: {}", e);
                }
            }
        }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>)
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.reveal.threshold));
    options.set_root_margin(&config.reveal.root_margin);

    // Without an observer the cards keep their natural, visible styling.
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    cards.hide_all()?;
    for el in &cards.elements {
        observer.observe(el);
    }
    info!("Reveal-on-scroll tracking {} cards", cards.elements.len());
    Ok(())
}
