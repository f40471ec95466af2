use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use web_sys::Element;

use crate::config::PageConfig;
use crate::dom;
use crate::error::PageError;

/// Expanded flags for a fixed list of FAQ items, at most one set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accordion {
    expanded: Vec<bool>,
}

impl Accordion {
    #[cfg(test)]
    fn new(len: usize) -> Self {
        Self {
            expanded: vec![false; len],
        }
    }

    /// Starts from whatever the markup says, keeping only the first open item.
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        let mut seen_open = false;
        let expanded = flags
            .into_iter()
            .map(|open| {
                let keep = open && !seen_open;
                seen_open |= open;
                keep
            })
            .collect();
        Self { expanded }
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    fn expanded(&self) -> Option<usize> {
        self.expanded.iter().position(|&open| open)
    }

    /// Collapses every other item, then flips `index`.
    pub fn click(&mut self, index: usize) {
        if index >= self.expanded.len() {
            return;
        }
        for (i, open) in self.expanded.iter_mut().enumerate() {
            if i != index {
                *open = false;
            }
        }
        self.expanded[index] = !self.expanded[index];
    }
}

struct FaqList {
    items: Vec<Element>,
    state: RefCell<Accordion>,
    active_class: String,
}

impl FaqList {
    fn render(&self) -> Result<(), PageError> {
        let state = self.state.borrow();
        for (i, item) in self.items.iter().enumerate() {
            dom::set_class(item, &self.active_class, state.is_expanded(i))?;
        }
        Ok(())
    }

    fn click(&self, index: usize) -> Result<(), PageError> {
        self.state.borrow_mut().click(index);
        self.render()
    }
}

pub fn init(config: &PageConfig) -> Result<(), PageError> {
    let document = dom::document()?;
    let items = dom::query_all(&document, &config.faq_item_selector)?;
    if items.is_empty() {
        return Ok(());
    }

    let state = Accordion::from_flags(
        items
            .iter()
            .map(|item| dom::has_class(item, &config.active_class)),
    );
    let list = Rc::new(FaqList {
        items,
        state: RefCell::new(state),
        active_class: config.active_class.clone(),
    });
    list.render()?;

    let mut bound = 0;
    for (index, item) in list.items.iter().enumerate() {
        let Some(question) = item.query_selector(&config.faq_question_selector)? else {
            continue;
        };
        let list = list.clone();
        dom::listen(&question, "click", move |_| {
            if let Err(e) = list.click(index) {
                warn!("FAQ toggle failed: {}", e);
            }
        })?;
        bound += 1;
    }
    info!("FAQ accordion bound to {} of {} items", bound, list.state.borrow().len());
    Ok(())
}
