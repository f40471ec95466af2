use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::config::PageConfig;
use crate::dom;
use crate::error::PageError;

const MENU_GUARD: &str = "data-menu-bound";
const ANCHOR_GUARD: &str = "data-smooth-scroll-bound";

/// Mobile menu state. The body scroll-lock is derived from it, never stored
/// separately, so the two cannot disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn scroll_locked(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Returns true if the menu was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

/// Id targeted by an in-page link, or `None` for bare `#` and other links.
pub fn anchor_target_id(href: &str) -> Option<&str> {
    match href.strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(id),
        _ => None,
    }
}

/// Document offset to scroll to so the target sits just below the header.
/// A missing or collapsed header uses `fallback`.
pub fn scroll_target_top(
    target_viewport_top: f64,
    page_offset: f64,
    header_height: Option<f64>,
    fallback: f64,
) -> f64 {
    let header = match header_height {
        Some(h) if h > 0.0 => h,
        _ => fallback,
    };
    target_viewport_top + page_offset - header
}

/// A click as seen by navigation handlers.
#[derive(Debug, Default)]
pub struct Click {
    default_prevented: Cell<bool>,
}

impl Click {
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type ClickHandler = Box<dyn FnMut(&Click)>;

/// The document operations navigation relies on.
pub trait NavHost {
    type Node: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Result<Option<Self::Node>, PageError>;
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, PageError>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn body(&self) -> Result<Self::Node, PageError>;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn set_class(&self, node: &Self::Node, class: &str, on: bool) -> Result<(), PageError>;

    /// Marks `node` as bound under `guard`. False when it already was.
    fn claim_binding(&self, node: &Self::Node, guard: &str) -> Result<bool, PageError>;
    fn on_click(&self, node: &Self::Node, handler: ClickHandler) -> Result<(), PageError>;

    /// Smooth-scrolls `target` to just below the header. Returns the offset.
    fn scroll_below_header(
        &self,
        target: &Self::Node,
        header_selector: &str,
        fallback: f64,
    ) -> Result<f64, PageError>;
}

/// `NavHost` over the live document.
pub struct DomNav {
    window: Window,
    document: Document,
}

impl DomNav {
    pub fn new() -> Result<Self, PageError> {
        Ok(Self {
            window: dom::window()?,
            document: dom::document()?,
        })
    }
}

impl NavHost for DomNav {
    type Node = Element;

    fn query(&self, selector: &str) -> Result<Option<Element>, PageError> {
        dom::query(&self.document, selector)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, PageError> {
        dom::query_all(&self.document, selector)
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Result<Element, PageError> {
        Ok(dom::body(&self.document)?.into())
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        dom::has_class(node, class)
    }

    fn set_class(&self, node: &Element, class: &str, on: bool) -> Result<(), PageError> {
        dom::set_class(node, class, on)
    }

    fn claim_binding(&self, node: &Element, guard: &str) -> Result<bool, PageError> {
        dom::claim_binding(node, guard)
    }

    fn on_click(&self, node: &Element, mut handler: ClickHandler) -> Result<(), PageError> {
        dom::listen(node, "click", move |event| {
            let click = Click::default();
            handler(&click);
            if click.default_prevented() {
                event.prevent_default();
            }
        })
    }

    fn scroll_below_header(
        &self,
        target: &Element,
        header_selector: &str,
        fallback: f64,
    ) -> Result<f64, PageError> {
        let header_height = dom::query(&self.document, header_selector)?
            .and_then(|h| h.dyn_into::<HtmlElement>().ok())
            .map(|h| h.offset_height() as f64);
        let top = scroll_target_top(
            target.get_bounding_client_rect().top(),
            self.window.page_y_offset()?,
            header_height,
            fallback,
        );

        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
        Ok(top)
    }
}

struct Menu<N> {
    nav: N,
    body: N,
    state: Cell<MenuState>,
}

pub struct Navigation<H: NavHost> {
    config: Rc<PageConfig>,
    host: H,
    menu: RefCell<Option<Rc<Menu<H::Node>>>>,
}

impl<H: NavHost + 'static> Navigation<H> {
    pub fn new(config: Rc<PageConfig>, host: H) -> Rc<Self> {
        Rc::new(Self {
            config,
            host,
            menu: RefCell::new(None),
        })
    }

    /// Binds the menu toggle and every not-yet-bound in-page anchor. Safe to
    /// call any number of times, before or after the header is injected.
    pub fn activate(self: &Rc<Self>) -> Result<(), PageError> {
        self.track_menu()?;
        self.bind_toggle()?;
        self.bind_anchors()?;
        Ok(())
    }

    /// Follows the current `.nav`, even on pages without a toggle button, so
    /// anchor navigation can still close it.
    fn track_menu(&self) -> Result<(), PageError> {
        let Some(nav) = self.host.query(&self.config.nav_selector)? else {
            debug!("Nav not in document yet");
            return Ok(());
        };

        let stale = match self.menu.borrow().as_ref() {
            Some(menu) => menu.nav != nav,
            None => true,
        };
        if stale {
            let open = self.host.has_class(&nav, &self.config.active_class);
            let menu = Rc::new(Menu {
                body: self.host.body()?,
                nav,
                state: Cell::new(MenuState::new(open)),
            });
            self.render(&menu)?;
            *self.menu.borrow_mut() = Some(menu);
        }
        Ok(())
    }

    fn bind_toggle(self: &Rc<Self>) -> Result<(), PageError> {
        let Some(toggle) = self.host.query(&self.config.menu_toggle_selector)? else {
            debug!("Menu toggle not in document yet");
            return Ok(());
        };
        if !self.host.claim_binding(&toggle, MENU_GUARD)? {
            return Ok(());
        }

        let this = self.clone();
        self.host.on_click(
            &toggle,
            Box::new(move |_| {
                if let Err(e) = this.toggle_menu() {
                    warn!("Menu toggle failed: {}", e);
                }
            }),
        )?;
        info!("Mobile menu toggle bound");
        Ok(())
    }

    fn render(&self, menu: &Menu<H::Node>) -> Result<(), PageError> {
        let state = menu.state.get();
        self.host.set_class(&menu.nav, &self.config.active_class, state.is_open())?;
        self.host.set_class(&menu.body, &self.config.scroll_lock_class, state.scroll_locked())?;
        Ok(())
    }

    pub fn toggle_menu(&self) -> Result<(), PageError> {
        let Some(menu) = self.menu.borrow().clone() else {
            return Ok(());
        };
        let mut state = menu.state.get();
        state.toggle();
        menu.state.set(state);
        debug!("Mobile menu {}", if state.is_open() { "opened" } else { "closed" });
        self.render(&menu)
    }

    pub fn close_menu(&self) -> Result<(), PageError> {
        let Some(menu) = self.menu.borrow().clone() else {
            return Ok(());
        };
        let mut state = menu.state.get();
        if state.close() {
            menu.state.set(state);
            self.render(&menu)?;
        }
        Ok(())
    }

    fn bind_anchors(self: &Rc<Self>) -> Result<(), PageError> {
        let mut bound = 0;
        for anchor in self.host.query_all(&self.config.anchor_selector)? {
            if !self.host.claim_binding(&anchor, ANCHOR_GUARD)? {
                continue;
            }
            let this = self.clone();
            let link = anchor.clone();
            self.host.on_click(
                &anchor,
                Box::new(move |click| {
                    if let Err(e) = this.follow_anchor(&link, click) {
                        warn!("Smooth scroll failed: {}", e);
                    }
                }),
            )?;
            bound += 1;
        }
        debug!("Bound {} new in-page anchors", bound);
        Ok(())
    }

    fn follow_anchor(&self, link: &H::Node, click: &Click) -> Result<(), PageError> {
        let Some(href) = self.host.attribute(link, "href") else {
            return Ok(());
        };
        let Some(id) = anchor_target_id(&href) else {
            return Ok(());
        };
        let Some(target) = self.host.by_id(id) else {
            // Let the browser handle it.
            return Ok(());
        };
        click.prevent_default();

        let top = self.host.scroll_below_header(
            &target,
            &self.config.header_selector,
            self.config.header_fallback_offset,
        )?;
        debug!("Smooth scrolling to #{} at {}", id, top);

        self.close_menu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeElement {
        matches: Vec<String>,
        id: Option<String>,
        href: Option<String>,
        classes: HashSet<String>,
        guards: HashSet<String>,
    }

    #[derive(Default)]
    struct FakeDom {
        elements: RefCell<Vec<FakeElement>>,
        handlers: RefCell<Vec<(usize, Rc<RefCell<ClickHandler>>)>>,
        scrolled_to: RefCell<Vec<usize>>,
    }

    impl FakeDom {
        fn add(&self, element: FakeElement) -> usize {
            let mut elements = self.elements.borrow_mut();
            elements.push(element);
            elements.len() - 1
        }

        fn handler_count(&self, node: usize) -> usize {
            self.handlers
                .borrow()
                .iter()
                .filter(|(n, _)| *n == node)
                .count()
        }

        fn click(&self, node: usize) -> Click {
            let handlers: Vec<_> = self
                .handlers
                .borrow()
                .iter()
                .filter(|(n, _)| *n == node)
                .map(|(_, h)| h.clone())
                .collect();
            let click = Click::default();
            for handler in handlers {
                (handler.borrow_mut())(&click);
            }
            click
        }

        fn has(&self, node: usize, class: &str) -> bool {
            self.elements.borrow()[node].classes.contains(class)
        }
    }

    impl NavHost for FakeDom {
        type Node = usize;

        fn query(&self, selector: &str) -> Result<Option<usize>, PageError> {
            Ok(self.query_all(selector)?.into_iter().next())
        }

        fn query_all(&self, selector: &str) -> Result<Vec<usize>, PageError> {
            Ok(self
                .elements
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, el)| el.matches.iter().any(|m| m == selector))
                .map(|(i, _)| i)
                .collect())
        }

        fn by_id(&self, id: &str) -> Option<usize> {
            self.elements
                .borrow()
                .iter()
                .position(|el| el.id.as_deref() == Some(id))
        }

        fn body(&self) -> Result<usize, PageError> {
            self.query("body")?
                .ok_or_else(|| PageError::MissingElement("body".to_string()))
        }

        fn attribute(&self, node: &usize, name: &str) -> Option<String> {
            match name {
                "href" => self.elements.borrow()[*node].href.clone(),
                _ => None,
            }
        }

        fn has_class(&self, node: &usize, class: &str) -> bool {
            self.has(*node, class)
        }

        fn set_class(&self, node: &usize, class: &str, on: bool) -> Result<(), PageError> {
            let mut elements = self.elements.borrow_mut();
            let classes = &mut elements[*node].classes;
            if on {
                classes.insert(class.to_string());
            } else {
                classes.remove(class);
            }
            Ok(())
        }

        fn claim_binding(&self, node: &usize, guard: &str) -> Result<bool, PageError> {
            let mut elements = self.elements.borrow_mut();
            Ok(elements[*node].guards.insert(guard.to_string()))
        }

        fn on_click(&self, node: &usize, handler: ClickHandler) -> Result<(), PageError> {
            self.handlers
                .borrow_mut()
                .push((*node, Rc::new(RefCell::new(handler))));
            Ok(())
        }

        fn scroll_below_header(
            &self,
            target: &usize,
            _header_selector: &str,
            fallback: f64,
        ) -> Result<f64, PageError> {
            self.scrolled_to.borrow_mut().push(*target);
            Ok(fallback)
        }
    }

    fn element(selector: &str) -> FakeElement {
        FakeElement {
            matches: vec![selector.to_string()],
            ..Default::default()
        }
    }

    fn anchor(href: &str) -> FakeElement {
        FakeElement {
            href: Some(href.to_string()),
            ..element("a[href^=\"#\"]")
        }
    }

    fn section(id: &str) -> FakeElement {
        FakeElement {
            id: Some(id.to_string()),
            ..element("section")
        }
    }

    fn open_nav() -> FakeElement {
        let mut nav = element(".nav");
        nav.classes.insert("active".to_string());
        nav
    }

    struct Page {
        nav: Rc<Navigation<FakeDom>>,
        body: usize,
        menu: usize,
        toggle: Option<usize>,
        link: usize,
    }

    fn page(nav: FakeElement, with_toggle: bool, href: &str) -> Page {
        let dom = FakeDom::default();
        let body = dom.add(element("body"));
        let menu = dom.add(nav);
        let toggle = with_toggle.then(|| dom.add(element(".mobile-toggle")));
        let link = dom.add(anchor(href));
        dom.add(section("faq"));
        Page {
            nav: Navigation::new(Rc::new(PageConfig::default()), dom),
            body,
            menu,
            toggle,
            link,
        }
    }

    #[test]
    fn scroll_lock_follows_menu_over_any_toggle_sequence() {
        let mut state = MenuState::default();
        assert!(!state.is_open());
        for _ in 0..7 {
            state.toggle();
            assert_eq!(state.scroll_locked(), state.is_open());
        }
        assert!(state.is_open());
    }

    #[test]
    fn close_reports_whether_it_was_open() {
        let mut state = MenuState::new(true);
        assert!(state.close());
        assert!(!state.is_open());
        assert!(!state.scroll_locked());
        assert!(!state.close());
    }

    #[test]
    fn anchor_targets() {
        assert_eq!(anchor_target_id("#faq"), Some("faq"));
        assert_eq!(anchor_target_id("#"), None);
        assert_eq!(anchor_target_id("/pricing#faq"), None);
        assert_eq!(anchor_target_id(""), None);
    }

    #[test]
    fn offset_subtracts_measured_header() {
        assert_eq!(scroll_target_top(400.0, 1000.0, Some(80.0), 70.0), 1320.0);
    }

    #[test]
    fn offset_falls_back_without_header() {
        assert_eq!(scroll_target_top(400.0, 1000.0, None, 70.0), 1330.0);
        assert_eq!(scroll_target_top(400.0, 1000.0, Some(0.0), 70.0), 1330.0);
    }

    #[test]
    fn repeated_activation_binds_each_element_once() {
        let page = page(element(".nav"), true, "#faq");
        let toggle = page.toggle.unwrap();
        page.nav.activate().unwrap();
        page.nav.activate().unwrap();

        let dom = &page.nav.host;
        assert_eq!(dom.handler_count(toggle), 1);
        assert_eq!(dom.handler_count(page.link), 1);

        dom.click(toggle);
        assert!(dom.has(page.menu, "active"));
        assert!(dom.has(page.body, "no-scroll"));

        dom.click(toggle);
        assert!(!dom.has(page.menu, "active"));
        assert!(!dom.has(page.body, "no-scroll"));
    }

    #[test]
    fn anchor_scroll_closes_open_menu_and_releases_lock() {
        let page = page(element(".nav"), true, "#faq");
        page.nav.activate().unwrap();
        let dom = &page.nav.host;
        dom.click(page.toggle.unwrap());
        assert!(dom.has(page.body, "no-scroll"));

        let click = dom.click(page.link);
        assert!(click.default_prevented());
        assert_eq!(dom.scrolled_to.borrow().len(), 1);
        assert!(!dom.has(page.menu, "active"));
        assert!(!dom.has(page.body, "no-scroll"));
    }

    #[test]
    fn anchor_scroll_closes_menu_without_toggle_button() {
        let page = page(open_nav(), false, "#faq");
        page.nav.activate().unwrap();
        let dom = &page.nav.host;
        assert!(dom.has(page.body, "no-scroll"));

        dom.click(page.link);
        assert!(!dom.has(page.menu, "active"));
        assert!(!dom.has(page.body, "no-scroll"));
    }

    #[test]
    fn missing_target_falls_through_to_browser() {
        let page = page(open_nav(), false, "#nowhere");
        page.nav.activate().unwrap();
        let dom = &page.nav.host;

        let click = dom.click(page.link);
        assert!(!click.default_prevented());
        assert!(dom.scrolled_to.borrow().is_empty());
        assert!(dom.has(page.menu, "active"));
    }

    #[test]
    fn anchors_added_later_are_bound_on_next_activation() {
        let page = page(element(".nav"), false, "#faq");
        page.nav.activate().unwrap();
        let dom = &page.nav.host;
        let late = dom.add(anchor("#faq"));

        page.nav.activate().unwrap();
        assert_eq!(dom.handler_count(late), 1);
        assert_eq!(dom.handler_count(page.link), 1);
    }
}
