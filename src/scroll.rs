use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::config::PageConfig;
use crate::dom;
use crate::error::PageError;

/// True once the hero has scrolled fully above the viewport and the closing
/// CTA section has not yet entered it from below.
pub fn cta_visible(
    hero_bottom: f64,
    cta_top: Option<f64>,
    viewport_height: f64,
    fallback_margin: f64,
) -> bool {
    let cta_top = cta_top.unwrap_or(viewport_height + fallback_margin);
    hero_bottom < 0.0 && cta_top > viewport_height
}

/// Something that can run a callback on the next rendering frame.
pub trait FrameHost {
    type Handle: Copy;

    fn request_frame(&self) -> Option<Self::Handle>;
    fn cancel_frame(&self, handle: Self::Handle);
}

/// Keeps at most one frame request outstanding. Each `schedule` replaces the
/// previous pending request.
pub struct FrameCoalescer<H: FrameHost> {
    host: H,
    pending: Cell<Option<H::Handle>>,
}

impl<H: FrameHost> FrameCoalescer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            pending: Cell::new(None),
        }
    }

    pub fn schedule(&self) {
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
        self.pending.set(self.host.request_frame());
    }

    /// Called from the frame callback before doing the work.
    pub fn complete(&self) {
        self.pending.set(None);
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    #[cfg(test)]
    fn host(&self) -> &H {
        &self.host
    }
}

struct WindowFrames {
    window: Window,
    callback: js_sys::Function,
}

impl FrameHost for WindowFrames {
    type Handle = i32;

    fn request_frame(&self) -> Option<i32> {
        match self.window.request_animation_frame(&self.callback) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }
}

struct FixedCta {
    window: Window,
    document: Document,
    cta: HtmlElement,
    hero_id: String,
    cta_section_id: String,
    fallback_margin: f64,
}

impl FixedCta {
    fn update(&self) -> Result<(), PageError> {
        let Some(hero) = self.document.get_element_by_id(&self.hero_id) else {
            return Ok(());
        };
        let cta_top = self
            .document
            .get_element_by_id(&self.cta_section_id)
            .map(|section| section.get_bounding_client_rect().top());
        let visible = cta_visible(
            hero.get_bounding_client_rect().bottom(),
            cta_top,
            dom::viewport_height(&self.window)?,
            self.fallback_margin,
        );
        dom::set_style(&self.cta, "display", if visible { "block" } else { "none" })
    }
}

pub fn init(config: &PageConfig) -> Result<(), PageError> {
    let window = dom::window()?;
    let document = dom::document()?;

    let cta = document
        .get_element_by_id(&config.fixed_cta_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let (Some(cta), true) = (cta, document.get_element_by_id(&config.hero_id).is_some()) else {
        debug!("No #{} or #{}, floating CTA disabled", config.fixed_cta_id, config.hero_id);
        return Ok(());
    };

    let fixed = Rc::new(FixedCta {
        window: window.clone(),
        document,
        cta,
        hero_id: config.hero_id.clone(),
        cta_section_id: config.cta_section_id.clone(),
        fallback_margin: config.cta_fallback_margin,
    });

    let frames: Rc<OnceCell<FrameCoalescer<WindowFrames>>> = Rc::new(OnceCell::new());

    let on_frame = {
        let frames = frames.clone();
        let fixed = fixed.clone();
        Closure::wrap(Box::new(move || {
            if let Some(frames) = frames.get() {
                frames.complete();
            }
            if let Err(e) = fixed.update() {
                warn!("Floating CTA update failed: {}", e);
            }
        }) as Box<dyn FnMut()>)
    };
    let _ = frames.set(FrameCoalescer::new(WindowFrames {
        window: window.clone(),
        callback: on_frame.as_ref().unchecked_ref::<js_sys::Function>().clone(),
    }));
    on_frame.forget();

    dom::listen(&window, "scroll", move |_| {
        if let Some(frames) = frames.get() {
            frames.schedule();
        }
    })?;

    // Initial check for pages restored mid-scroll.
    fixed.update()?;
    info!("Floating CTA visibility bound to scroll");
    Ok(())
}
