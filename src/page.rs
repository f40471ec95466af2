use std::rc::Rc;

use log::{error, info};

use crate::config::PageConfig;
use crate::dom;
use crate::error::PageError;
use crate::layout::LayoutLoader;
use crate::nav::{DomNav, Navigation};
use crate::{accordion, form, reveal, scroll};

/// Wires every behavior unit onto the current document. A unit that fails
/// to bind is logged and skipped; the others still run.
pub fn start() -> Result<(), PageError> {
    let document = dom::document()?;
    let config = Rc::new(PageConfig::load(&document));

    let navigation = Navigation::new(config.clone(), DomNav::new()?);
    isolate("navigation", navigation.activate());

    let layout = LayoutLoader::new(&config);
    {
        let navigation = navigation.clone();
        layout.header_ready().subscribe(move || {
            isolate("navigation", navigation.activate());
        });
    }
    layout.start(&document);

    isolate("accordion", accordion::init(&config));
    isolate("contact form", form::init(&config));
    isolate("floating cta", scroll::init(&config));
    isolate("reveal", reveal::init(&config));

    info!("Page controller started");
    Ok(())
}

fn isolate(unit: &str, result: Result<(), PageError>) {
    if let Err(e) = result {
        error!("{} unavailable: {}", unit, e);
    }
}
