use log::{error, info};

mod accordion;
mod config;
mod dom;
mod error;
mod form;
mod layout;
mod nav;
mod page;
mod ready;
mod reveal;
mod scroll;

fn run() {
    if let Err(e) = page::start() {
        error!("Page controller failed to start: {}", e);
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    if let Err(e) = console_log::init_with_level(config::log_level()) {
        gloo_console::error!(format!("error initializing log: {}", e));
    }

    info!("Starting landing page controller");

    let document = match dom::document() {
        Ok(document) => document,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if document.ready_state() != "loading" {
        run();
        return;
    }

    if let Err(e) = dom::listen(&document, "DOMContentLoaded", |_| run()) {
        error!("Could not wait for DOMContentLoaded: {}", e);
    }
}
