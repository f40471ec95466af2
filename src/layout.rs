use std::rc::Rc;

use gloo_net::http::Request;
use log::{debug, error, info};
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use crate::config::PageConfig;
use crate::error::PageError;
use crate::ready::ReadySignal;

/// A named insertion point and the partial that fills it.
pub struct Fragment {
    pub name: &'static str,
    pub mount_id: String,
    pub path: String,
    pub ready: Rc<ReadySignal>,
}

pub struct LayoutLoader {
    pub header: Fragment,
    pub footer: Fragment,
}

impl LayoutLoader {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            header: Fragment {
                name: "header",
                mount_id: config.header_mount_id.clone(),
                path: config.header_fragment_path.clone(),
                ready: Rc::new(ReadySignal::new()),
            },
            footer: Fragment {
                name: "footer",
                mount_id: config.footer_mount_id.clone(),
                path: config.footer_fragment_path.clone(),
                ready: Rc::new(ReadySignal::new()),
            },
        }
    }

    pub fn header_ready(&self) -> Rc<ReadySignal> {
        self.header.ready.clone()
    }

    /// Kicks off both fetches. Completion order is not guaranteed.
    pub fn start(&self, document: &Document) {
        for fragment in [&self.header, &self.footer] {
            load(document, fragment);
        }
    }
}

fn load(document: &Document, fragment: &Fragment) {
    let Some(mount) = document.get_element_by_id(&fragment.mount_id) else {
        debug!("No #{} mount point, skipping {} fragment", fragment.mount_id, fragment.name);
        return;
    };

    let name = fragment.name;
    let path = fragment.path.clone();
    let ready = fragment.ready.clone();

    spawn_local(async move {
        match fetch_fragment(&path).await {
            Ok(html) => {
                mount.set_inner_html(&html);
                info!("Installed {} fragment from {}", name, path);
                ready.fire();
            }
            Err(e) => {
                // Mount point stays as rendered by the server.
                error!("{} load failed: {}", name, e);
            }
        }
    });
}

pub async fn fetch_fragment(path: &str) -> Result<String, PageError> {
    let response = Request::get(path).send().await?;
    if !response.ok() {
        return Err(PageError::FragmentStatus {
            path: path.to_string(),
            status: response.status(),
        });
    }
    Ok(response.text().await?)
}
