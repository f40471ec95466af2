use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("no window or document available")]
    NoDocument,

    #[error("required element not found: {0}")]
    MissingElement(String),

    #[error("javascript error: {0}")]
    Js(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] gloo_net::Error),

    #[error("fragment {path} returned status {status}")]
    FragmentStatus { path: String, status: u16 },
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        PageError::Js(message)
    }
}
