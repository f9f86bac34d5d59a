use std::cell::RefCell;
use std::rc::Rc;

use medseek_chat::ClientConfig;
use medseek_types::ClientError;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod api;
mod app;
mod chat_ui;
mod dom;
pub mod markdown;
mod session_setup;
pub mod utils;
mod viewport;
mod websocket;

thread_local! {
    static APP: RefCell<Option<Rc<app::App>>> = const { RefCell::new(None) };
}

/// Set up panic hooks as soon as the module loads
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Start the client. `config_json` is an optional JSON client configuration;
/// omitted fields take their defaults.
#[wasm_bindgen]
pub fn start_app(config_json: Option<String>) -> Result<(), JsValue> {
    if APP.with(|slot| slot.borrow().is_some()) {
        return Err(JsValue::from_str("MedSeek is already running"));
    }

    let config = ClientConfig::from_json(config_json.as_deref()).map_err(to_js)?;

    wasm_logger::init(wasm_logger::Config::new(config.level().map_err(to_js)?));
    log::info!("MedSeek WASM initialized");

    let app = app::App::new(config)?;
    app.start()?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));

    Ok(())
}

/// Convert a client error for the JS boundary
pub(crate) fn to_js(e: ClientError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
