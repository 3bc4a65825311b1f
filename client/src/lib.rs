use wasm_bindgen::prelude::*;

pub mod config;
pub mod recorder;

use common::{Presenter, RecordingSession, Status};
use config::ClientConfig;
use recorder::host::BrowserHost;
use recorder::ui::{setup_recording_buttons, DomPresenter};
use recorder::state;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// Build the page's recording session. `config` is an optional object
/// matching [`ClientConfig`]; `undefined` or `null` keeps the defaults.
#[wasm_bindgen]
pub fn init(config: JsValue) -> Result<(), JsValue> {
    if state::session().is_ok() {
        return Err(JsValue::from_str("Recorder already initialized"));
    }

    let config: ClientConfig = if config.is_undefined() || config.is_null() {
        ClientConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    wasm_logger::init(wasm_logger::Config::new(config.log_level()));

    let presenter = DomPresenter::new(&config)?;
    setup_recording_buttons(presenter.document(), &config.elements);
    presenter.show_status(&Status::Ready);
    presenter.set_recording_controls(false);

    let session = RecordingSession::new(BrowserHost, presenter, config.session.clone());
    state::install(session)?;

    log::info!("Screen recorder initialized");
    Ok(())
}

#[wasm_bindgen]
pub async fn start_record() -> Result<(), JsValue> {
    state::start_recording().await
}

/// Stop and return the saved recording's summary.
#[wasm_bindgen]
pub async fn stop_record() -> Result<JsValue, JsValue> {
    let recording = state::stop_recording().await?;
    Ok(serde_wasm_bindgen::to_value(&recording)?)
}

#[wasm_bindgen]
pub fn clear_recordings() -> Result<(), JsValue> {
    state::clear_recordings()
}

/// Summaries of every recording currently listed on the page.
#[wasm_bindgen]
pub fn recordings() -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&state::recordings()?)?)
}
