use common::{PublishedRecording, RecordingSession, SessionError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::recorder::host::BrowserHost;
use crate::recorder::media_streams::add_screen_stop_listener;
use crate::recorder::ui::DomPresenter;

pub type BrowserSession = RecordingSession<BrowserHost, DomPresenter>;

thread_local! {
    static SESSION: RefCell<Option<Rc<BrowserSession>>> = const { RefCell::new(None) };
}

pub fn install(session: BrowserSession) -> Result<(), JsValue> {
    SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(JsValue::from_str("Recorder already initialized"));
        }
        *slot = Some(Rc::new(session));
        Ok(())
    })
}

pub fn session() -> Result<Rc<BrowserSession>, JsValue> {
    SESSION
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("Recorder not initialized, call init() first"))
}

fn to_js_error(e: SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

pub async fn start_recording() -> Result<(), JsValue> {
    let session = session()?;
    session.start().await.map_err(to_js_error)?;

    if let Some(stream) = session.active_stream() {
        let on_ended = Box::new(|| {
            log::info!("Screen sharing ended from the browser");
            wasm_bindgen_futures::spawn_local(async {
                let recording = self::session().map(|s| s.is_recording()).unwrap_or(false);
                if recording {
                    if let Err(e) = stop_recording().await {
                        log::error!("Stop after share ended failed: {:?}", e);
                    }
                }
            });
        });
        if let Err(e) = add_screen_stop_listener(&stream, on_ended) {
            log::warn!("Could not watch for the share ending: {:?}", e);
        }
    }
    Ok(())
}

pub async fn stop_recording() -> Result<PublishedRecording, JsValue> {
    let session = session()?;
    let artifact = session.stop().await.map_err(to_js_error)?;
    Ok(PublishedRecording::from(&artifact))
}

pub fn clear_recordings() -> Result<(), JsValue> {
    session()?.clear_recordings();
    Ok(())
}

pub fn recordings() -> Result<Vec<PublishedRecording>, JsValue> {
    Ok(session()?.recordings())
}
