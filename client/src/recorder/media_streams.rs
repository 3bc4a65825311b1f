use common::{CaptureConstraints, CaptureError, MediaStream, MediaTrack, TrackKind};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DisplayMediaStreamConstraints, DomException, MediaStreamConstraints};

#[derive(Clone)]
pub struct BrowserTrack(web_sys::MediaStreamTrack);

impl BrowserTrack {
    pub fn inner(&self) -> &web_sys::MediaStreamTrack {
        &self.0
    }
}

impl MediaTrack for BrowserTrack {
    fn id(&self) -> String {
        self.0.id()
    }

    fn kind(&self) -> Option<TrackKind> {
        TrackKind::from_str_loose(&self.0.kind())
    }

    fn stop(&self) -> Result<(), String> {
        self.0.stop();
        Ok(())
    }
}

/// Track list behind a capture. A `web_sys::MediaStream` over the same
/// tracks is built on demand for the preview and the recorder.
#[derive(Clone)]
pub struct BrowserStream {
    tracks: Vec<BrowserTrack>,
}

impl BrowserStream {
    pub fn to_media_stream(&self) -> Result<web_sys::MediaStream, JsValue> {
        let tracks: js_sys::Array = self.tracks.iter().map(|t| t.inner()).collect();
        web_sys::MediaStream::new_with_tracks(&tracks)
    }
}

impl From<web_sys::MediaStream> for BrowserStream {
    fn from(stream: web_sys::MediaStream) -> Self {
        let tracks = stream
            .get_tracks()
            .iter()
            .map(|t| BrowserTrack(web_sys::MediaStreamTrack::from(t)))
            .collect();
        Self { tracks }
    }
}

impl MediaStream for BrowserStream {
    type Track = BrowserTrack;

    fn tracks(&self) -> Vec<BrowserTrack> {
        self.tracks.clone()
    }

    fn from_tracks(tracks: Vec<BrowserTrack>) -> Self {
        Self { tracks }
    }
}

fn media_devices() -> Result<web_sys::MediaDevices, CaptureError> {
    let window =
        web_sys::window().ok_or_else(|| CaptureError::Unavailable("No window".to_string()))?;
    window.navigator().media_devices().map_err(capture_error)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, CaptureError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| CaptureError::Unavailable(e.to_string()))
}

pub async fn get_user_media(
    constraints: &CaptureConstraints,
) -> Result<BrowserStream, CaptureError> {
    let media_devices = media_devices()?;

    let js_constraints = MediaStreamConstraints::new();
    js_constraints.set_audio(&to_js(&constraints.audio)?);
    js_constraints.set_video(&to_js(&constraints.video)?);

    let promise = media_devices
        .get_user_media_with_constraints(&js_constraints)
        .map_err(capture_error)?;
    let stream_js = JsFuture::from(promise).await.map_err(capture_error)?;
    Ok(BrowserStream::from(web_sys::MediaStream::from(stream_js)))
}

pub async fn get_display_media(
    constraints: &CaptureConstraints,
) -> Result<BrowserStream, CaptureError> {
    let media_devices = media_devices()?;

    let js_constraints = DisplayMediaStreamConstraints::new();
    js_constraints.set_audio(&to_js(&constraints.audio)?);
    js_constraints.set_video(&to_js(&constraints.video)?);

    let promise = media_devices
        .get_display_media_with_constraints(&js_constraints)
        .map_err(capture_error)?;
    let stream_js = JsFuture::from(promise).await.map_err(capture_error)?;
    Ok(BrowserStream::from(web_sys::MediaStream::from(stream_js)))
}

/// Map a rejected capture promise to a `CaptureError` carrying the
/// browser's message.
pub fn capture_error(err: JsValue) -> CaptureError {
    let (name, message) = if let Some(dom) = err.dyn_ref::<DomException>() {
        (dom.name(), dom.message())
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        (String::from(js_err.name()), String::from(js_err.message()))
    } else {
        (String::new(), err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    };

    log::debug!("Capture rejected: {} {}", name, message);
    classify(&name, message)
}

fn classify(name: &str, message: String) -> CaptureError {
    match name {
        "NotAllowedError" | "SecurityError" => CaptureError::PermissionDenied(message),
        _ => CaptureError::Unavailable(message),
    }
}

/// Invoke `callback` when the user ends the share from the browser's own UI.
pub fn add_screen_stop_listener(
    stream: &BrowserStream,
    callback: Box<dyn Fn()>,
) -> Result<(), JsValue> {
    if let Some(track) = stream.tracks_of_kind(TrackKind::Video).first() {
        let closure = Closure::wrap(callback);
        track
            .inner()
            .add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
