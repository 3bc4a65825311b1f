use common::{MediaRecorder, RecorderEvents, SessionError};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobEvent};

use crate::recorder::media_streams::BrowserStream;

fn recorder_error(err: JsValue) -> SessionError {
    SessionError::Recorder(format!("{:?}", err))
}

/// `MediaRecorder` over a combined stream. Owns the callbacks it installs;
/// they are detached when the recorder is dropped.
pub struct BrowserRecorder {
    inner: web_sys::MediaRecorder,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
    _on_stop: Closure<dyn FnMut()>,
}

impl BrowserRecorder {
    pub fn new(stream: &BrowserStream, events: RecorderEvents<Blob>) -> Result<Self, SessionError> {
        let media_stream = stream.to_media_stream().map_err(recorder_error)?;
        let inner =
            web_sys::MediaRecorder::new_with_media_stream(&media_stream).map_err(recorder_error)?;

        let data_events = events.clone();
        let on_data = Closure::wrap(Box::new(move |event: BlobEvent| {
            match event.data() {
                Some(blob) if blob.size() > 0.0 => data_events.chunk_available(blob),
                Some(_) => log::debug!("Skipping empty chunk"),
                None => log::debug!("dataavailable without data"),
            }
        }) as Box<dyn FnMut(BlobEvent)>);

        let on_stop = Closure::wrap(Box::new(move || {
            log::debug!("Recorder stop event");
            events.stopped();
        }) as Box<dyn FnMut()>);

        inner.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        inner.set_onstop(Some(on_stop.as_ref().unchecked_ref()));

        Ok(Self {
            inner,
            _on_data: on_data,
            _on_stop: on_stop,
        })
    }
}

impl MediaRecorder for BrowserRecorder {
    fn start(&self, timeslice_ms: Option<u32>) -> Result<(), SessionError> {
        match timeslice_ms {
            Some(ms) => self
                .inner
                .start_with_time_slice(ms.min(i32::MAX as u32) as i32),
            None => self.inner.start(),
        }
        .map_err(recorder_error)
    }

    fn stop(&self) -> Result<(), SessionError> {
        self.inner.stop().map_err(recorder_error)
    }

    fn mime_type(&self) -> Option<String> {
        Some(self.inner.mime_type())
    }
}

impl Drop for BrowserRecorder {
    fn drop(&mut self) {
        self.inner.set_ondataavailable(None);
        self.inner.set_onstop(None);
    }
}
