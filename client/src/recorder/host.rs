use common::{
    ArtifactBlob, CaptureConstraints, CaptureError, MediaHost, ObjectUrl, RecorderEvents,
    SessionError,
};
use web_sys::{Blob, BlobPropertyBag, Url};

use crate::recorder::media_recorder::BrowserRecorder;
use crate::recorder::media_streams::{self, BrowserStream, BrowserTrack};

/// Recorded output held by the page.
#[derive(Clone)]
pub struct BrowserBlob(pub Blob);

impl ArtifactBlob for BrowserBlob {
    fn size(&self) -> u64 {
        self.0.size() as u64
    }
}

#[derive(Default)]
pub struct BrowserHost;

impl MediaHost for BrowserHost {
    type Track = BrowserTrack;
    type Stream = BrowserStream;
    type Chunk = Blob;
    type Recorder = BrowserRecorder;
    type Blob = BrowserBlob;

    async fn user_media(&self, constraints: &CaptureConstraints) -> Result<BrowserStream, CaptureError> {
        media_streams::get_user_media(constraints).await
    }

    async fn display_media(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<BrowserStream, CaptureError> {
        media_streams::get_display_media(constraints).await
    }

    fn create_recorder(
        &self,
        stream: &BrowserStream,
        events: RecorderEvents<Blob>,
    ) -> Result<BrowserRecorder, SessionError> {
        BrowserRecorder::new(stream, events)
    }

    fn assemble(&self, chunks: Vec<Blob>, mime_type: &str) -> Result<BrowserBlob, SessionError> {
        let parts: js_sys::Array = chunks.iter().collect();
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);

        Blob::new_with_blob_sequence_and_options(&parts, &options)
            .map(BrowserBlob)
            .map_err(|e| SessionError::Artifact(format!("{:?}", e)))
    }

    fn create_object_url(&self, blob: &BrowserBlob) -> Result<ObjectUrl, SessionError> {
        Url::create_object_url_with_blob(&blob.0)
            .map(ObjectUrl)
            .map_err(|e| SessionError::Artifact(format!("{:?}", e)))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        if let Err(e) = Url::revoke_object_url(url.as_str()) {
            log::warn!("Failed to revoke {}: {:?}", url, e);
        }
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}
