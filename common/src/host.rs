//! Services the session needs from its host runtime.
//!
//! In the browser these are getUserMedia/getDisplayMedia, MediaRecorder,
//! Blob and URL; tests plug in an in-memory implementation.

use crate::artifact::ObjectUrl;
use crate::buffer::RecorderEvents;
use crate::constraints::CaptureConstraints;
use crate::error::{CaptureError, SessionError};
use crate::media::{MediaStream, MediaTrack};

/// Host recorder bound to one stream. Reports chunks and its stop through
/// the [`RecorderEvents`] it was created with.
pub trait MediaRecorder {
    fn start(&self, timeslice_ms: Option<u32>) -> Result<(), SessionError>;
    fn stop(&self) -> Result<(), SessionError>;

    /// Output type the recorder picked for itself, when the host exposes it.
    fn mime_type(&self) -> Option<String> {
        None
    }
}

pub trait ArtifactBlob {
    fn size(&self) -> u64;
}

// Single-threaded host: futures returned here are never sent across threads.
#[allow(async_fn_in_trait)]
pub trait MediaHost {
    type Track: MediaTrack;
    type Stream: MediaStream<Track = Self::Track>;
    type Chunk;
    type Recorder: MediaRecorder;
    type Blob: ArtifactBlob;

    /// Audio/camera capture. May suspend on a permission prompt.
    async fn user_media(&self, constraints: &CaptureConstraints)
        -> Result<Self::Stream, CaptureError>;

    /// Screen capture. May suspend on a share-picker prompt.
    async fn display_media(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Self::Stream, CaptureError>;

    fn create_recorder(
        &self,
        stream: &Self::Stream,
        events: RecorderEvents<Self::Chunk>,
    ) -> Result<Self::Recorder, SessionError>;

    /// Concatenate chunks into one blob declared as `mime_type`.
    fn assemble(&self, chunks: Vec<Self::Chunk>, mime_type: &str)
        -> Result<Self::Blob, SessionError>;

    fn create_object_url(&self, blob: &Self::Blob) -> Result<ObjectUrl, SessionError>;

    fn revoke_object_url(&self, url: &ObjectUrl);

    /// Wall clock in milliseconds since the epoch.
    fn now_ms(&self) -> f64;
}
