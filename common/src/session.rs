//! Recording session lifecycle: acquire, combine, record, stop, finalize.

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::artifact::{resolve_file_name, OutputArtifact, PublishedRecording, RecordingMetadata};
use crate::buffer::{ChunkBuffer, RecorderEvents, SharedChunkBuffer};
use crate::config::SessionConfig;
use crate::constraints::CaptureConstraints;
use crate::error::SessionError;
use crate::host::{ArtifactBlob, MediaHost, MediaRecorder};
use crate::media::{combine, stop_all_tracks, MediaStream};
use crate::presenter::{OutputSettings, Presenter};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Acquiring,
    Recording,
    Finalizing,
}

struct ActiveCapture<H: MediaHost> {
    stream: H::Stream,
    recorder: H::Recorder,
    events: RecorderEvents<H::Chunk>,
    stop_rx: oneshot::Receiver<()>,
}

struct TakeInfo {
    started_at_ms: f64,
    recorder_mime_type: Option<String>,
}

/// The one recording session of a page.
///
/// All methods take `&self`; state lives in cells so that a stop issued from
/// one event handler can reach a session started from another. No borrow is
/// held across an await point.
pub struct RecordingSession<H, P>
where
    H: MediaHost,
    P: Presenter<Stream = H::Stream, Blob = H::Blob>,
{
    host: H,
    presenter: P,
    config: SessionConfig,
    phase: Cell<SessionPhase>,
    active: RefCell<Option<ActiveCapture<H>>>,
    take: RefCell<Option<TakeInfo>>,
    buffer: SharedChunkBuffer<H::Chunk>,
    published: RefCell<Vec<PublishedRecording>>,
}

impl<H, P> RecordingSession<H, P>
where
    H: MediaHost,
    P: Presenter<Stream = H::Stream, Blob = H::Blob>,
{
    pub fn new(host: H, presenter: P, config: SessionConfig) -> Self {
        Self {
            host,
            presenter,
            config,
            phase: Cell::new(SessionPhase::Idle),
            active: RefCell::new(None),
            take: RefCell::new(None),
            buffer: Rc::new(RefCell::new(ChunkBuffer::new())),
            published: RefCell::new(Vec::new()),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    pub fn is_recording(&self) -> bool {
        self.phase.get() == SessionPhase::Recording
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Combined stream being recorded, if any.
    pub fn active_stream(&self) -> Option<H::Stream> {
        self.active.borrow().as_ref().map(|a| a.stream.clone())
    }

    /// Artifacts currently listed, oldest first.
    pub fn recordings(&self) -> Vec<PublishedRecording> {
        self.published.borrow().clone()
    }

    /// Acquire microphone and screen, combine them, and begin recording.
    ///
    /// A capture failure is shown on the status indicator and returned; it is
    /// never retried.
    pub async fn start(&self) -> Result<(), SessionError> {
        let phase = self.phase.get();
        if phase != SessionPhase::Idle {
            log::warn!("Start requested while session is {:?}", phase);
            return Err(SessionError::AlreadyRecording);
        }

        self.phase.set(SessionPhase::Acquiring);
        log::info!("Starting recording");

        match self.acquire_and_record().await {
            Ok(active) => {
                *self.active.borrow_mut() = Some(active);
                self.phase.set(SessionPhase::Recording);
                self.presenter.show_status(&Status::Recording);
                self.presenter.set_recording_controls(true);
                log::info!("Recording started");
                Ok(())
            }
            Err(e) => {
                self.phase.set(SessionPhase::Idle);
                log::error!("Failed to start recording: {}", e);
                self.presenter.show_status(&Status::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn acquire_and_record(&self) -> Result<ActiveCapture<H>, SessionError> {
        // Microphone prompt comes before the screen picker.
        let audio = self.host.user_media(&CaptureConstraints::microphone()).await?;
        log::debug!("Microphone granted ({} tracks)", audio.tracks().len());

        let screen = match self.host.display_media(&CaptureConstraints::screen()).await {
            Ok(screen) => screen,
            Err(e) => {
                stop_all_tracks(&audio);
                return Err(e.into());
            }
        };
        log::debug!("Screen granted ({} tracks)", screen.tracks().len());

        let combined = combine(&audio, &screen);
        self.presenter.bind_preview(Some(&combined));

        match self.record(&combined) {
            Ok((recorder, events, stop_rx)) => Ok(ActiveCapture {
                stream: combined,
                recorder,
                events,
                stop_rx,
            }),
            Err(e) => {
                self.presenter.bind_preview(None);
                stop_all_tracks(&combined);
                Err(e)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn record(
        &self,
        stream: &H::Stream,
    ) -> Result<(H::Recorder, RecorderEvents<H::Chunk>, oneshot::Receiver<()>), SessionError> {
        let stale = self.buffer.borrow_mut().drain();
        if !stale.is_empty() {
            log::warn!("Discarding {} chunks left from an earlier session", stale.len());
        }

        let (events, stop_rx) = RecorderEvents::new(self.buffer.clone());
        let recorder = self.host.create_recorder(stream, events.clone())?;

        events.begin();
        if let Err(e) = recorder.start(self.config.timeslice_ms) {
            events.stopped();
            return Err(e);
        }

        *self.take.borrow_mut() = Some(TakeInfo {
            started_at_ms: self.host.now_ms(),
            recorder_mime_type: recorder.mime_type().filter(|m| !m.is_empty()),
        });

        Ok((recorder, events, stop_rx))
    }

    /// Halt the recorder and every track, then finalize once the recorder
    /// has delivered its last chunk.
    pub async fn stop(&self) -> Result<OutputArtifact<H::Blob>, SessionError> {
        let active = self
            .active
            .borrow_mut()
            .take()
            .ok_or(SessionError::NotRecording)?;

        self.phase.set(SessionPhase::Finalizing);
        log::info!("Stopping recording");

        let ActiveCapture {
            stream,
            recorder,
            events,
            stop_rx,
        } = active;

        if let Err(e) = recorder.stop() {
            log::warn!("Recorder did not stop cleanly: {}", e);
            events.stopped();
        }

        let total = stream.tracks().len();
        let failed = stop_all_tracks(&stream);
        if failed > 0 {
            log::warn!("{} of {} tracks failed to stop", failed, total);
        }

        self.presenter.bind_preview(None);
        self.presenter.set_recording_controls(false);
        self.presenter.show_status(&Status::Saved);
        self.presenter.reveal_recordings();

        drop(events);
        if stop_rx.await.is_err() {
            log::warn!("Recorder went away without signalling stop, finalizing buffered chunks");
        }
        drop(recorder);

        let settings = self.presenter.output_settings();
        let result = self.finalize(&settings);
        self.phase.set(SessionPhase::Idle);

        if let Err(e) = &result {
            log::error!("Failed to finalize recording: {}", e);
            self.presenter.show_status(&Status::Failed(e.to_string()));
        }
        result
    }

    /// Assemble every buffered chunk into one artifact and publish it.
    /// Leaves the buffer empty.
    pub fn finalize(
        &self,
        settings: &OutputSettings,
    ) -> Result<OutputArtifact<H::Blob>, SessionError> {
        let take = self.take.borrow_mut().take();
        let chunks = self.buffer.borrow_mut().drain();
        let chunk_count = chunks.len();

        let format = settings.format.unwrap_or(self.config.default_format);
        let mime_type = format.mime_type();

        let recorder_mime_type = take.as_ref().and_then(|t| t.recorder_mime_type.clone());
        if let Some(native) = &recorder_mime_type {
            if !format.matches_mime(native) {
                log::warn!(
                    "Recorder produced {} but the file is labelled {}; the container is not converted",
                    native,
                    mime_type
                );
            }
        }

        let blob = self.host.assemble(chunks, &mime_type)?;
        let file_name = resolve_file_name(&settings.file_name, &self.config.default_file_name);

        let playback_url = self.host.create_object_url(&blob)?;
        let download_url = match self.host.create_object_url(&blob) {
            Ok(url) => url,
            Err(e) => {
                self.host.revoke_object_url(&playback_url);
                return Err(e);
            }
        };

        let stopped_at_ms = self.host.now_ms();
        let started_at_ms = take.map(|t| t.started_at_ms).unwrap_or(stopped_at_ms);

        let artifact = OutputArtifact {
            format,
            mime_type,
            file_name,
            playback_url,
            download_url,
            metadata: RecordingMetadata {
                started_at_ms,
                stopped_at_ms,
                duration_ms: (stopped_at_ms - started_at_ms).max(0.0),
                chunk_count,
                size_bytes: blob.size(),
                recorder_mime_type,
            },
            blob,
        };

        self.presenter.publish(&artifact);
        self.published
            .borrow_mut()
            .push(PublishedRecording::from(&artifact));

        log::info!(
            "Saved {} ({}, {} chunks, {} bytes)",
            artifact.file_name,
            artifact.mime_type,
            chunk_count,
            artifact.metadata.size_bytes
        );
        Ok(artifact)
    }

    /// Revoke the URLs of every listed artifact and remove them from view.
    pub fn clear_recordings(&self) {
        let published = std::mem::take(&mut *self.published.borrow_mut());
        for recording in &published {
            self.host.revoke_object_url(&recording.playback_url);
            self.host.revoke_object_url(&recording.download_url);
        }
        self.presenter.clear_recordings();
        log::info!("Cleared {} recordings", published.len());
    }
}
