//! Session lifecycle tests against an in-memory host and presenter.

use common::{
    CaptureConstraints, CaptureError, ContainerFormat, MediaHost, MediaRecorder, MediaStream,
    MediaTrack, ObjectUrl, OutputArtifact, OutputSettings, Presenter, RecorderEvents,
    RecordingSession, SessionConfig, SessionError, SessionPhase, Status, TrackKind,
};
use common::{ArtifactBlob, RecorderState};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone)]
struct FakeTrack {
    id: String,
    kind: TrackKind,
    stops: Rc<Cell<u32>>,
    fail_stop: bool,
}

impl FakeTrack {
    fn new(id: &str, kind: TrackKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            stops: Rc::new(Cell::new(0)),
            fail_stop: false,
        }
    }

    fn failing(id: &str, kind: TrackKind) -> Self {
        Self {
            fail_stop: true,
            ..Self::new(id, kind)
        }
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> Option<TrackKind> {
        Some(self.kind)
    }

    fn stop(&self) -> Result<(), String> {
        self.stops.set(self.stops.get() + 1);
        if self.fail_stop {
            Err("track already detached".to_string())
        } else {
            Ok(())
        }
    }
}

#[derive(Clone)]
struct FakeStream(Vec<FakeTrack>);

impl MediaStream for FakeStream {
    type Track = FakeTrack;

    fn tracks(&self) -> Vec<FakeTrack> {
        self.0.clone()
    }

    fn from_tracks(tracks: Vec<FakeTrack>) -> Self {
        FakeStream(tracks)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Bytes(Vec<u8>, String);

impl ArtifactBlob for Bytes {
    fn size(&self) -> u64 {
        self.0.len() as u64
    }
}

struct FakeRecorder {
    events: RecorderEvents<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    signal_stop: bool,
    fail_stop: bool,
    mime_type: Option<String>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MediaRecorder for FakeRecorder {
    fn start(&self, timeslice_ms: Option<u32>) -> Result<(), SessionError> {
        self.calls
            .borrow_mut()
            .push(format!("start:{:?}", timeslice_ms));
        Ok(())
    }

    fn stop(&self) -> Result<(), SessionError> {
        self.calls.borrow_mut().push("stop".to_string());
        if self.fail_stop {
            return Err(SessionError::Recorder("InvalidStateError".to_string()));
        }
        if let Some(chunk) = &self.final_chunk {
            self.events.chunk_available(chunk.clone());
        }
        if self.signal_stop {
            self.events.stopped();
        }
        Ok(())
    }

    fn mime_type(&self) -> Option<String> {
        self.mime_type.clone()
    }
}

struct FakeHost {
    audio: RefCell<Result<FakeStream, CaptureError>>,
    screen: RefCell<Result<FakeStream, CaptureError>>,
    requests: RefCell<Vec<CaptureConstraints>>,
    events: RefCell<Option<RecorderEvents<Vec<u8>>>>,
    recorders_created: Cell<u32>,
    recorder_calls: Rc<RefCell<Vec<String>>>,
    final_chunk: RefCell<Option<Vec<u8>>>,
    signal_stop: Cell<bool>,
    fail_recorder_stop: Cell<bool>,
    recorder_mime_type: RefCell<Option<String>>,
    next_url: Cell<u32>,
    revoked: RefCell<Vec<ObjectUrl>>,
    clock: Cell<f64>,
}

impl FakeHost {
    fn granting(audio: FakeStream, screen: FakeStream) -> Self {
        Self {
            audio: RefCell::new(Ok(audio)),
            screen: RefCell::new(Ok(screen)),
            requests: RefCell::new(Vec::new()),
            events: RefCell::new(None),
            recorders_created: Cell::new(0),
            recorder_calls: Rc::new(RefCell::new(Vec::new())),
            final_chunk: RefCell::new(None),
            signal_stop: Cell::new(true),
            fail_recorder_stop: Cell::new(false),
            recorder_mime_type: RefCell::new(None),
            next_url: Cell::new(0),
            revoked: RefCell::new(Vec::new()),
            clock: Cell::new(1_000.0),
        }
    }

    fn deliver(&self, chunk: &[u8]) {
        self.events
            .borrow()
            .as_ref()
            .expect("recorder not created")
            .chunk_available(chunk.to_vec());
    }

    fn fire_stop(&self) {
        self.events
            .borrow()
            .as_ref()
            .expect("recorder not created")
            .stopped();
    }
}

impl MediaHost for FakeHost {
    type Track = FakeTrack;
    type Stream = FakeStream;
    type Chunk = Vec<u8>;
    type Recorder = FakeRecorder;
    type Blob = Bytes;

    async fn user_media(&self, constraints: &CaptureConstraints) -> Result<FakeStream, CaptureError> {
        self.requests.borrow_mut().push(constraints.clone());
        self.audio.borrow().clone()
    }

    async fn display_media(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<FakeStream, CaptureError> {
        self.requests.borrow_mut().push(constraints.clone());
        self.screen.borrow().clone()
    }

    fn create_recorder(
        &self,
        _stream: &FakeStream,
        events: RecorderEvents<Vec<u8>>,
    ) -> Result<FakeRecorder, SessionError> {
        self.recorders_created.set(self.recorders_created.get() + 1);
        *self.events.borrow_mut() = Some(events.clone());
        Ok(FakeRecorder {
            events,
            final_chunk: self.final_chunk.borrow().clone(),
            signal_stop: self.signal_stop.get(),
            fail_stop: self.fail_recorder_stop.get(),
            mime_type: self.recorder_mime_type.borrow().clone(),
            calls: self.recorder_calls.clone(),
        })
    }

    fn assemble(&self, chunks: Vec<Vec<u8>>, mime_type: &str) -> Result<Bytes, SessionError> {
        Ok(Bytes(chunks.concat(), mime_type.to_string()))
    }

    fn create_object_url(&self, _blob: &Bytes) -> Result<ObjectUrl, SessionError> {
        let n = self.next_url.get() + 1;
        self.next_url.set(n);
        Ok(ObjectUrl(format!("blob:test/{}", n)))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.revoked.borrow_mut().push(url.clone());
    }

    fn now_ms(&self) -> f64 {
        let now = self.clock.get();
        self.clock.set(now + 1_000.0);
        now
    }
}

#[derive(Debug, Clone, PartialEq)]
enum UiEvent {
    Status(Status),
    Controls(bool),
    Preview(Option<Vec<String>>),
    Published(String),
    RevealRecordings,
    ClearRecordings,
}

#[derive(Default)]
struct FakePresenter {
    log: RefCell<Vec<UiEvent>>,
    settings: RefCell<OutputSettings>,
}

impl FakePresenter {
    fn with_settings(format: Option<ContainerFormat>, file_name: &str) -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            settings: RefCell::new(OutputSettings {
                format,
                file_name: file_name.to_string(),
            }),
        }
    }

    fn events(&self) -> Vec<UiEvent> {
        self.log.borrow().clone()
    }

    fn last_status(&self) -> Option<Status> {
        self.log.borrow().iter().rev().find_map(|e| match e {
            UiEvent::Status(s) => Some(s.clone()),
            _ => None,
        })
    }

    fn preview_bindings(&self) -> Vec<Option<Vec<String>>> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Preview(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for FakePresenter {
    type Stream = FakeStream;
    type Blob = Bytes;

    fn show_status(&self, status: &Status) {
        self.log.borrow_mut().push(UiEvent::Status(status.clone()));
    }

    fn set_recording_controls(&self, recording: bool) {
        self.log.borrow_mut().push(UiEvent::Controls(recording));
    }

    fn bind_preview(&self, stream: Option<&FakeStream>) {
        let ids = stream.map(|s| s.tracks().iter().map(|t| t.id()).collect());
        self.log.borrow_mut().push(UiEvent::Preview(ids));
    }

    fn output_settings(&self) -> OutputSettings {
        self.settings.borrow().clone()
    }

    fn publish(&self, artifact: &OutputArtifact<Bytes>) {
        self.log
            .borrow_mut()
            .push(UiEvent::Published(artifact.file_name.clone()));
    }

    fn reveal_recordings(&self) {
        self.log.borrow_mut().push(UiEvent::RevealRecordings);
    }

    fn clear_recordings(&self) {
        self.log.borrow_mut().push(UiEvent::ClearRecordings);
    }
}

type TestSession = RecordingSession<FakeHost, FakePresenter>;

struct Fixture {
    session: TestSession,
    mic: FakeTrack,
    screen_video: FakeTrack,
    screen_audio: FakeTrack,
}

fn fixture(format: Option<ContainerFormat>, file_name: &str) -> Fixture {
    let mic = FakeTrack::new("mic", TrackKind::Audio);
    let screen_video = FakeTrack::new("screen", TrackKind::Video);
    let screen_audio = FakeTrack::new("system-audio", TrackKind::Audio);

    let host = FakeHost::granting(
        FakeStream(vec![mic.clone()]),
        FakeStream(vec![screen_video.clone(), screen_audio.clone()]),
    );
    let presenter = FakePresenter::with_settings(format, file_name);

    Fixture {
        session: RecordingSession::new(host, presenter, SessionConfig::default()),
        mic,
        screen_video,
        screen_audio,
    }
}

#[tokio::test]
async fn test_record_two_chunks_as_webm_named_demo() {
    let f = fixture(Some(ContainerFormat::Webm), "demo");

    f.session.start().await.unwrap();
    assert_eq!(f.session.phase(), SessionPhase::Recording);

    f.session.host().deliver(b"A");
    f.session.host().deliver(b"B");

    let artifact = f.session.stop().await.unwrap();
    assert_eq!(artifact.blob.0, b"AB".to_vec());
    assert_eq!(artifact.blob.1, "video/webm");
    assert_eq!(artifact.mime_type, "video/webm");
    assert_eq!(artifact.file_name, "demo");
    assert_eq!(artifact.metadata.chunk_count, 2);
    assert_eq!(artifact.metadata.size_bytes, 2);
    assert_ne!(artifact.playback_url, artifact.download_url);
    assert_eq!(f.session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_acquires_microphone_before_screen() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();

    let requests = f.session.host().requests.borrow().clone();
    assert_eq!(
        requests,
        vec![CaptureConstraints::microphone(), CaptureConstraints::screen()]
    );
}

#[tokio::test]
async fn test_start_binds_combined_stream_audio_first() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();

    let presenter = f.session.presenter();
    assert_eq!(
        presenter.preview_bindings(),
        vec![Some(vec![
            "mic".to_string(),
            "screen".to_string(),
            "system-audio".to_string()
        ])]
    );
    assert_eq!(presenter.last_status(), Some(Status::Recording));
    assert!(presenter.events().contains(&UiEvent::Controls(true)));
    assert_eq!(
        *f.session.host().recorder_calls.borrow(),
        vec!["start:None".to_string()]
    );
}

#[tokio::test]
async fn test_timeslice_is_passed_to_recorder() {
    let host = FakeHost::granting(
        FakeStream(vec![FakeTrack::new("mic", TrackKind::Audio)]),
        FakeStream(vec![FakeTrack::new("screen", TrackKind::Video)]),
    );
    let config = SessionConfig {
        timeslice_ms: Some(250),
        ..SessionConfig::default()
    };
    let session = RecordingSession::new(host, FakePresenter::default(), config);
    session.start().await.unwrap();

    assert_eq!(
        *session.host().recorder_calls.borrow(),
        vec!["start:Some(250)".to_string()]
    );
}

#[tokio::test]
async fn test_audio_denial_builds_nothing() {
    let f = fixture(None, "");
    *f.session.host().audio.borrow_mut() = Err(CaptureError::PermissionDenied(
        "Permission denied".to_string(),
    ));

    let err = f.session.start().await.unwrap_err();
    assert!(matches!(err, SessionError::Capture(CaptureError::PermissionDenied(_))));

    let host = f.session.host();
    assert_eq!(host.recorders_created.get(), 0);
    assert_eq!(host.requests.borrow().len(), 1, "screen must not be requested");

    let presenter = f.session.presenter();
    assert!(presenter.preview_bindings().is_empty());
    assert_eq!(
        presenter.last_status(),
        Some(Status::Failed("Permission denied".to_string()))
    );
    assert_eq!(f.session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_screen_denial_releases_microphone() {
    let f = fixture(None, "");
    *f.session.host().screen.borrow_mut() =
        Err(CaptureError::PermissionDenied("Share cancelled".to_string()));

    assert!(f.session.start().await.is_err());

    assert_eq!(f.mic.stops.get(), 1);
    assert_eq!(f.session.host().recorders_created.get(), 0);
    assert!(f.session.presenter().preview_bindings().is_empty());
    assert_eq!(
        f.session.presenter().last_status(),
        Some(Status::Failed("Share cancelled".to_string()))
    );
}

#[tokio::test]
async fn test_failed_start_can_be_retried_by_user() {
    let f = fixture(None, "");
    *f.session.host().audio.borrow_mut() =
        Err(CaptureError::Unavailable("No microphone".to_string()));
    assert!(f.session.start().await.is_err());

    *f.session.host().audio.borrow_mut() = Ok(FakeStream(vec![f.mic.clone()]));
    f.session.start().await.unwrap();
    assert!(f.session.is_recording());
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();

    let err = f.session.start().await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyRecording));
    assert_eq!(f.session.host().recorders_created.get(), 1);
}

#[tokio::test]
async fn test_stop_without_start() {
    let f = fixture(None, "");
    let err = f.session.stop().await.unwrap_err();
    assert!(matches!(err, SessionError::NotRecording));
}

#[tokio::test]
async fn test_stop_halts_every_track_once_and_resets_ui() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();
    f.session.stop().await.unwrap();

    assert_eq!(f.mic.stops.get(), 1);
    assert_eq!(f.screen_video.stops.get(), 1);
    assert_eq!(f.screen_audio.stops.get(), 1);

    let events = f.session.presenter().events();
    let tail = &events[events.len() - 5..];
    assert_eq!(
        tail,
        &[
            UiEvent::Preview(None),
            UiEvent::Controls(false),
            UiEvent::Status(Status::Saved),
            UiEvent::RevealRecordings,
            UiEvent::Published("Untitled".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_stop_audio_only_and_repeated_kinds() {
    let mic_a = FakeTrack::new("mic-a", TrackKind::Audio);
    let mic_b = FakeTrack::new("mic-b", TrackKind::Audio);
    let system = FakeTrack::new("system", TrackKind::Audio);
    let host = FakeHost::granting(
        FakeStream(vec![mic_a.clone(), mic_b.clone()]),
        FakeStream(vec![system.clone()]),
    );
    let session = RecordingSession::new(host, FakePresenter::default(), SessionConfig::default());

    session.start().await.unwrap();
    session.stop().await.unwrap();

    for track in [&mic_a, &mic_b, &system] {
        assert_eq!(track.stops.get(), 1, "{} stopped once", track.id);
    }
}

#[tokio::test]
async fn test_failing_track_does_not_block_others() {
    let broken = FakeTrack::failing("mic", TrackKind::Audio);
    let screen = FakeTrack::new("screen", TrackKind::Video);
    let host = FakeHost::granting(
        FakeStream(vec![broken.clone()]),
        FakeStream(vec![screen.clone()]),
    );
    let session = RecordingSession::new(host, FakePresenter::default(), SessionConfig::default());

    session.start().await.unwrap();
    session.stop().await.unwrap();

    assert_eq!(broken.stops.get(), 1);
    assert_eq!(screen.stops.get(), 1);
}

#[tokio::test]
async fn test_final_chunk_delivered_on_stop_is_included() {
    let f = fixture(None, "");
    *f.session.host().final_chunk.borrow_mut() = Some(b"Z".to_vec());

    f.session.start().await.unwrap();
    f.session.host().deliver(b"X");
    f.session.host().deliver(b"Y");

    let artifact = f.session.stop().await.unwrap();
    assert_eq!(artifact.blob.0, b"XYZ".to_vec());
}

#[tokio::test]
async fn test_finalize_waits_for_stop_event() {
    let f = fixture(None, "late");
    f.session.host().signal_stop.set(false);

    f.session.start().await.unwrap();
    f.session.host().deliver(b"1");

    let host_side = async {
        tokio::task::yield_now().await;
        f.session.host().deliver(b"2");
        f.session.host().fire_stop();
        // Anything after the stop event must not leak in
        f.session.host().deliver(b"3");
    };

    let (artifact, ()) = futures::join!(f.session.stop(), host_side);
    let artifact = artifact.unwrap();
    assert_eq!(artifact.blob.0, b"12".to_vec());
    assert_eq!(artifact.file_name, "late");
}

#[tokio::test]
async fn test_recorder_stop_failure_still_finalizes() {
    let f = fixture(None, "");
    f.session.host().fail_recorder_stop.set(true);

    f.session.start().await.unwrap();
    f.session.host().deliver(b"only");

    let artifact = f.session.stop().await.unwrap();
    assert_eq!(artifact.blob.0, b"only".to_vec());
    assert_eq!(f.mic.stops.get(), 1);
}

#[tokio::test]
async fn test_next_session_starts_with_empty_buffer() {
    let f = fixture(Some(ContainerFormat::Ogg), "first");
    f.session.start().await.unwrap();
    f.session.host().deliver(b"old");
    let first = f.session.stop().await.unwrap();
    assert_eq!(first.blob.0, b"old".to_vec());

    *f.session.presenter().settings.borrow_mut() = OutputSettings {
        format: Some(ContainerFormat::Mp4),
        file_name: "second".to_string(),
    };

    f.session.start().await.unwrap();
    f.session.host().deliver(b"new");
    let second = f.session.stop().await.unwrap();

    assert_eq!(second.blob.0, b"new".to_vec());
    assert_eq!(second.mime_type, "video/mp4");
    assert_eq!(f.session.recordings().len(), 2);
}

#[tokio::test]
async fn test_empty_file_name_falls_back_to_untitled() {
    let f = fixture(Some(ContainerFormat::Webm), "");
    f.session.start().await.unwrap();
    let artifact = f.session.stop().await.unwrap();
    assert_eq!(artifact.file_name, "Untitled");
}

#[tokio::test]
async fn test_each_format_is_used_verbatim() {
    for format in ContainerFormat::ALL {
        let f = fixture(Some(format), "clip");
        f.session.start().await.unwrap();
        f.session.host().deliver(b"data");
        let artifact = f.session.stop().await.unwrap();

        assert_eq!(artifact.format, format);
        assert_eq!(artifact.mime_type, format!("video/{}", format.as_str()));
        assert_eq!(artifact.blob.1, artifact.mime_type);
    }
}

#[tokio::test]
async fn test_no_selection_uses_configured_default() {
    let host = FakeHost::granting(
        FakeStream(vec![FakeTrack::new("mic", TrackKind::Audio)]),
        FakeStream(vec![FakeTrack::new("screen", TrackKind::Video)]),
    );
    let config = SessionConfig {
        default_format: ContainerFormat::Mp4,
        default_file_name: "capture".to_string(),
        timeslice_ms: None,
    };
    let session = RecordingSession::new(host, FakePresenter::default(), config);

    session.start().await.unwrap();
    let artifact = session.stop().await.unwrap();
    assert_eq!(artifact.mime_type, "video/mp4");
    assert_eq!(artifact.file_name, "capture");
}

#[tokio::test]
async fn test_metadata_records_recorder_mime_and_duration() {
    let f = fixture(Some(ContainerFormat::Mp4), "");
    *f.session.host().recorder_mime_type.borrow_mut() =
        Some("video/webm;codecs=vp8,opus".to_string());

    f.session.start().await.unwrap();
    let artifact = f.session.stop().await.unwrap();

    assert_eq!(
        artifact.metadata.recorder_mime_type.as_deref(),
        Some("video/webm;codecs=vp8,opus")
    );
    // Label stays what the user picked
    assert_eq!(artifact.mime_type, "video/mp4");
    assert!(artifact.metadata.duration_ms > 0.0);
}

#[tokio::test]
async fn test_clear_recordings_revokes_both_urls() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();
    let artifact = f.session.stop().await.unwrap();
    assert!(f.session.host().revoked.borrow().is_empty());

    f.session.clear_recordings();

    let revoked = f.session.host().revoked.borrow().clone();
    assert_eq!(revoked, vec![artifact.playback_url, artifact.download_url]);
    assert!(f.session.recordings().is_empty());
    assert_eq!(
        f.session.presenter().events().last(),
        Some(&UiEvent::ClearRecordings)
    );
}

#[tokio::test]
async fn test_recorder_events_reject_chunks_after_stop() {
    let f = fixture(None, "");
    f.session.start().await.unwrap();
    f.session.stop().await.unwrap();

    let events = f.session.host().events.borrow().clone().unwrap();
    assert_eq!(events.state(), RecorderState::Stopped);

    // A straggler from the finished recorder must not reach the next session
    f.session.host().deliver(b"straggler");
    f.session.start().await.unwrap();
    f.session.host().deliver(b"fresh");
    let artifact = f.session.stop().await.unwrap();
    assert_eq!(artifact.blob.0, b"fresh".to_vec());
}

#[tokio::test]
async fn test_active_stream_only_while_recording() {
    let f = fixture(None, "");
    assert!(f.session.active_stream().is_none());

    f.session.start().await.unwrap();
    let stream = f.session.active_stream().expect("active stream");
    assert_eq!(stream.tracks_of_kind(TrackKind::Video).len(), 1);
    assert_eq!(stream.tracks_of_kind(TrackKind::Audio).len(), 2);

    f.session.stop().await.unwrap();
    assert!(f.session.active_stream().is_none());
}
