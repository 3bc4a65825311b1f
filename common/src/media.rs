use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    /// Parse the host's kind string ("audio" / "video").
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "audio" => Some(TrackKind::Audio),
            "video" => Some(TrackKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        }
    }
}

/// One live audio or video channel. Stopping is independent per track.
pub trait MediaTrack: Clone {
    fn id(&self) -> String;
    fn kind(&self) -> Option<TrackKind>;
    fn stop(&self) -> Result<(), String>;
}

/// Shared handle to zero or more live tracks.
pub trait MediaStream: Clone {
    type Track: MediaTrack;

    fn tracks(&self) -> Vec<Self::Track>;
    fn from_tracks(tracks: Vec<Self::Track>) -> Self;

    fn tracks_of_kind(&self, kind: TrackKind) -> Vec<Self::Track> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == Some(kind))
            .collect()
    }
}

/// Build a stream holding every audio-stream track followed by every
/// screen-stream track.
pub fn combine<S: MediaStream>(audio: &S, screen: &S) -> S {
    let mut tracks = audio.tracks();
    tracks.extend(screen.tracks());
    log::debug!("Combined stream has {} tracks", tracks.len());
    S::from_tracks(tracks)
}

/// Stop every track of `stream` once. A failing track does not keep the
/// others running. Returns how many tracks failed to stop.
pub fn stop_all_tracks<S: MediaStream>(stream: &S) -> usize {
    let mut failures = 0;
    for track in stream.tracks() {
        if let Err(e) = track.stop() {
            failures += 1;
            log::warn!("Failed to stop track {}: {}", track.id(), e);
        } else {
            log::debug!(
                "Stopped {} track {}",
                track.kind().map(|k| k.as_str()).unwrap_or("unknown"),
                track.id()
            );
        }
    }
    failures
}
