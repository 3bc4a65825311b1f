//! Capture constraints handed to the host's capture device service.
//!
//! The serialized form matches the browser's `MediaStreamConstraints`
//! dictionary, so the wasm client can pass these through
//! `serde-wasm-bindgen` unchanged.

use serde::{Deserialize, Serialize};

pub const SCREEN_AUDIO_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConstraints {
    pub audio: AudioRequest,
    pub video: VideoRequest,
}

/// Either a plain on/off switch or a set of audio processing hints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AudioRequest {
    Enabled(bool),
    Tuned(AudioTrackConstraints),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrackConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VideoRequest {
    Enabled(bool),
    Display(DisplayTrackConstraints),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTrackConstraints {
    pub media_source: MediaSource,
    pub cursor: CursorVisibility,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Screen,
    Window,
    Browser,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CursorVisibility {
    Always,
    Motion,
    Never,
}

impl CaptureConstraints {
    /// Microphone only, no video.
    pub fn microphone() -> Self {
        Self {
            audio: AudioRequest::Enabled(true),
            video: VideoRequest::Enabled(false),
        }
    }

    /// Whole screen with the cursor always drawn, plus processed audio.
    pub fn screen() -> Self {
        Self {
            audio: AudioRequest::Tuned(AudioTrackConstraints {
                echo_cancellation: true,
                noise_suppression: true,
                sample_rate: SCREEN_AUDIO_SAMPLE_RATE,
            }),
            video: VideoRequest::Display(DisplayTrackConstraints {
                media_source: MediaSource::Screen,
                cursor: CursorVisibility::Always,
            }),
        }
    }

    pub fn wants_audio(&self) -> bool {
        !matches!(self.audio, AudioRequest::Enabled(false))
    }

    pub fn wants_video(&self) -> bool {
        !matches!(self.video, VideoRequest::Enabled(false))
    }
}
