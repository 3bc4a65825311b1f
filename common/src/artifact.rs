use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::ContainerFormat;

/// A host object URL (`blob:...`) referencing an artifact's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectUrl(pub String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingMetadata {
    pub started_at_ms: f64,
    pub stopped_at_ms: f64,
    pub duration_ms: f64,
    pub chunk_count: usize,
    pub size_bytes: u64,
    /// MIME type the recorder reported for its own output, if any.
    #[serde(default)]
    pub recorder_mime_type: Option<String>,
}

/// Finalized recording: the assembled blob plus two independent URLs over
/// it, one for playback and one for the download link.
#[derive(Debug, Clone)]
pub struct OutputArtifact<B> {
    pub blob: B,
    pub format: ContainerFormat,
    pub mime_type: String,
    pub file_name: String,
    pub playback_url: ObjectUrl,
    pub download_url: ObjectUrl,
    pub metadata: RecordingMetadata,
}

/// Summary of an artifact currently listed in the UI. Owns its URLs until
/// the list is cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishedRecording {
    pub file_name: String,
    pub mime_type: String,
    pub playback_url: ObjectUrl,
    pub download_url: ObjectUrl,
    pub metadata: RecordingMetadata,
}

impl<B> From<&OutputArtifact<B>> for PublishedRecording {
    fn from(artifact: &OutputArtifact<B>) -> Self {
        Self {
            file_name: artifact.file_name.clone(),
            mime_type: artifact.mime_type.clone(),
            playback_url: artifact.playback_url.clone(),
            download_url: artifact.download_url.clone(),
            metadata: artifact.metadata.clone(),
        }
    }
}

/// Download name: the user's input when it is non-empty, taken exactly as
/// typed; otherwise the fallback.
pub fn resolve_file_name(input: &str, fallback: &str) -> String {
    if input.is_empty() {
        fallback.to_string()
    } else {
        input.to_string()
    }
}
