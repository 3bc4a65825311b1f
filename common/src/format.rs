use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

/// Container label applied to the recorded bytes.
///
/// The label is taken verbatim: no transcoding happens, so a `mp4` artifact
/// may still carry whatever codec the browser's recorder produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    #[default]
    Webm,
    Ogg,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 3] = [
        ContainerFormat::Mp4,
        ContainerFormat::Webm,
        ContainerFormat::Ogg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Ogg => "ogg",
        }
    }

    /// Declared blob type, `video/<format>`.
    pub fn mime_type(&self) -> String {
        format!("video/{}", self.as_str())
    }

    /// Whether a MIME type reported by the recorder names this container.
    /// Codec parameters (`;codecs=...`) are ignored.
    pub fn matches_mime(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or("").trim();
        essence.eq_ignore_ascii_case(&self.mime_type())
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| FormatError::Unsupported(s.to_string()))
    }
}
