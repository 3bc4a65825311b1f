use crate::artifact::OutputArtifact;
use crate::format::ContainerFormat;
use crate::status::Status;

/// User choices read when a recording is finalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    /// `None` when nothing is selected; the session falls back to its default.
    pub format: Option<ContainerFormat>,
    /// Raw contents of the file name field, possibly empty.
    pub file_name: String,
}

/// Display surface the session drives. Keeps the session free of any
/// particular UI technology.
pub trait Presenter {
    type Stream;
    type Blob;

    fn show_status(&self, status: &Status);

    /// Enable stop and disable start while recording, the reverse otherwise.
    fn set_recording_controls(&self, recording: bool);

    /// Attach the live preview to `stream`, or detach it with `None`.
    fn bind_preview(&self, stream: Option<&Self::Stream>);

    fn output_settings(&self) -> OutputSettings;

    /// Show the playable element and the download link for a new artifact.
    fn publish(&self, artifact: &OutputArtifact<Self::Blob>);

    /// Make the recordings section visible.
    fn reveal_recordings(&self);

    /// Remove every published artifact from view.
    fn clear_recordings(&self);
}
