use thiserror::Error;

/// Failure to obtain a capture stream from the host.
///
/// The display string is the host-provided message as-is, since that is what
/// ends up in the status indicator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Unavailable(String),
}

impl CaptureError {
    pub fn message(&self) -> &str {
        match self {
            CaptureError::PermissionDenied(msg) | CaptureError::Unavailable(msg) => msg,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error("Artifact error: {0}")]
    Artifact(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Unsupported container format: {0:?}")]
    Unsupported(String),
}
