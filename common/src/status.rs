use serde::{Deserialize, Serialize};

/// What the status indicator shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum Status {
    Ready,
    Recording,
    Saved,
    Failed(String),
}

impl Status {
    pub fn label(&self) -> &str {
        match self {
            Status::Ready => "Ready",
            Status::Recording => "Recording",
            Status::Saved => "Recording Saved!",
            Status::Failed(message) => message,
        }
    }

    /// CSS colour for the indicator text.
    pub fn color(&self) -> &'static str {
        match self {
            Status::Ready => "inherit",
            Status::Recording => "lightgreen",
            Status::Saved => "lightblue",
            Status::Failed(_) => "red",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed(_))
    }
}
