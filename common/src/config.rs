use serde::{Deserialize, Serialize};

use crate::format::ContainerFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Used when no container format is selected at finalize time.
    #[serde(default)]
    pub default_format: ContainerFormat,
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
    /// Ask the recorder for a chunk every N milliseconds. `None` yields a
    /// single chunk when the recorder stops.
    #[serde(default)]
    pub timeslice_ms: Option<u32>,
}

fn default_file_name() -> String {
    "Untitled".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_format: ContainerFormat::default(),
            default_file_name: default_file_name(),
            timeslice_ms: None,
        }
    }
}
