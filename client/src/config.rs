use common::SessionConfig;
use serde::{Deserialize, Serialize};

/// Page-level configuration handed to `init` from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub session: SessionConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub elements: ElementIds,
    #[serde(default = "default_download_label")]
    pub download_label: String,
}

/// DOM element ids (and the radio group name) the page must provide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElementIds {
    pub preview: String,
    pub status: String,
    pub start_button: String,
    pub stop_button: String,
    /// `name` attribute of the format radio group.
    pub format_input: String,
    pub file_name_input: String,
    pub recordings_container: String,
    pub recordings_section: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            preview: "preview-video".to_string(),
            status: "record-status".to_string(),
            start_button: "start-record".to_string(),
            stop_button: "stop-record".to_string(),
            format_input: "video_file_format".to_string(),
            file_name_input: "file_name".to_string(),
            recordings_container: "recorded_videos".to_string(),
            recordings_section: "vids-recorded".to_string(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_download_label() -> String {
    "Download Video".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            log_level: default_log_level(),
            elements: ElementIds::default(),
            download_label: default_download_label(),
        }
    }
}

impl ClientConfig {
    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}
