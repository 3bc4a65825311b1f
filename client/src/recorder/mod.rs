//! Screen recording over getUserMedia, getDisplayMedia and MediaRecorder

pub mod host;
pub mod media_recorder;
pub mod media_streams;
pub mod state;
pub mod ui;

pub use state::BrowserSession;
pub use ui::DomPresenter;
