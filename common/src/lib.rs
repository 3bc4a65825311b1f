pub mod artifact;
pub mod buffer;
pub mod config;
pub mod constraints;
pub mod error;
pub mod format;
pub mod host;
pub mod media;
pub mod presenter;
pub mod session;
pub mod status;

pub use artifact::*;
pub use buffer::*;
pub use config::*;
pub use constraints::*;
pub use error::*;
pub use format::*;
pub use host::*;
pub use media::*;
pub use presenter::*;
pub use session::*;
pub use status::*;
