pub mod framing;
pub mod models;

pub use framing::{FrameError, LineFramer};
pub use models::*;
