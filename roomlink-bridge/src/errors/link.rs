use std::io;

use roomlink_api::FrameError;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Connection to {addr} timed out after {timeout_ms}ms")]
    Timeout { addr: String, timeout_ms: u128 },

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Controller I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode command: {0}")]
    Frame(#[from] FrameError),
}

impl LinkError {
    /// True when the controller could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, LinkError::Timeout { .. } | LinkError::Connect { .. })
    }
}
