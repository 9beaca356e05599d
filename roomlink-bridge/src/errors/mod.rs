pub mod command;
pub mod link;

pub use command::{CommandError, ErrorKind};
pub use link::LinkError;

use std::io;

/// Startup failures of the bridge process. Nothing that happens on a
/// session is fatal; only these stop the binary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}
