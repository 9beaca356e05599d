//! Newline-delimited JSON framing used on the controller uplink.
//!
//! Each message is one UTF-8 JSON object followed by `\n`. Bytes arrive in
//! arbitrary chunks, so [`LineFramer`] keeps the trailing partial segment
//! until the rest of it shows up.

mod error;

pub use error::FrameError;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

const DELIMITER: u8 = b'\n';

#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_frame_size: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Append `data` and decode every complete segment.
    ///
    /// A segment that fails to decode yields an `Err` in its slot and does
    /// not affect its neighbours. Blank segments are skipped.
    pub fn push<T: DeserializeOwned>(&mut self, data: &[u8]) -> Vec<Result<T, FrameError>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == DELIMITER) {
            let segment: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = trim_line(&segment[..segment.len() - 1]);

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            frames.push(
                serde_json::from_slice::<T>(line).map_err(|e| FrameError::Malformed(e.to_string())),
            );
        }

        if self.buffer.len() > self.max_frame_size {
            let size = self.buffer.len();
            self.buffer.clear();
            frames.push(Err(FrameError::Oversized(size)));
        }

        frames
    }

    /// Bytes of the incomplete trailing segment.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize `message` as one delimited frame.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, FrameError> {
    let mut frame = serde_json::to_vec(message).map_err(|e| FrameError::Encode(e.to_string()))?;
    frame.push(DELIMITER);
    Ok(frame)
}

fn trim_line(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}
