use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Segment is not a valid JSON object
    Malformed(String),
    /// Unterminated data exceeded the frame limit
    Oversized(usize),
    /// Outbound message could not be encoded
    Encode(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "Malformed frame: {}", e),
            Self::Oversized(size) => write!(f, "Frame too large: {} bytes", size),
            Self::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}
