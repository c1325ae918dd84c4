/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message exceeds the effective maximum payload size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The pending queue already holds `capacity` messages.
    #[error("queue full ({capacity} messages)")]
    QueueFull { capacity: usize },

    /// A received length field exceeds the effective maximum payload size.
    #[error("frame length {size} exceeds max payload {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// The max frame size cannot hold even a frame header.
    #[error("max frame size {limit} is smaller than the {header}-byte frame header")]
    LimitTooSmall { limit: usize, header: usize },

    /// The stored checksum does not match the received payload.
    #[error("checksum mismatch (computed {computed:#010x}, stored {stored:#010x})")]
    ChecksumMismatch { computed: u32, stored: u32 },

    /// The decoder hit a violation earlier and must be reset.
    #[error("stream corrupted (reset required)")]
    Corrupted,

    /// No buffering budget left and no complete message can be extracted.
    #[error("input buffer full")]
    BufferFull,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors that mean the incoming byte stream can no longer be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            FrameError::FrameTooLarge { .. }
                | FrameError::ChecksumMismatch { .. }
                | FrameError::Corrupted
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
