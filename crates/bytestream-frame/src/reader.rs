use std::io::{ErrorKind, Read};
use std::sync::Arc;

use bytes::Bytes;

use crate::config::StreamConfig;
use crate::decoder::Decoder;
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete messages from any `Read` stream.
///
/// Partial reads are absorbed by the decoder; callers only see complete
/// messages.
pub struct FrameReader<T> {
    inner: T,
    decoder: Decoder,
    chunk: Vec<u8>,
    filled: usize,
    pos: usize,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, Arc::new(StreamConfig::default()))
    }

    /// Create a new frame reader with a shared configuration.
    pub fn with_config(inner: T, config: Arc<StreamConfig>) -> Self {
        Self {
            inner,
            decoder: Decoder::with_config(config),
            chunk: vec![0u8; READ_CHUNK_SIZE],
            filled: 0,
            pos: 0,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_message(&mut self) -> Result<Bytes> {
        loop {
            if let Some(message) = self.decoder.take() {
                return Ok(message);
            }

            if self.pos < self.filled {
                let before = self.pos;
                self.decoder.put(&self.chunk[..self.filled], &mut self.pos)?;
                if self.pos == before && self.decoder.is_empty() {
                    return Err(FrameError::BufferFull);
                }
                continue;
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.filled = read;
            self.pos = 0;
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The decoder holding buffered input and completed messages.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Current stream configuration.
    pub fn config(&self) -> &Arc<StreamConfig> {
        self.decoder.config()
    }
}

impl<T> std::fmt::Debug for FrameReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("decoder", &self.decoder)
            .field("pending", &(self.filled - self.pos))
            .finish_non_exhaustive()
    }
}
