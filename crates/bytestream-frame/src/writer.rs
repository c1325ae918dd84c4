use std::io::{ErrorKind, Write};
use std::sync::Arc;

use bytes::Bytes;

use crate::config::StreamConfig;
use crate::encoder::Encoder;
use crate::error::{FrameError, Result};

const WRITE_CHUNK_SIZE: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    encoder: Encoder,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, Arc::new(StreamConfig::default()))
    }

    /// Create a new frame writer with a shared configuration.
    pub fn with_config(inner: T, config: Arc<StreamConfig>) -> Self {
        Self {
            inner,
            encoder: Encoder::with_config(config),
        }
    }

    /// Encode and send a message (blocking).
    pub fn send(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.encoder.put(payload)?;
        self.flush()
    }

    /// Queue a message without writing it yet.
    pub fn queue(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.encoder.put(payload)
    }

    /// Write every queued message and flush the underlying stream.
    ///
    /// Short writes are fine: the encoder keeps the unsent tail of a frame
    /// and offers it again on the next iteration.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            let data = self.encoder.data(WRITE_CHUNK_SIZE);
            if data.is_empty() {
                break;
            }

            match self.inner.write(data) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => self.encoder.take(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    ///
    /// Queued messages that were never flushed are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The encoder holding queued messages and unsent bytes.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Current stream configuration.
    pub fn config(&self) -> &Arc<StreamConfig> {
        self.encoder.config()
    }
}

impl<T> std::fmt::Debug for FrameWriter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}
