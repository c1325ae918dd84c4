use std::collections::VecDeque;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::put_frame;
use crate::config::StreamConfig;
use crate::error::{FrameError, Result};

/// FIFO of whole messages.
pub type MessageQueue = VecDeque<Bytes>;

/// Output side of a stream: messages in, wire bytes out.
///
/// Messages are queued by [`put`](Encoder::put) and serialized lazily by
/// [`data`](Encoder::data); the transport reports what it accepted with
/// [`take`](Encoder::take).
///
/// ```
/// use bytestream_frame::Encoder;
///
/// let mut encoder = Encoder::new();
/// encoder.put(&b"ping"[..]).unwrap();
///
/// let wire = encoder.data(usize::MAX).to_vec();
/// assert_eq!(wire.len(), 4 + 4);
/// encoder.take(wire.len());
/// assert!(encoder.is_empty());
/// ```
#[derive(Debug)]
pub struct Encoder {
    config: Arc<StreamConfig>,
    queue: MessageQueue,
    buf: BytesMut,
    /// Wire size of every frame still (partly) held in `buf`, oldest first.
    frames: VecDeque<usize>,
    offset: usize,
}

impl Encoder {
    /// Create an encoder with its own default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(StreamConfig::default()))
    }

    /// Create an encoder driven by a shared configuration.
    pub fn with_config(config: Arc<StreamConfig>) -> Self {
        Self {
            config,
            queue: MessageQueue::new(),
            buf: BytesMut::new(),
            frames: VecDeque::new(),
            offset: 0,
        }
    }

    pub fn config(&self) -> &Arc<StreamConfig> {
        &self.config
    }

    /// Queue a message for encoding.
    ///
    /// Fails without side effects if the max frame size cannot hold a
    /// header, the message exceeds the effective max payload, or the pending
    /// queue is at capacity.
    pub fn put(&mut self, message: impl Into<Bytes>) -> Result<()> {
        let message = message.into();
        let snapshot = self.config.snapshot();
        snapshot.check_limit()?;

        let max = snapshot.max_payload();
        if message.len() > max {
            tracing::debug!(size = message.len(), max, "rejecting oversized message");
            return Err(FrameError::PayloadTooLarge {
                size: message.len(),
                max,
            });
        }

        if !snapshot.admits(self.queue.len()) {
            tracing::debug!(capacity = snapshot.capacity, "rejecting message, queue full");
            return Err(FrameError::QueueFull {
                capacity: snapshot.capacity,
            });
        }

        self.queue.push_back(message);
        Ok(())
    }

    /// Encode pending messages and return the unconsumed wire bytes.
    ///
    /// Encoding stops once `size_hint` bytes are available, the queue is
    /// empty, or the next frame would take the buffered bytes past the
    /// effective max payload. Nothing is encoded while the max frame size
    /// cannot hold a header. The returned slice may be shorter than
    /// `size_hint` and always ends on a frame boundary.
    pub fn data(&mut self, size_hint: usize) -> &[u8] {
        let snapshot = self.config.snapshot();
        let max = snapshot.max_payload();
        if snapshot.check_limit().is_err() {
            return &self.buf[self.offset..];
        }

        while self.buffered() < size_hint {
            let Some(message) = self.queue.front() else {
                break;
            };
            if self.buf.len() > max || message.len() > max - self.buf.len() {
                break;
            }
            let Ok(length) = u32::try_from(message.len()) else {
                break;
            };

            let size = put_frame(length, message, snapshot.flags, &mut self.buf);
            tracing::trace!(length, size, "encoded frame");
            self.frames.push_back(size);
            self.queue.pop_front();
        }

        &self.buf[self.offset..]
    }

    /// Mark `size` bytes returned by [`data`](Encoder::data) as sent.
    ///
    /// Fully consumed frames are dropped from the buffer; a partly consumed
    /// frame stays until the rest of it is taken. Taking at least everything
    /// that is buffered empties the buffer.
    pub fn take(&mut self, size: usize) {
        if size >= self.buffered() {
            self.offset = 0;
            self.buf.clear();
            self.frames.clear();
            return;
        }

        self.offset += size;

        let mut consumed = 0usize;
        while let Some(&frame) = self.frames.front() {
            if self.offset - consumed < frame {
                break;
            }
            consumed += frame;
            self.frames.pop_front();
        }

        if consumed > 0 {
            self.buf.advance(consumed);
            self.offset -= consumed;
        }
    }

    /// True when nothing is pending and nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.buf.is_empty()
    }

    /// True while [`put`](Encoder::put) would not be refused for capacity.
    pub fn idle(&self) -> bool {
        self.config.snapshot().admits(self.queue.len())
    }

    /// Number of messages waiting to be encoded.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Encoded bytes not yet taken.
    pub fn buffered(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    /// Rewind the consumed offset so the buffered frames are offered again
    /// from the first one still held.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Drop pending messages and encoded bytes.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.offset = 0;
        self.buf.clear();
        self.frames.clear();
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
