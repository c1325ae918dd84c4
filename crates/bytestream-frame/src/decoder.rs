use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};

use crate::checksum::{calculate_sum, check_sum, stored_sum};
use crate::codec::{read_length, CHECKSUM_SIZE, LENGTH_SIZE};
use crate::config::{Snapshot, StreamConfig};
use crate::encoder::MessageQueue;
use crate::error::{FrameError, Result};

/// Reassembly state of a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No length field read for the next frame.
    AwaitingLength,
    /// Length known; waiting for the checksum field and payload.
    AwaitingPayload(u32),
    /// A checksum mismatch or an oversized length was seen. Every later
    /// `put`/`flush` fails until [`Decoder::reset`] or [`Decoder::clear`].
    Corrupt,
}

/// Input side of a stream: raw fragments in, whole messages out.
///
/// The raw buffer never holds more than the configured max frame size, and
/// completed messages stop being extracted while the completed queue is at
/// capacity, so both byte and message usage stay bounded.
#[derive(Debug)]
pub struct Decoder {
    config: Arc<StreamConfig>,
    buf: BytesMut,
    state: DecoderState,
    queue: MessageQueue,
}

impl Decoder {
    /// Create a decoder with its own default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(StreamConfig::default()))
    }

    /// Create a decoder driven by a shared configuration.
    pub fn with_config(config: Arc<StreamConfig>) -> Self {
        Self {
            config,
            buf: BytesMut::new(),
            state: DecoderState::AwaitingLength,
            queue: MessageQueue::new(),
        }
    }

    pub fn config(&self) -> &Arc<StreamConfig> {
        &self.config
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Buffer bytes from `data[*offset..]` and extract complete frames.
    ///
    /// Only as many bytes as fit under the max frame size are taken per
    /// call; `offset` is advanced past them. Callers loop until `offset`
    /// reaches `data.len()`. An error other than
    /// [`LimitTooSmall`](FrameError::LimitTooSmall) means the stream is
    /// corrupt: the partial frame is discarded and the connection should be
    /// dropped.
    pub fn put(&mut self, data: &[u8], offset: &mut usize) -> Result<()> {
        if self.state == DecoderState::Corrupt {
            return Err(FrameError::Corrupted);
        }

        let snapshot = self.config.snapshot();
        snapshot.check_limit()?;

        let budget = snapshot.frame_budget().saturating_sub(self.buf.len());
        let input = data.get(*offset..).unwrap_or_default();
        let size = input.len().min(budget);

        self.buf.extend_from_slice(&input[..size]);
        *offset += size;
        self.parse(snapshot)
    }

    /// Feed a whole chunk, looping over [`put`](Decoder::put).
    ///
    /// Returns how many bytes were consumed. That is less than `data.len()`
    /// only when the buffer is full and the completed queue is at capacity;
    /// drain with [`take`](Decoder::take) and feed the rest later.
    pub fn put_all(&mut self, data: &[u8]) -> Result<usize> {
        let mut offset = 0usize;
        while offset < data.len() {
            let before = offset;
            self.put(data, &mut offset)?;
            if offset == before {
                tracing::debug!(
                    consumed = offset,
                    remaining = data.len() - offset,
                    "input stalled on full queue"
                );
                break;
            }
        }
        Ok(offset)
    }

    /// Run a parse pass over already-buffered bytes.
    ///
    /// Call after draining a full completed queue to extract frames that
    /// were held back.
    pub fn flush(&mut self) -> Result<()> {
        if self.state == DecoderState::Corrupt {
            return Err(FrameError::Corrupted);
        }

        let snapshot = self.config.snapshot();
        snapshot.check_limit()?;
        self.parse(snapshot)
    }

    fn parse(&mut self, snapshot: Snapshot) -> Result<()> {
        let endian = snapshot.endian();
        let checksum_size = if snapshot.checksum() { CHECKSUM_SIZE } else { 0 };
        let header = LENGTH_SIZE + checksum_size;
        let budget = snapshot.frame_budget();
        let max_payload = snapshot.max_payload();

        // Start of the first frame not yet extracted.
        let mut cursor = 0usize;
        let result = loop {
            let length = match self.state {
                DecoderState::AwaitingPayload(length) => length as usize,
                _ => {
                    let Some(length) = read_length(&self.buf[cursor..], endian) else {
                        break Ok(());
                    };
                    length as usize
                }
            };

            // Re-checked for a pending length: the limit may have dropped
            // since it was read.
            if header.saturating_add(length) > budget {
                break Err(FrameError::FrameTooLarge {
                    size: length,
                    max: max_payload,
                });
            }
            self.state = DecoderState::AwaitingPayload(length as u32);

            let body = cursor + LENGTH_SIZE;
            let start = body + checksum_size;
            let end = start + length;
            if self.buf.len() < end || !snapshot.admits(self.queue.len()) {
                break Ok(());
            }

            let payload = &self.buf[start..end];
            if checksum_size > 0 {
                let field = &self.buf[body..start];
                let computed = calculate_sum(payload, endian);
                if !check_sum(field, computed, endian) {
                    break Err(FrameError::ChecksumMismatch {
                        computed,
                        stored: stored_sum(field, endian).unwrap_or_default(),
                    });
                }
            }

            tracing::trace!(length, "decoded frame");
            self.queue.push_back(Bytes::copy_from_slice(payload));
            self.state = DecoderState::AwaitingLength;
            cursor = end;
        };

        match result {
            Ok(()) => {
                if cursor > 0 {
                    self.buf.advance(cursor);
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, buffered = self.buf.len(), "discarding corrupt input");
                self.buf.clear();
                self.state = DecoderState::Corrupt;
                Err(err)
            }
        }
    }

    /// Pop the oldest completed message.
    pub fn take(&mut self) -> Option<Bytes> {
        self.queue.pop_front()
    }

    /// Swap the completed queue with `queue`.
    ///
    /// Returns true iff `queue` holds messages afterwards. Whatever `queue`
    /// held before becomes the decoder's completed queue, so pass an empty
    /// one to simply take everything.
    pub fn take_queue(&mut self, queue: &mut MessageQueue) -> bool {
        std::mem::swap(&mut self.queue, queue);
        !queue.is_empty()
    }

    /// True while the completed queue has room for another message.
    pub fn idle(&self) -> bool {
        self.config.snapshot().admits(self.queue.len())
    }

    /// Number of completed messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no completed message is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Raw bytes buffered but not yet extracted.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard the partial frame and any corruption marker; completed
    /// messages are kept.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = DecoderState::AwaitingLength;
    }

    /// [`reset`](Decoder::reset) and discard completed messages.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.reset();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
